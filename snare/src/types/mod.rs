use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::frames::Frame;

/// An ordered call chain: outermost caller first, the frame that observed
/// the error last. Owned by the `Exception` that carries it; never shared.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stacktrace {
    pub frames: Vec<Frame>,
}

impl Stacktrace {
    /// Serializes to the wire JSON form, `{"frames": [...]}`.
    pub fn to_wire_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(self)?)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Mechanism {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub mechanism_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub synthetic: Option<bool>,
}

/// Error type/value metadata around a captured stacktrace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Exception {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub exception_type: Option<String>,
    #[serde(rename = "value", skip_serializing_if = "Option::is_none")]
    pub exception_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mechanism: Option<Mechanism>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stacktrace: Option<Stacktrace>,
}

impl Exception {
    /// Builds an exception from any error value. An empty stacktrace is
    /// omitted entirely rather than serialized as `{"frames": []}`.
    pub fn from_error(
        exception_type: impl Into<String>,
        err: &dyn std::error::Error,
        stacktrace: Stacktrace,
    ) -> Self {
        Exception {
            exception_type: Some(exception_type.into()),
            exception_value: Some(err.to_string()),
            stacktrace: (!stacktrace.frames.is_empty()).then_some(stacktrace),
            ..Exception::default()
        }
    }

    pub fn to_wire_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn empty_stacktrace_is_omitted_from_exception() {
        let err = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let exception = Exception::from_error("io::Error", &err, Stacktrace::default());

        assert_eq!(exception.exception_type.as_deref(), Some("io::Error"));
        assert_eq!(exception.exception_value.as_deref(), Some("disk on fire"));
        assert_eq!(exception.stacktrace, None);
        assert_eq!(
            exception.to_wire_json().unwrap(),
            r#"{"type":"io::Error","value":"disk on fire"}"#
        );
    }

    #[test]
    fn populated_stacktrace_is_kept() {
        let err = std::io::Error::new(std::io::ErrorKind::Other, "nope");
        let stacktrace = Stacktrace {
            frames: vec![Frame {
                function: Some("main".to_string()),
                in_app: true,
                ..Frame::default()
            }],
        };

        let exception = Exception::from_error("io::Error", &err, stacktrace);
        assert_eq!(exception.stacktrace.as_ref().unwrap().frames.len(), 1);
    }
}
