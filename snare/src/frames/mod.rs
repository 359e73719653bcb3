use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha512};

use crate::names::{split_qualified_name, strip_origin_prefix};

pub mod filter;

/// A raw call-stack entry as reported by a stack source, before any
/// normalization has happened.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFrame {
    pub function: String, // Fully qualified function identifier
    pub file: String,     // Source file path, empty when unknown
    pub line: u32,        // 1-based line number, 0 when unknown
    pub column: u32,      // 1-based column number, 0 when unknown
}

/// The single canonical representation of a frame, in wire field order.
///
/// A frame is either managed (function, module, source location) or native
/// (symbol and address fields); whichever kind is unused stays `None` and is
/// omitted from the wire form. `in_app` is the one field that is always
/// emitted, even when false.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Frame {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function: Option<String>, // Local signature, after origin-prefix stripping
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>, // Low-level symbol, native frames only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module: Option<String>, // Owning package path, absent for native frames
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>, // Basename of the source file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abs_path: Option<String>, // Full source file path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lineno: Option<u32>, // 1-based, absent when the runtime reported zero
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colno: Option<u32>, // 1-based, absent when the runtime reported zero
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pre_context: Vec<String>, // Source lines before the context line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_line: Option<String>, // The source line the frame points at
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub post_context: Vec<String>, // Source lines after the context line
    pub in_app: bool, // True for application code, false for library/runtime
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub vars: BTreeMap<String, Value>, // Local variable snapshots, key-sorted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<String>, // Binary image name, native frames only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instruction_addr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addr_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol_addr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_addr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>, // "native" for native frames
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub stack_start: bool, // Unlike in_app, omitted when false
}

impl From<&RawFrame> for Frame {
    fn from(raw: &RawFrame) -> Self {
        let (module, signature) = split_qualified_name(&raw.function);
        let function = strip_origin_prefix(signature);
        Frame {
            function: non_empty(function),
            module: non_empty(module),
            filename: basename(&raw.file),
            abs_path: non_empty(&raw.file),
            lineno: (raw.line > 0).then_some(raw.line),
            colno: (raw.column > 0).then_some(raw.column),
            ..Frame::default()
        }
    }
}

impl Frame {
    /// Feeds the grouping-relevant parts of the frame into a fingerprint
    /// hash. Line numbers are deliberately left out: they shift on every
    /// edit to the file, while module/function/filename only change when
    /// the call site itself moves.
    pub fn include_in_fingerprint(&self, h: &mut Sha512) {
        if let Some(module) = &self.module {
            h.update(module.as_bytes());
        }
        if let Some(function) = &self.function {
            h.update(function.as_bytes());
        }
        if let Some(filename) = &self.filename {
            h.update(filename.as_bytes());
        }
    }
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

fn basename(path: &str) -> Option<String> {
    Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .map(String::from)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn builds_managed_frame_from_raw() {
        let raw = RawFrame {
            function: "github.com/getsentry/sentry-go.(*Hub).Flush".to_string(),
            file: "/somewhere/sentry/sentry-go/hub.go".to_string(),
            line: 42,
            column: 7,
        };

        let frame = Frame::from(&raw);
        assert_eq!(frame.module.as_deref(), Some("github.com/getsentry/sentry-go"));
        assert_eq!(frame.function.as_deref(), Some("(*Hub).Flush"));
        assert_eq!(frame.filename.as_deref(), Some("hub.go"));
        assert_eq!(
            frame.abs_path.as_deref(),
            Some("/somewhere/sentry/sentry-go/hub.go")
        );
        assert_eq!(frame.lineno, Some(42));
        assert_eq!(frame.colno, Some(7));
        assert!(!frame.in_app);
    }

    #[test]
    fn normalizes_function_name_while_building() {
        let raw = RawFrame {
            function: "example.com/app/api.Run.func62.APIRewrite.func1".to_string(),
            file: "/srv/app/api/middleware.go".to_string(),
            line: 9,
            column: 0,
        };

        let frame = Frame::from(&raw);
        assert_eq!(frame.module.as_deref(), Some("example.com/app/api"));
        assert_eq!(frame.function.as_deref(), Some("APIRewrite.func1"));
    }

    #[test]
    fn missing_metadata_stays_absent() {
        let frame = Frame::from(&RawFrame::default());
        assert_eq!(frame.function, None);
        assert_eq!(frame.module, None);
        assert_eq!(frame.filename, None);
        assert_eq!(frame.abs_path, None);
        assert_eq!(frame.lineno, None);
        assert_eq!(frame.colno, None);
    }
}
