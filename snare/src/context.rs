//! Source-context attachment for captured frames.
//!
//! Kept out of the frame builder on purpose: building frames is pure, and
//! reading source files is not. Callers opt in after capture.

use std::collections::HashMap;
use std::fs;

use tracing::debug;

use crate::config::Config;
use crate::frames::Frame;
use crate::types::Stacktrace;

/// Reads and caches source files to decorate frames with the lines around
/// their call site. Failed reads are cached too, so an unreadable path is
/// attempted once per reader, not once per frame.
#[derive(Debug, Default)]
pub struct SourceReader {
    cache: HashMap<String, Option<Vec<String>>>,
}

impl SourceReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches pre/context/post lines to every frame naming a readable
    /// source location. Frames without a path or line are left untouched.
    pub fn attach_context(&mut self, stacktrace: &mut Stacktrace, context_lines: usize) {
        for frame in &mut stacktrace.frames {
            self.contextify(frame, context_lines);
        }
    }

    fn contextify(&mut self, frame: &mut Frame, context_lines: usize) {
        let (Some(path), Some(lineno)) = (frame.abs_path.clone(), frame.lineno) else {
            return;
        };
        let Some(lines) = self.lines_for(&path) else {
            return;
        };

        // lineno is 1-based; a line past the end of the file means the
        // source on disk no longer matches the running binary.
        let Some(index) = (lineno as usize).checked_sub(1) else {
            return;
        };
        if index >= lines.len() {
            debug!(path = %path, lineno, "context line is past the end of the file");
            return;
        }

        let start = index.saturating_sub(context_lines);
        let end = (index + 1 + context_lines).min(lines.len());
        frame.pre_context = lines[start..index].to_vec();
        frame.context_line = Some(lines[index].clone());
        frame.post_context = lines[index + 1..end].to_vec();
    }

    fn lines_for(&mut self, path: &str) -> Option<&Vec<String>> {
        self.cache
            .entry(path.to_string())
            .or_insert_with(|| match fs::read_to_string(path) {
                Ok(contents) => Some(contents.lines().map(String::from).collect()),
                Err(e) => {
                    debug!(path, "failed to read source file: {}", e);
                    None
                }
            })
            .as_ref()
    }
}

/// One-shot helper over a throwaway reader.
pub fn attach_source_context(stacktrace: &mut Stacktrace, config: &Config) {
    SourceReader::new().attach_context(stacktrace, config.context_lines);
}

#[cfg(test)]
mod test {
    use super::*;
    use std::path::PathBuf;

    fn fixture(name: &str, lines: usize) -> PathBuf {
        let path = std::env::temp_dir().join(format!("snare-{}-{name}", std::process::id()));
        let contents: Vec<String> = (1..=lines).map(|i| format!("line {i}")).collect();
        fs::write(&path, contents.join("\n")).unwrap();
        path
    }

    fn frame_at(path: &str, lineno: u32) -> Frame {
        Frame {
            abs_path: Some(path.to_string()),
            lineno: Some(lineno),
            ..Frame::default()
        }
    }

    #[test]
    fn attaches_surrounding_lines() {
        let path = fixture("ctx", 10);
        let mut frame = frame_at(path.to_str().unwrap(), 5);

        SourceReader::new().contextify(&mut frame, 2);
        assert_eq!(frame.pre_context, ["line 3", "line 4"]);
        assert_eq!(frame.context_line.as_deref(), Some("line 5"));
        assert_eq!(frame.post_context, ["line 6", "line 7"]);

        fs::remove_file(path).unwrap();
    }

    #[test]
    fn clamps_at_file_boundaries() {
        let path = fixture("edge", 3);
        let mut first = frame_at(path.to_str().unwrap(), 1);
        let mut last = frame_at(path.to_str().unwrap(), 3);

        let mut reader = SourceReader::new();
        reader.contextify(&mut first, 5);
        reader.contextify(&mut last, 5);

        assert!(first.pre_context.is_empty());
        assert_eq!(first.context_line.as_deref(), Some("line 1"));
        assert_eq!(first.post_context, ["line 2", "line 3"]);
        assert_eq!(last.pre_context, ["line 1", "line 2"]);
        assert_eq!(last.context_line.as_deref(), Some("line 3"));
        assert!(last.post_context.is_empty());

        fs::remove_file(path).unwrap();
    }

    #[test]
    fn unreadable_files_leave_frames_untouched() {
        let mut frame = frame_at("/nonexistent/snare/source.rs", 3);
        let mut reader = SourceReader::new();
        reader.contextify(&mut frame, 2);
        reader.contextify(&mut frame, 2);

        assert!(frame.pre_context.is_empty());
        assert_eq!(frame.context_line, None);
        assert!(frame.post_context.is_empty());
        // The failure is cached rather than retried.
        assert_eq!(reader.cache.len(), 1);
    }

    #[test]
    fn out_of_range_line_attaches_nothing() {
        let path = fixture("short", 2);
        let mut frame = frame_at(path.to_str().unwrap(), 40);

        SourceReader::new().contextify(&mut frame, 2);
        assert_eq!(frame.context_line, None);

        fs::remove_file(path).unwrap();
    }
}
