//! Stack walking and the capture pipeline.
//!
//! The host runtime's call-stack API is isolated behind the narrow
//! [`StackSource`] trait so the build/classify/order pipeline stays a pure
//! function over raw descriptors, testable with synthetic sources.

use std::ffi::c_void;

#[cfg(test)]
use mockall::automock;

use crate::config::Config;
use crate::frames::filter::should_keep;
use crate::frames::{Frame, RawFrame};
use crate::types::Stacktrace;

/// Opaque address identifying a call-stack location, meaningful only to the
/// runtime's frame-resolution facility.
pub type ProgramCounter = usize;

/// Narrow seam over the host runtime's call-stack facility.
#[cfg_attr(test, automock)]
pub trait StackSource {
    /// Walks the live call stack, returning up to `limit` raw frames,
    /// innermost first, starting `skip` frames above the capture call.
    fn capture(&self, skip: usize, limit: usize) -> Vec<RawFrame>;

    /// Resolves an already-captured program-counter chain into raw frames,
    /// preserving its innermost-first order.
    fn resolve(&self, pcs: &[ProgramCounter]) -> Vec<RawFrame>;
}

/// The production source, backed by the `backtrace` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct BacktraceSource;

impl StackSource for BacktraceSource {
    fn capture(&self, skip: usize, limit: usize) -> Vec<RawFrame> {
        let mut raw = Vec::new();
        let mut in_walker_preamble = true;
        let mut skipped = 0;
        backtrace::trace(|frame| {
            if raw.len() >= limit {
                return false;
            }
            let entry = resolve_pc(frame.ip());
            // The walker reports its own machinery first; `skip` counts
            // from the first frame outside it.
            if in_walker_preamble && is_walker_frame(&entry.function) {
                return true;
            }
            in_walker_preamble = false;
            if skipped < skip {
                skipped += 1;
                return true;
            }
            raw.push(entry);
            true
        });
        raw
    }

    fn resolve(&self, pcs: &[ProgramCounter]) -> Vec<RawFrame> {
        let mut raw: Vec<RawFrame> = pcs
            .iter()
            .map(|pc| resolve_pc(*pc as *mut c_void))
            .collect();
        let preamble = raw
            .iter()
            .position(|entry| !is_walker_frame(&entry.function))
            .unwrap_or(raw.len());
        raw.drain(..preamble);
        raw
    }
}

fn is_walker_frame(function: &str) -> bool {
    function.starts_with("backtrace.") || function.starts_with("backtrace/")
}

fn resolve_pc(pc: *mut c_void) -> RawFrame {
    let mut raw = RawFrame::default();
    backtrace::resolve(pc, |symbol| {
        // Inlined frames resolve to several symbols; the first one is the
        // actual call site.
        if raw.function.is_empty() {
            if let Some(name) = symbol.name() {
                raw.function = qualify_symbol_name(&name.to_string());
            }
        }
        if raw.file.is_empty() {
            if let Some(file) = symbol.filename() {
                raw.file = file.to_string_lossy().into_owned();
            }
        }
        if raw.line == 0 {
            raw.line = symbol.lineno().unwrap_or(0);
        }
        if raw.column == 0 {
            raw.column = symbol.colno().unwrap_or(0);
        }
    });
    raw
}

// Demangled symbols look like `crate::module::function::h0123456789abcdef`.
// Requalify them into the `<module-path>.<local-signature>` convention so
// live captures flow through the same splitter/classifier path and
// self-filtering applies to this crate's own frames.
fn qualify_symbol_name(demangled: &str) -> String {
    let flattened = flatten_trait_impl(demangled);
    let mut segments: Vec<&str> = flattened.split("::").collect();
    if segments.len() > 1 && is_symbol_hash(segments[segments.len() - 1]) {
        segments.pop();
    }
    match segments.split_last() {
        Some((signature, [])) => (*signature).to_string(),
        Some((signature, path)) => format!("{}.{}", path.join("/"), signature),
        None => String::new(),
    }
}

// Trait methods demangle as `<Type as Trait>::method`; the type path is the
// half that locates the code, so flatten to `Type::method` before splitting.
fn flatten_trait_impl(demangled: &str) -> std::borrow::Cow<'_, str> {
    let flatten = || {
        let (type_path, rest) = demangled.strip_prefix('<')?.split_once(" as ")?;
        let (_, method) = rest.split_once(">::")?;
        Some(format!("{type_path}::{method}"))
    };
    match flatten() {
        Some(flattened) => std::borrow::Cow::Owned(flattened),
        None => std::borrow::Cow::Borrowed(demangled),
    }
}

fn is_symbol_hash(segment: &str) -> bool {
    segment.len() == 17
        && segment.starts_with('h')
        && segment[1..].bytes().all(|b| b.is_ascii_hexdigit())
}

/// Runs raw entries through the build/classify pipeline and orders the
/// survivors outermost-caller-first.
///
/// Input order is top-of-stack-first, the order every source reports.
/// Dropped frames disappear entirely; adjacent duplicates from
/// double-counted call boundaries collapse to one. Empty input, or input
/// that is filtered away completely, yields an empty stacktrace rather than
/// an error.
pub fn assemble_stacktrace(raw: &[RawFrame], config: &Config) -> Stacktrace {
    let mut frames: Vec<Frame> = Vec::with_capacity(raw.len().min(config.max_frames));
    for entry in raw.iter().take(config.max_frames) {
        let mut frame = Frame::from(entry);
        if !should_keep(frame.module.as_deref().unwrap_or(""), config) {
            continue;
        }
        frame.in_app = true;
        if frames.last() == Some(&frame) {
            continue;
        }
        frames.push(frame);
    }
    frames.reverse();
    Stacktrace { frames }
}

/// Captures a stacktrace through the given source.
pub fn stacktrace_from_source(
    source: &dyn StackSource,
    skip: usize,
    config: &Config,
) -> Stacktrace {
    assemble_stacktrace(&source.capture(skip, config.max_frames), config)
}

/// Resolves a program-counter chain through the given source and assembles
/// the result.
pub fn stacktrace_from_pcs(
    pcs: &[ProgramCounter],
    source: &dyn StackSource,
    config: &Config,
) -> Stacktrace {
    let bounded = &pcs[..pcs.len().min(config.max_frames)];
    assemble_stacktrace(&source.resolve(bounded), config)
}
