//! The error-side entry into stack capture.
//!
//! Some errors are constructed far from where they are finally observed,
//! and a stack captured at the observation point would describe the wrong
//! place. Errors that recorded their construction-site program counters can
//! hand them over through [`StackCarrier`]; [`Traced`] is the wrapper this
//! crate provides for doing that recording.

use std::error::Error;
use std::fmt;

use crate::capture::ProgramCounter;
use crate::config::DEFAULT_MAX_FRAMES;

/// Capability interface for errors that know the program-counter chain of
/// the call stack they were constructed on.
///
/// The accessor's default body reports no captured stack, which is the
/// common case for ordinary errors; types that do capture override it.
/// Probing happens through this one method, never through reflection-style
/// inspection.
pub trait StackCarrier: Error {
    /// The captured program-counter chain, innermost call first.
    fn captured_pcs(&self) -> Option<&[ProgramCounter]> {
        None
    }
}

/// Extracts the program-counter chain from the immediate error value.
///
/// Wrapped sources are deliberately not traversed; which error in a chain
/// gets its stack reported is the caller's policy. A missing capability or
/// an empty chain both mean "no stack available", an expected outcome
/// rather than a failure.
pub fn pcs_from_error(err: &dyn StackCarrier) -> Option<Vec<ProgramCounter>> {
    match err.captured_pcs() {
        Some(pcs) if !pcs.is_empty() => Some(pcs.to_vec()),
        _ => None,
    }
}

/// Wraps an error with the program counters of the call stack at wrap time.
pub struct Traced<E> {
    inner: E,
    pcs: Vec<ProgramCounter>,
}

impl<E: Error> Traced<E> {
    /// Wraps `inner`, recording the current call stack as raw program
    /// counters. Recording is cheap; resolution is deferred until a
    /// stacktrace is actually built.
    pub fn new(inner: E) -> Self {
        Self::with_limit(inner, DEFAULT_MAX_FRAMES)
    }

    pub fn with_limit(inner: E, limit: usize) -> Self {
        let mut pcs = Vec::new();
        backtrace::trace(|frame| {
            if pcs.len() >= limit {
                return false;
            }
            pcs.push(frame.ip() as ProgramCounter);
            true
        });
        Traced { inner, pcs }
    }

    pub fn into_inner(self) -> E {
        self.inner
    }
}

impl<E: fmt::Debug> fmt::Debug for Traced<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Traced")
            .field("inner", &self.inner)
            .field("pcs", &self.pcs.len())
            .finish()
    }
}

impl<E: fmt::Display> fmt::Display for Traced<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.fmt(f)
    }
}

impl<E: Error + 'static> Error for Traced<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.inner)
    }
}

impl<E: Error + 'static> StackCarrier for Traced<E> {
    fn captured_pcs(&self) -> Option<&[ProgramCounter]> {
        Some(&self.pcs)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Debug)]
    struct PlainError;

    impl fmt::Display for PlainError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "plain error")
        }
    }

    impl Error for PlainError {}
    impl StackCarrier for PlainError {}

    #[derive(Debug)]
    struct EmptyChainError;

    impl fmt::Display for EmptyChainError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "empty chain")
        }
    }

    impl Error for EmptyChainError {}
    impl StackCarrier for EmptyChainError {
        fn captured_pcs(&self) -> Option<&[ProgramCounter]> {
            Some(&[])
        }
    }

    #[test]
    fn absent_capability_means_no_stack() {
        assert_eq!(pcs_from_error(&PlainError), None);
    }

    #[test]
    fn empty_chain_means_no_stack() {
        assert_eq!(pcs_from_error(&EmptyChainError), None);
    }

    #[test]
    fn traced_records_the_construction_stack() {
        let traced = Traced::new(PlainError);
        let pcs = pcs_from_error(&traced).expect("construction stack recorded");
        assert!(!pcs.is_empty());
    }

    #[test]
    fn traced_respects_its_limit() {
        let traced = Traced::with_limit(PlainError, 4);
        let pcs = pcs_from_error(&traced).expect("construction stack recorded");
        assert!(pcs.len() <= 4);
    }

    #[test]
    fn traced_preserves_display_and_source() {
        let traced = Traced::new(PlainError);
        assert_eq!(traced.to_string(), "plain error");
        assert!(traced.source().is_some());
    }
}
