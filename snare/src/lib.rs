//! Stack capture and normalization for error grouping.
//!
//! snare turns raw call-stack metadata into canonical, grouping-stable
//! [`Frame`]/[`Stacktrace`] values: it splits qualified function names,
//! strips the renumbering-prone prefixes that nested closures pick up,
//! drops runtime and instrumentation-library scaffolding, and serializes
//! the result to the wire schema an error-aggregation service groups on.
//! Delivery, rate limiting and the surrounding event envelope are someone
//! else's job.

use tracing::debug;

pub mod capture;
pub mod config;
pub mod context;
pub mod error;
pub mod fingerprint;
pub mod frames;
pub mod names;
pub mod traced;
pub mod types;

pub use capture::{
    stacktrace_from_pcs, stacktrace_from_source, BacktraceSource, ProgramCounter, StackSource,
};
pub use config::Config;
pub use error::Error;
pub use frames::{Frame, RawFrame};
pub use traced::{StackCarrier, Traced};
pub use types::{Exception, Mechanism, Stacktrace};

/// Captures the current call stack as a normalized stacktrace.
///
/// Safe to call from any number of concurrent call sites; each invocation
/// reads only its own stack and allocates its own result.
pub fn current_stacktrace(config: &Config) -> Stacktrace {
    capture::stacktrace_from_source(&BacktraceSource, 0, config)
}

/// Builds a stacktrace for an error that captured its own program counters.
///
/// Errors without that capability yield an empty stacktrace, which is the
/// normal outcome for ordinary errors, not a failure. Callers decide
/// whether to drop the empty result or attach it anyway.
pub fn stacktrace_from_error(
    err: &dyn StackCarrier,
    source: &dyn StackSource,
    config: &Config,
) -> Stacktrace {
    let Some(pcs) = traced::pcs_from_error(err) else {
        debug!("error carries no captured stack");
        return Stacktrace::default();
    };
    capture::stacktrace_from_pcs(&pcs, source, config)
}
