//! Keep-or-drop classification for built frames.
//!
//! A captured trace should begin at the first frame of genuine caller code.
//! Frames from the runtime's own scaffolding and from this library's own
//! plumbing are removed entirely, not merely demoted to non-app status.

use crate::config::Config;

// Modules the runtime reserves for goroutine/thread bootstrap and
// test-harness execution. Frames from these never describe caller code.
const RUNTIME_MODULES: &[&str] = &["runtime", "testing"];

/// Decides whether a built frame belongs in the final stacktrace.
///
/// Everything that survives is application code from the capturer's point
/// of view and gets `in_app = true`.
pub fn should_keep(module: &str, config: &Config) -> bool {
    if RUNTIME_MODULES.contains(&module) {
        return false;
    }
    !is_library_internal(module, &config.self_module)
}

// Matches the library's own root module and its `/`-delimited sub-packages.
// The boundary check matters: an external test package named
// `<root>_test` shares the textual prefix but is caller code, and exists
// precisely to exercise behavior the library observes.
fn is_library_internal(module: &str, self_module: &str) -> bool {
    if self_module.is_empty() {
        return false;
    }
    match module.strip_prefix(self_module) {
        Some("") => true,
        Some(rest) => rest.starts_with('/'),
        None => false,
    }
}
