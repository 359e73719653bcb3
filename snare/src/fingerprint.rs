//! Grouping signatures over normalized stacktraces.

use sha2::{Digest, Sha512};

use crate::types::Stacktrace;

/// Produces the grouping signature for a stacktrace, or `None` when there
/// are no frames to group on.
///
/// Only in-app frames carry signal: library and runtime frames move with
/// dependency upgrades while the application call chain stays put. When
/// nothing at all is in-app the whole trace is hashed instead, so two
/// all-library traces still group apart from each other.
pub fn stacktrace_fingerprint(stacktrace: &Stacktrace) -> Option<String> {
    if stacktrace.frames.is_empty() {
        return None;
    }

    let mut hasher = Sha512::new();
    let any_in_app = stacktrace.frames.iter().any(|f| f.in_app);
    for frame in stacktrace
        .frames
        .iter()
        .filter(|f| f.in_app || !any_in_app)
    {
        frame.include_in_fingerprint(&mut hasher);
    }

    let result = hasher.finalize();
    Some(format!("{result:x}"))
}
