//! Function-name processing that makes frames stable for grouping.
//!
//! Qualified names arrive as `<module-path>.<local-signature>`, where the
//! module path can contain `/`-separated segments and the local signature is
//! a dot-separated chain of enclosing-scope tokens. Nested anonymous
//! functions get named by concatenating that whole chain, so editing an
//! enclosing function renumbers every closure beneath it and breaks issue
//! grouping for code that never changed. The normalizer here strips the
//! volatile part of the chain.

/// Splits a fully qualified function identifier into its module path and
/// local signature.
///
/// The separator is the first `.` after the last `/`: module paths can
/// contain dotted hostname segments, and the final path segment encodes
/// literal dots as `%2e`, so nothing before that point can be the separator.
/// The local signature can itself contain further dots (`Test.func2.1.1`),
/// which is why the split stops at the first one.
///
/// Malformed input degrades instead of failing: no separator at all means an
/// empty module path and the whole string as the signature.
pub fn split_qualified_name(qualified: &str) -> (&str, &str) {
    let path_end = qualified.rfind('/').map_or(0, |i| i + 1);
    match qualified[path_end..].find('.') {
        Some(offset) => {
            let separator = path_end + offset;
            (&qualified[..separator], &qualified[separator + 1..])
        }
        None => ("", qualified),
    }
}

/// Strips the enclosing-scope prefix from a local function signature,
/// leaving the rightmost meaningful token and its closure-index suffix.
///
/// Scanning right to left, the maximal trailing run of closure-index tokens
/// (`funcN` or a bare decimal) marks the nesting ordinals; the token to
/// their left is the anchor. Everything left of the anchor is prefix and is
/// discarded wholesale, whatever it contains. A signature with no prefix is
/// returned unchanged.
pub fn strip_origin_prefix(signature: &str) -> &str {
    let tokens: Vec<&str> = signature.split('.').collect();

    let mut anchor = tokens.len() - 1;
    while anchor > 0 && is_closure_index(tokens[anchor]) {
        anchor -= 1;
    }
    if anchor == 0 {
        return signature;
    }

    // The anchor and its suffix are a contiguous tail of the input, so the
    // result is a plain subslice.
    let offset: usize = tokens[..anchor].iter().map(|t| t.len() + 1).sum();
    &signature[offset..]
}

fn is_closure_index(token: &str) -> bool {
    let digits = token.strip_prefix("func").unwrap_or(token);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}
