//! Deterministic cache key construction.
//!
//! Keys concatenate a namespace and the string-coerced argument list with a
//! fixed delimiter. No argument introspection happens beyond string
//! coercion, so value-equal inputs always map to the same key.

/// Delimiter between the namespace and each argument.
pub const KEY_DELIMITER: &str = "_";

/// Build the storage key for `namespace` and an ordered argument list.
///
/// Underscores are stripped from the namespace and from every argument
/// before joining, which keeps the delimiter unambiguous inside a key but
/// means inputs differing only in underscore placement collide:
/// `build_key("a_b", &["1"]) == build_key("ab", &["1"])`. Known caveat,
/// kept deliberately and pinned by a test; callers pick namespaces with
/// that in mind.
#[must_use]
pub fn build_key<S: AsRef<str>>(namespace: &str, args: &[S]) -> String {
    let mut parts = Vec::with_capacity(args.len() + 1);
    parts.push(strip_underscores(namespace));
    parts.extend(args.iter().map(|arg| strip_underscores(arg.as_ref())));
    parts.join(KEY_DELIMITER)
}

/// Prefix under which every key built from `namespace` is stored; the
/// natural input to prefix-based invalidation.
#[must_use]
pub fn namespace_prefix(namespace: &str) -> String {
    let mut prefix = strip_underscores(namespace);
    prefix.push_str(KEY_DELIMITER);
    prefix
}

fn strip_underscores(text: &str) -> String {
    text.replace('_', "")
}
