//! Title to directory-name conversion.

/// Default maximum length (in characters) of a sanitized name
pub const MAX_SAFE_NAME_LEN: usize = 50;

/// Convert a human-readable title into a filesystem-safe directory token.
///
/// Keeps alphanumerics, spaces, hyphens and underscores, strips trailing
/// whitespace, turns the remaining spaces into underscores and truncates to
/// `max_len` characters. Distinct titles may map to the same token; callers
/// address nodes by index, never by this name alone.
pub fn sanitize_with_len(name: &str, max_len: usize) -> String {
    let kept: String = name
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect();

    kept.trim_end()
        .replace(' ', "_")
        .chars()
        .take(max_len)
        .collect()
}

/// [`sanitize_with_len`] with the default length bound.
pub fn sanitize(name: &str) -> String {
    sanitize_with_len(name, MAX_SAFE_NAME_LEN)
}
