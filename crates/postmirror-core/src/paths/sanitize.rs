//! Single-component path sanitization.

/// Reduces `name` to one safe path component on Linux.
///
/// - Replaces NUL, `/`, `\`, and control characters with `_`
/// - Trims leading/trailing whitespace and dots
/// - Limits length to 255 bytes (Linux NAME_MAX)
///
/// Spaces inside the name are kept. Returns `fallback` when nothing usable is left.
pub fn sanitize_component(name: &str, fallback: &str) -> String {
    const NAME_MAX: usize = 255;

    let replaced: String = name
        .chars()
        .map(|c| {
            if c == '\0' || c == '/' || c == '\\' || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();

    let trimmed = replaced.trim_matches(|c: char| c.is_whitespace() || c == '.');

    let limited = if trimmed.len() > NAME_MAX {
        let mut take = NAME_MAX;
        while take > 0 && !trimmed.is_char_boundary(take) {
            take -= 1;
        }
        &trimmed[..take]
    } else {
        trimmed
    };

    if limited.is_empty() {
        fallback.to_string()
    } else {
        limited.to_string()
    }
}
