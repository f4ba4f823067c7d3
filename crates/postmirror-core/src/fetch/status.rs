//! HTTP status helpers.

/// 2xx is success; everything else (including curl's 0 for "no response") is not.
pub fn is_success(code: u32) -> bool {
    (200..300).contains(&code)
}

/// Extracts the code from a raw status line such as `HTTP/1.1 404 Not Found`.
/// Other header lines yield `None`. With redirects curl reports one status
/// line per hop; callers keep the last one.
pub(crate) fn parse_status_line(line: &[u8]) -> Option<u32> {
    let line = std::str::from_utf8(line).ok()?;
    let mut parts = line.split_whitespace();
    let proto = parts.next()?;
    if !proto.starts_with("HTTP/") {
        return None;
    }
    parts.next()?.parse().ok()
}
