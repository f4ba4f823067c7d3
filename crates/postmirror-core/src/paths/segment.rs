//! URL helpers: final path segment and relative resolution.

/// Extracts the last path segment of `url` (query and fragment excluded),
/// percent-decoded. A segment whose escapes do not decode to UTF-8 is kept
/// in its encoded form.
///
/// Falls back to a plain split on `/` when the URL does not parse, so
/// scheme-less values still yield a name. Returns `None` for an empty or
/// root path.
pub fn last_path_segment(url: &str) -> Option<String> {
    let segment = match url::Url::parse(url) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
            .map(str::to_string),
        Err(_) => {
            let path = url.split(['?', '#']).next().unwrap_or("");
            path.rsplit('/')
                .find(|s| !s.is_empty())
                .map(str::to_string)
        }
    }?;
    let segment = match urlencoding::decode(&segment) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => segment,
    };
    if segment == "." || segment == ".." {
        return None;
    }
    Some(segment)
}

/// Resolves a resource reference found on `page_url` to an absolute URL.
/// Absolute references are returned unchanged; unresolvable input is kept as-is.
pub fn resolve_resource_url(page_url: &str, reference: &str) -> String {
    match url::Url::parse(page_url).and_then(|base| base.join(reference)) {
        Ok(resolved) => resolved.to_string(),
        Err(_) => reference.to_string(),
    }
}
