//! Text decoding for fetched documents.
//!
//! The charset comes from a byte-order mark, else the `Content-Type` header,
//! else a `<meta>` declaration near the top of the body. Nothing declared
//! means UTF-8. Decoding is strict: malformed input is an error, never
//! replacement characters.

use encoding_rs::{Encoding, UTF_8};

/// How far into the body a `<meta>` charset declaration is looked for.
const META_SNIFF_LIMIT: usize = 1024;

/// `charset` parameter of a `Content-Type` value, unquoted.
pub fn from_content_type(value: &str) -> Option<&str> {
    value.split(';').skip(1).find_map(|param| {
        let (name, label) = param.split_once('=')?;
        if !name.trim().eq_ignore_ascii_case("charset") {
            return None;
        }
        let label = label.trim().trim_matches(['"', '\'']);
        (!label.is_empty()).then_some(label)
    })
}

/// Charset named by `<meta charset=..>` or `<meta http-equiv=.. content="..; charset=..">`.
pub fn from_meta(body: &[u8]) -> Option<String> {
    let head = &body[..body.len().min(META_SNIFF_LIMIT)];
    let lower = String::from_utf8_lossy(head).to_ascii_lowercase();
    let mut rest = lower.as_str();
    while let Some(pos) = rest.find("<meta") {
        let tag = &rest[pos..];
        let tag_end = tag.find('>').unwrap_or(tag.len());
        if let Some(at) = tag[..tag_end].find("charset=") {
            let value = tag[at + "charset=".len()..tag_end].trim_start_matches(['"', '\'']);
            let end = value
                .find(|c: char| matches!(c, '"' | '\'' | ';' | '/') || c.is_whitespace())
                .unwrap_or(value.len());
            if end > 0 {
                return Some(value[..end].to_string());
            }
        }
        rest = &tag["<meta".len()..];
    }
    None
}

/// Decodes `body` to text. `Err` carries a human-readable reason.
pub fn decode(body: &[u8], content_type: Option<&str>) -> Result<String, String> {
    let (encoding, start) = match Encoding::for_bom(body) {
        Some((encoding, bom_len)) => (encoding, bom_len),
        None => {
            let encoding = match content_type.and_then(from_content_type) {
                Some(label) => lookup(label)?,
                // An ASCII-compatible body cannot declare UTF-16 about itself.
                None => match from_meta(body) {
                    Some(label) => lookup(&label)?.output_encoding(),
                    None => UTF_8,
                },
            };
            (encoding, 0)
        }
    };
    encoding
        .decode_without_bom_handling_and_without_replacement(&body[start..])
        .map(|text| text.into_owned())
        .ok_or_else(|| format!("body is not valid {}", encoding.name()))
}

fn lookup(label: &str) -> Result<&'static Encoding, String> {
    Encoding::for_label(label.as_bytes()).ok_or_else(|| format!("unknown charset {:?}", label))
}
