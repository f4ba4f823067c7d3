#![allow(dead_code)]

pub mod page_server;

/// A post page in the shape the default selectors expect.
pub fn post_html(title: &str, meta: &str, images: &[String]) -> String {
    let imgs: String = images
        .iter()
        .map(|src| format!("<img src=\"{}\">\n", src))
        .collect();
    format!(
        "<!DOCTYPE html>\n<html><head><title>{title}</title></head><body>\n\
         <div class=\"main\"><h1>{title}</h1><h2>{meta}</h2></div>\n\
         <div class=\"pic\">\n{imgs}</div>\n</body></html>\n"
    )
}

/// Deterministic test payload of `len` bytes.
pub fn payload(seed: u8, len: usize) -> Vec<u8> {
    (0..len).map(|i| seed.wrapping_add(i as u8)).collect()
}
