//! Destination layout: `<root>/<classification>/<title>/[NN]<segment>`.
//!
//! Every name taken from a page or a URL is reduced to a single safe path
//! component before it touches the filesystem.

mod sanitize;
mod segment;

pub use sanitize::sanitize_component;
pub use segment::{last_path_segment, resolve_resource_url};

use crate::types::PageDescriptor;
use std::path::{Path, PathBuf};

/// Fallback for a classification or title that sanitizes to nothing.
const UNTITLED: &str = "untitled";
/// Fallback for a resource URL without a usable final segment.
const DEFAULT_FILENAME: &str = "download.bin";

/// Directory a page's resources are written to.
pub fn page_dir(root: &Path, descriptor: &PageDescriptor) -> PathBuf {
    root.join(sanitize_component(&descriptor.classification, UNTITLED))
        .join(sanitize_component(&descriptor.title, UNTITLED))
}

/// Filename for the resource at zero-based `index`: 1-based, zero-padded to
/// width 2, followed by the URL's final path segment.
///
/// # Examples
///
/// - `resource_filename(0, "http://x/a.jpg")` → `"[01]a.jpg"`
/// - `resource_filename(11, "http://x/img/b.png?w=300")` → `"[12]b.png"`
/// - `resource_filename(0, "http://x/%E5%9B%BE.jpg")` → `"[01]图.jpg"`
pub fn resource_filename(index: usize, url: &str) -> String {
    let segment = last_path_segment(url)
        .map(|s| sanitize_component(&s, DEFAULT_FILENAME))
        .unwrap_or_else(|| DEFAULT_FILENAME.to_string());
    format!("[{:02}]{}", index + 1, segment)
}
