//! Post metadata and image extraction from a parsed HTML document.
//!
//! The main-content region yields the title (first heading) and the
//! "<classification> <published_at>" pair (first sub-heading). Images are
//! collected document-wide from the picture selector, in document order.

use crate::config::SelectorConfig;
use crate::error::{Field, ParseError};
use crate::types::PageDescriptor;
use scraper::{ElementRef, Html, Selector};

/// A configured selector failed to compile.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {which} selector {selector:?}: {reason}")]
pub struct SelectorError {
    pub which: &'static str,
    pub selector: String,
    pub reason: String,
}

/// Compiled selectors; build once and share across page workers.
#[derive(Debug, Clone)]
pub struct PostParser {
    main_content: Selector,
    heading: Selector,
    subheading: Selector,
    picture: Selector,
}

fn compile(which: &'static str, selector: &str) -> Result<Selector, SelectorError> {
    Selector::parse(selector).map_err(|e| SelectorError {
        which,
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

impl PostParser {
    pub fn new(cfg: &SelectorConfig) -> Result<Self, SelectorError> {
        Ok(Self {
            main_content: compile("main_content", &cfg.main_content)?,
            heading: compile("heading", &cfg.heading)?,
            subheading: compile("subheading", &cfg.subheading)?,
            picture: compile("picture", &cfg.picture)?,
        })
    }

    /// Extract the page descriptor. Absent structure is a `MissingField`
    /// error, never a panic.
    pub fn parse(&self, doc: &Html) -> Result<PageDescriptor, ParseError> {
        let main = doc
            .select(&self.main_content)
            .next()
            .ok_or(ParseError::MissingField(Field::MainContent))?;

        let heading = main
            .select(&self.heading)
            .next()
            .ok_or(ParseError::MissingField(Field::Heading))?;
        let title = first_text(heading).ok_or(ParseError::MissingField(Field::Title))?;

        let subheading = main
            .select(&self.subheading)
            .next()
            .ok_or(ParseError::MissingField(Field::Subheading))?;
        let meta = first_text(subheading).unwrap_or_default();
        let mut tokens = meta.split_whitespace();
        let classification = tokens
            .next()
            .ok_or(ParseError::MissingField(Field::Classification))?;
        let published_at = tokens
            .next()
            .ok_or(ParseError::MissingField(Field::PublishedAt))?;

        Ok(PageDescriptor {
            classification: classification.trim().to_string(),
            title: title.trim().to_string(),
            published_at: published_at.trim().to_string(),
            resource_urls: self.resource_urls(doc),
        })
    }

    /// First attribute value of every picture element, document order, duplicates kept.
    fn resource_urls(&self, doc: &Html) -> Vec<String> {
        let mut urls = Vec::new();
        for img in doc.select(&self.picture) {
            match img.value().attrs().next() {
                Some((_, value)) if !value.trim().is_empty() => urls.push(value.trim().to_string()),
                _ => tracing::warn!(
                    position = urls.len(),
                    "skipping picture element without a usable first attribute"
                ),
            }
        }
        urls
    }
}

/// First non-blank text node under `el`, in document order.
fn first_text(el: ElementRef<'_>) -> Option<&str> {
    el.text().find(|t| !t.trim().is_empty())
}
