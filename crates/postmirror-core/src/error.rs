//! Error taxonomy shared by the fetcher, the parser and the mirror pipeline.
//!
//! Every error is local to the unit of work that produced it: a resource error
//! stays in that resource's report, a page error in that page's failure record.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// DOM field the parser expected but did not find.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    MainContent,
    Heading,
    Title,
    Subheading,
    Classification,
    PublishedAt,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::MainContent => "main content region",
            Field::Heading => "heading",
            Field::Title => "title text",
            Field::Subheading => "sub-heading",
            Field::Classification => "classification",
            Field::PublishedAt => "publish timestamp",
        };
        f.write_str(name)
    }
}

/// Failure classes. `Internal` is only produced when a worker thread dies
/// without reporting; the other kinds cover every expected failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// DNS, connect, timeout or other transport-level failure.
    Unreachable,
    /// The server answered with a status outside 2xx.
    BadStatus(u32),
    /// The body could not be read as a document.
    ParseFailed,
    /// Expected DOM structure is absent.
    MissingField(Field),
    /// Creating or writing a local file or directory failed.
    IoFailed,
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Unreachable => write!(f, "unreachable"),
            ErrorKind::BadStatus(code) => write!(f, "HTTP {}", code),
            ErrorKind::ParseFailed => write!(f, "malformed document"),
            ErrorKind::MissingField(field) => write!(f, "missing {}", field),
            ErrorKind::IoFailed => write!(f, "I/O failure"),
            ErrorKind::Internal => write!(f, "internal error"),
        }
    }
}

/// Error from a single fetch. `detail` carries the transport or I/O message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{kind} for {url}: {detail}")]
pub struct FetchError {
    pub kind: ErrorKind,
    pub url: String,
    pub detail: String,
}

impl FetchError {
    pub fn new(kind: ErrorKind, url: &str, detail: impl Into<String>) -> Self {
        Self {
            kind,
            url: url.to_string(),
            detail: detail.into(),
        }
    }
}

/// Error from `PostParser::parse`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
pub enum ParseError {
    #[error("missing {0}")]
    MissingField(Field),
}

impl ParseError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ParseError::MissingField(field) => ErrorKind::MissingField(*field),
        }
    }
}

/// Why a source page produced no `PageResult`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum PageError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("parse failed: {0}")]
    Parse(#[from] ParseError),
    #[error("cannot create {}: {detail}", .path.display())]
    CreateDir { path: PathBuf, detail: String },
    #[error("{lost} resource worker result(s) lost to a panicked worker")]
    WorkerPanicked { lost: usize },
}

impl PageError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PageError::Fetch(e) => e.kind,
            PageError::Parse(e) => e.kind(),
            PageError::CreateDir { .. } => ErrorKind::IoFailed,
            PageError::WorkerPanicked { .. } => ErrorKind::Internal,
        }
    }
}
