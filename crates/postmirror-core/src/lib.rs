pub mod config;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod mirror;
pub mod parser;
pub mod paths;
pub mod types;
pub mod units;

pub use error::{ErrorKind, FetchError, Field, PageError, ParseError};
pub use mirror::{Mirror, MirrorEvent, PageStage, ResourceStage};
pub use types::{PageDescriptor, PageFailure, PageResult, ResourceOutcome, ResourceReport, RunSummary, Totals};
