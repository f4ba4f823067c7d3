//! CLI command handlers, one per file.

mod completions;
mod image;
mod inspect;
mod man;

pub use completions::run_completions;
pub use image::run_image;
pub use inspect::run_inspect;
pub use man::run_man;
