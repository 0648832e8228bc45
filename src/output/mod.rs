/// Output formats and writing rendered results to disk.
pub mod formatter;
/// Builds a Markdown summary report from normalization results.
pub mod report;

pub use formatter::{render, write_output, NormalizedInput, OutputFormat};
