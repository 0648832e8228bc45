use std::fmt;
use std::path::Path;

use serde::Serialize;

use crate::error::Error;
use crate::normalizer::Normalization;
use crate::output::report;

/// Rendering of normalization results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Normalized SQL only.
    #[default]
    Text,
    /// Normalized SQL plus the detailed report, as JSON.
    Json,
    /// Markdown summary report.
    Markdown,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "sql" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            _ => Err(format!("Invalid output format: {s}")),
        }
    }
}

/// The outcome of normalizing one input unit: a file, stdin, or one line.
#[derive(Debug, Clone, Serialize)]
pub struct NormalizedInput {
    /// Where the input came from (`path`, `path:line`, `<stdin>`).
    pub label: String,
    /// Normalized text and report on success.
    #[serde(flatten)]
    pub normalization: Option<Normalization>,
    /// Error message on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl NormalizedInput {
    /// Record the result of normalizing the input called `label`.
    pub fn new(label: impl Into<String>, result: Result<Normalization, Error>) -> Self {
        let (normalization, error) = match result {
            Ok(normalization) => (Some(normalization), None),
            Err(e) => (None, Some(e.to_string())),
        };
        Self {
            label: label.into(),
            normalization,
            error,
        }
    }

    /// `true` when normalization failed.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Render `inputs` in `format`.
pub fn render(format: OutputFormat, inputs: &[NormalizedInput]) -> Result<String, String> {
    match format {
        OutputFormat::Text => Ok(render_text(inputs)),
        OutputFormat::Json => serde_json::to_string_pretty(inputs)
            .map(|mut json| {
                json.push('\n');
                json
            })
            .map_err(|e| format!("Failed to serialize results: {e}")),
        OutputFormat::Markdown => Ok(report::build_report(inputs)),
    }
}

/// Normalized text of every successful input, each ending with a newline.
/// Failed inputs produce no text; callers report them separately.
fn render_text(inputs: &[NormalizedInput]) -> String {
    let mut out = String::new();
    for normalization in inputs.iter().filter_map(|input| input.normalization.as_ref()) {
        out.push_str(&normalization.normalized);
        if !out.ends_with('\n') {
            out.push('\n');
        }
    }
    out
}

/// Write rendered output to `path`, creating parent directories as needed.
pub fn write_output(path: &Path, content: &str) -> Result<(), String> {
    if path.as_os_str().is_empty() {
        return Err("Output path must not be empty".to_string());
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create output directory: {e}"))?;
    }
    std::fs::write(path, content).map_err(|e| format!("Failed to write {}: {e}", path.display()))
}
