use thiserror::Error;

/// A tokenizer or grammar failure, located in the source text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (line {line}, column {column})")]
pub struct ParseError {
    /// Human-readable diagnostic, e.g. `syntax error at or near "FROM"`.
    pub message: String,
    /// Byte offset of the offending token in the source.
    pub location: usize,
    /// 1-based line of `location`.
    pub line: usize,
    /// 1-based character column of `location`.
    pub column: usize,
}

impl ParseError {
    /// Build an error for `location`, deriving line and column from `source`.
    pub fn at(message: impl Into<String>, source: &str, location: usize) -> Self {
        let location = location.min(source.len());
        let prefix = source.get(..location).unwrap_or(source);
        let line = prefix.matches('\n').count() + 1;
        let line_start = prefix.rfind('\n').map_or(0, |idx| idx + 1);
        let column = prefix[line_start..].chars().count() + 1;
        Self {
            message: message.into(),
            location,
            line,
            column,
        }
    }
}

/// Errors surfaced by the normalizer.
#[derive(Debug, Error)]
pub enum Error {
    /// The input is not syntactically valid SQL.
    #[error("SQL parse error: {0}")]
    Parse(#[from] ParseError),
    /// A normalizer options document could not be decoded.
    #[error("Invalid normalizer options: {0}")]
    Options(#[from] serde_json::Error),
}

impl Error {
    /// The underlying parse error, when this is one.
    pub fn as_parse_error(&self) -> Option<&ParseError> {
        match self {
            Error::Parse(error) => Some(error),
            Error::Options(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_locates_line_and_column() {
        let source = "SELECT 1;\nSELECT FROM WHERE";
        let location = source.find("WHERE").unwrap();
        let error = ParseError::at("syntax error at or near \"WHERE\"", source, location);

        assert_eq!(error.line, 2);
        assert_eq!(error.column, 13);
        assert_eq!(
            error.to_string(),
            "syntax error at or near \"WHERE\" (line 2, column 13)"
        );
    }

    #[test]
    fn parse_error_clamps_location_past_end() {
        let error = ParseError::at("syntax error at end of input", "SELECT (", 99);
        assert_eq!(error.location, 8);
        assert_eq!(error.column, 9);
    }

    #[test]
    fn error_wraps_parse_error() {
        let error: Error = ParseError::at("boom", "x", 0).into();
        assert!(error.as_parse_error().is_some());
        assert!(error.to_string().starts_with("SQL parse error: boom"));
    }
}
