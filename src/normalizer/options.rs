use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Error;

/// How placeholder indices are scoped across a multi-statement script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Numbering {
    /// Every statement numbers from its own floor.
    #[default]
    PerStatement,
    /// One counter for the whole script, floored by the highest `$n` anywhere.
    Script,
}

impl fmt::Display for Numbering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Numbering::PerStatement => write!(f, "per-statement"),
            Numbering::Script => write!(f, "script"),
        }
    }
}

impl std::str::FromStr for Numbering {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "per-statement" => Ok(Numbering::PerStatement),
            "script" => Ok(Numbering::Script),
            _ => Err(format!("Invalid numbering mode: {s}")),
        }
    }
}

/// Knobs of a [`Normalizer`](super::Normalizer).
///
/// Every field has a default, so `{}` is a valid options document. Unknown
/// keys are rejected to catch typos in configuration files.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NormalizeOptions {
    /// Placeholder numbering scope.
    pub numbering: Numbering,
    /// Let `GROUP BY` elements reuse the placeholders of an identical `SELECT` target.
    pub match_group_by_targets: bool,
    /// Leave function, procedure and `DO` bodies untouched instead of replacing them.
    pub keep_routine_bodies: bool,
}

impl NormalizeOptions {
    /// Decode options from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn empty_document_yields_defaults() {
        let options = NormalizeOptions::from_json("{}").unwrap();
        assert_eq!(options, NormalizeOptions::default());
        assert_eq!(options.numbering, Numbering::PerStatement);
        assert!(!options.match_group_by_targets);
        assert!(!options.keep_routine_bodies);
    }

    #[test]
    fn fields_decode_from_snake_case() {
        let options = NormalizeOptions::from_json(
            r#"{"numbering": "script", "match_group_by_targets": true}"#,
        )
        .unwrap();
        assert_eq!(options.numbering, Numbering::Script);
        assert!(options.match_group_by_targets);
        assert!(!options.keep_routine_bodies);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = NormalizeOptions::from_json(r#"{"numbring": "script"}"#).unwrap_err();
        assert!(matches!(err, Error::Options(_)));
        assert!(err.to_string().contains("unknown field"));
    }

    #[test]
    fn numbering_parses_cli_spellings() {
        assert_eq!(Numbering::from_str("per-statement"), Ok(Numbering::PerStatement));
        assert_eq!(Numbering::from_str("PER_STATEMENT"), Ok(Numbering::PerStatement));
        assert_eq!(Numbering::from_str("script"), Ok(Numbering::Script));
        assert_eq!(format!("{}", Numbering::Script), "script");

        let err = Numbering::from_str("global").expect_err("unknown mode should fail");
        assert!(err.contains("Invalid numbering mode: global"));
    }
}
