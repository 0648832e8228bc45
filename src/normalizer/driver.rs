use serde::Serialize;
use tracing::debug;

use super::options::{NormalizeOptions, Numbering};
use super::planner::{plan, Edit};
use super::rewriter::apply_edits;
use super::rules::{Disposition, LiteralSite};
use super::walker::{scan_statement, LiteralScan, UnsupportedConstruct};
use crate::error::Error;
use crate::parser::ast::Statement;
use crate::parser::lexer::{Span, Token};
use crate::parser::parse_script;

/// Normalize `source` with default options.
///
/// ```
/// let normalized = sqlnorm::normalize("SELECT * FROM t WHERE id = 42").unwrap();
/// assert_eq!(normalized, "SELECT * FROM t WHERE id = $1");
/// ```
pub fn normalize(source: &str) -> Result<String, Error> {
    Normalizer::default().normalize(source)
}

/// Replaces literal constants with positional placeholders.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    options: NormalizeOptions,
}

/// One literal replaced by a placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Substitution {
    /// Placeholder index.
    pub index: u32,
    /// Byte range of the literal in the input.
    pub span: Span,
    /// Literal text as written.
    pub original: String,
}

/// A literal left in place because of where it appears.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreservedLiteral {
    /// Byte range in the input.
    pub span: Span,
    /// Site that decided to keep it.
    pub site: LiteralSite,
    /// Literal text.
    pub text: String,
}

/// What happened to one statement of the input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatementReport {
    /// Statement kind, e.g. `select` or `utility`.
    pub kind: &'static str,
    /// Byte range of the statement in the input.
    pub span: Span,
    /// Replacements in source order.
    pub substitutions: Vec<Substitution>,
    /// Literals kept verbatim.
    pub preserved: Vec<PreservedLiteral>,
    /// Constructs without literal rules.
    pub unsupported: Vec<UnsupportedConstruct>,
}

/// Normalized text plus a per-statement account of the substitutions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Normalization {
    /// The normalized script.
    pub normalized: String,
    /// One report per statement, in source order.
    pub statements: Vec<StatementReport>,
}

impl Normalization {
    /// Total number of placeholders introduced.
    pub fn substitution_count(&self) -> usize {
        self.statements.iter().map(|s| s.substitutions.len()).sum()
    }
}

impl Normalizer {
    /// Create a normalizer with `options`.
    pub fn new(options: NormalizeOptions) -> Self {
        Self { options }
    }

    /// Create a normalizer from a JSON options document.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        NormalizeOptions::from_json(json).map(Self::new)
    }

    /// The options in effect.
    pub fn options(&self) -> &NormalizeOptions {
        &self.options
    }

    /// Normalize a statement or script.
    pub fn normalize(&self, source: &str) -> Result<String, Error> {
        self.normalize_detailed(source).map(|n| n.normalized)
    }

    /// Normalize a statement or script and report every decision taken.
    pub fn normalize_detailed(&self, source: &str) -> Result<Normalization, Error> {
        let script = parse_script(source)?;
        let mut script_next = highest_param(&script.tokens, None);
        let mut edits: Vec<Edit> = Vec::new();
        let mut statements = Vec::with_capacity(script.statements.len());

        for statement in &script.statements {
            let scan = scan_statement(statement, &script.tokens, &self.options);
            let mut next = match self.options.numbering {
                Numbering::PerStatement => highest_param(&script.tokens, Some(statement.span)),
                Numbering::Script => script_next,
            };
            let planned = plan(&scan.candidates, &mut next);
            if self.options.numbering == Numbering::Script {
                script_next = next;
            }
            debug!(
                kind = statement.kind.name(),
                start = statement.span.start,
                substitutions = planned.len(),
                candidates = scan.candidates.len(),
                "planned statement"
            );
            statements.push(report(source, statement, &scan, &planned));
            edits.extend(planned);
        }

        Ok(Normalization {
            normalized: apply_edits(source, &edits),
            statements,
        })
    }
}

/// Highest `$n` among the tokens, restricted to `within` when given; 0 when
/// there is none.
fn highest_param(tokens: &[Token<'_>], within: Option<Span>) -> u32 {
    tokens
        .iter()
        .filter(|token| within.map_or(true, |span| span.contains(token.span)))
        .filter_map(Token::param_index)
        .max()
        .unwrap_or(0)
}

fn report(source: &str, statement: &Statement, scan: &LiteralScan, edits: &[Edit]) -> StatementReport {
    let text = |span: Span| source.get(span.start..span.end).unwrap_or_default().to_string();
    StatementReport {
        kind: statement.kind.name(),
        span: statement.span,
        substitutions: edits
            .iter()
            .map(|edit| Substitution {
                index: edit.index,
                span: edit.span,
                original: text(edit.span),
            })
            .collect(),
        preserved: scan
            .candidates
            .iter()
            .filter(|candidate| candidate.disposition == Disposition::Keep)
            .map(|candidate| PreservedLiteral {
                span: candidate.span,
                site: candidate.site,
                text: text(candidate.span),
            })
            .collect(),
        unsupported: scan.unsupported.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_values_and_keeps_ordinals() {
        let sql = "SELECT a, SUM(b) FROM tbl WHERE c = 'foo' GROUP BY 1, 'bar' ORDER BY 1, 'cafe'";
        assert_eq!(
            normalize(sql).unwrap(),
            "SELECT a, SUM(b) FROM tbl WHERE c = $1 GROUP BY 1, $2 ORDER BY 1, $3"
        );
    }

    #[test]
    fn numbering_starts_above_existing_placeholders() {
        assert_eq!(
            normalize("SELECT $2, 'a', $1").unwrap(),
            "SELECT $2, $3, $1"
        );
    }

    #[test]
    fn per_statement_numbering_restarts() {
        let out = normalize("SELECT 1; SELECT 'x' -- tail\n;  SELECT $4, 2").unwrap();
        assert_eq!(out, "SELECT $1; SELECT $1 -- tail\n;  SELECT $4, $5");
    }

    #[test]
    fn script_numbering_continues_from_the_global_floor() {
        let normalizer = Normalizer::new(NormalizeOptions {
            numbering: Numbering::Script,
            ..NormalizeOptions::default()
        });
        let out = normalizer.normalize("SELECT 1; SELECT 'x'; SELECT $4, 2").unwrap();
        assert_eq!(out, "SELECT $5; SELECT $6; SELECT $4, $7");
    }

    #[test]
    fn negative_numbers_are_replaced_with_their_sign() {
        assert_eq!(
            normalize("SELECT * FROM t WHERE x > -1.5 AND y = - 2").unwrap(),
            "SELECT * FROM t WHERE x > $1 AND y = $2"
        );
    }

    #[test]
    fn detailed_report_lists_substitutions_and_preserved_literals() {
        let normalization = Normalizer::default()
            .normalize_detailed("SELECT CAST('abc' AS varchar(50)) ORDER BY 1")
            .unwrap();
        assert_eq!(normalization.normalized, "SELECT CAST($1 AS varchar(50)) ORDER BY 1");
        assert_eq!(normalization.substitution_count(), 1);

        let statement = &normalization.statements[0];
        assert_eq!(statement.kind, "select");
        assert_eq!(statement.substitutions[0].original, "'abc'");
        assert_eq!(statement.substitutions[0].index, 1);
        let preserved: Vec<(&str, LiteralSite)> = statement
            .preserved
            .iter()
            .map(|p| (p.text.as_str(), p.site))
            .collect();
        assert_eq!(
            preserved,
            vec![("50", LiteralSite::TypeModifier), ("1", LiteralSite::OrderByItem)]
        );
    }

    #[test]
    fn parse_errors_are_surfaced() {
        let err = normalize("SELECT 'unterminated").unwrap_err();
        assert!(err.as_parse_error().is_some());
        let err = normalize("SELECT FROM WHERE").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn text_without_literals_is_unchanged() {
        let sql = "select a, b from t where c = $1 /* note */";
        assert_eq!(normalize(sql).unwrap(), sql);
        assert_eq!(normalize(&normalize(sql).unwrap()).unwrap(), sql);
    }
}
