use serde::Serialize;
use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::tokenizer::{Location, Token as SqlToken, Tokenizer};

use crate::error::ParseError;

/// Half-open byte range `[start, end)` into the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
pub struct Span {
    /// Offset of the first byte.
    pub start: usize,
    /// Offset one past the last byte.
    pub end: usize,
}

impl Span {
    /// Create a span from byte offsets.
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn union(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// `true` when `other` lies entirely within `self`.
    pub fn contains(self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// `true` when the two ranges share at least one byte.
    pub fn overlaps(self, other: Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Number of bytes covered.
    pub fn len(self) -> usize {
        self.end - self.start
    }

    /// `true` for a zero-width span.
    pub fn is_empty(self) -> bool {
        self.start == self.end
    }
}

/// Lexical category of a [`Token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Unquoted identifier or keyword.
    Word,
    /// Double-quoted identifier.
    QuotedIdent,
    /// Numeric constant.
    Number,
    /// Quoted string constant, including prefixed forms (`E'…'`, `X'…'`, `N'…'`).
    String,
    /// Dollar-quoted string constant (`$$…$$`, `$tag$…$tag$`).
    DollarString,
    /// Positional parameter such as `$3`.
    Param,
    /// Operators and punctuation.
    Punct,
}

/// A lexical token with its byte range in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    /// Lexical category.
    pub kind: TokenKind,
    /// Byte range of the raw token text.
    pub span: Span,
    /// Raw source text, quotes included.
    pub text: &'a str,
}

impl Token<'_> {
    /// `true` when this is the unquoted keyword `keyword` (case-insensitive).
    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.kind == TokenKind::Word && self.text.eq_ignore_ascii_case(keyword)
    }

    /// `true` when this is the punctuation or operator `punct`.
    pub fn is_punct(&self, punct: &str) -> bool {
        self.kind == TokenKind::Punct && self.text == punct
    }

    /// `true` for any literal constant token.
    pub fn is_literal(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Number | TokenKind::String | TokenKind::DollarString
        )
    }

    /// The index of a positional parameter token.
    pub fn param_index(&self) -> Option<u32> {
        if self.kind != TokenKind::Param {
            return None;
        }
        self.text.strip_prefix('$')?.parse().ok()
    }
}

/// Tokenize `source` with the `PostgreSQL` dialect, dropping whitespace and comments.
pub fn tokenize(source: &str) -> Result<Vec<Token<'_>>, ParseError> {
    let dialect = PostgreSqlDialect {};
    let raw = Tokenizer::new(&dialect, source)
        .tokenize_with_location()
        .map_err(|error| {
            let offsets = LineIndex::new(source);
            ParseError::at(error.message, source, offsets.offset(error.location))
        })?;

    let offsets = LineIndex::new(source);
    let mut tokens = Vec::with_capacity(raw.len());
    for item in raw {
        let kind = match &item.token {
            SqlToken::EOF | SqlToken::Whitespace(_) => continue,
            SqlToken::Word(word) if word.quote_style.is_some() => TokenKind::QuotedIdent,
            SqlToken::Word(_) => TokenKind::Word,
            SqlToken::Number(..) => TokenKind::Number,
            SqlToken::DollarQuotedString(_) => TokenKind::DollarString,
            SqlToken::SingleQuotedString(_)
            | SqlToken::EscapedStringLiteral(_)
            | SqlToken::NationalStringLiteral(_)
            | SqlToken::HexStringLiteral(_) => TokenKind::String,
            SqlToken::Placeholder(text) if is_positional_param(text) => TokenKind::Param,
            _ => TokenKind::Punct,
        };

        let span = Span::new(
            offsets.offset(item.span.start),
            offsets.offset(item.span.end),
        );
        let text = &source[span.start..span.end];
        // Remaining prefixed string forms (B'…', U&'…') surface as other token variants.
        let kind = if kind == TokenKind::Punct && text.len() > 1 && text.ends_with('\'') {
            TokenKind::String
        } else {
            kind
        };
        let token = Token { kind, span, text };
        if kind == TokenKind::Param && token.param_index().map_or(true, |idx| idx > MAX_PARAM_INDEX) {
            return Err(ParseError::at("parameter number too large", source, span.start));
        }
        tokens.push(token);
    }

    Ok(tokens)
}

/// Largest positional parameter the server accepts.
pub const MAX_PARAM_INDEX: u32 = i32::MAX as u32;

fn is_positional_param(text: &str) -> bool {
    text.strip_prefix('$')
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

/// Converts the tokenizer's 1-based line/column locations into byte offsets.
///
/// Columns count characters, so non-ASCII lines are walked once per lookup;
/// ASCII lines take the direct path.
struct LineIndex<'a> {
    source: &'a str,
    lines: Vec<(usize, bool)>,
}

impl<'a> LineIndex<'a> {
    fn new(source: &'a str) -> Self {
        let mut lines = Vec::new();
        let mut start = 0;
        for line in source.split('\n') {
            lines.push((start, line.is_ascii()));
            start += line.len() + 1;
        }
        Self { source, lines }
    }

    fn offset(&self, location: Location) -> usize {
        let line = usize::try_from(location.line).unwrap_or(usize::MAX);
        let column = usize::try_from(location.column).unwrap_or(usize::MAX);
        let Some(&(start, ascii)) = line.checked_sub(1).and_then(|idx| self.lines.get(idx)) else {
            return self.source.len();
        };
        let column = column.saturating_sub(1);
        if ascii {
            return (start + column).min(self.source.len());
        }
        self.source[start..]
            .char_indices()
            .nth(column)
            .map_or(self.source.len(), |(idx, _)| start + idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(sql: &str) -> Vec<(TokenKind, &str)> {
        tokenize(sql)
            .unwrap()
            .into_iter()
            .map(|token| (token.kind, token.text))
            .collect()
    }

    #[test]
    fn tokenize_reports_byte_spans_and_kinds() {
        let sql = "SELECT a, 'x''y' FROM \"T\" WHERE b = $2";
        let tokens = tokenize(sql).unwrap();

        for token in &tokens {
            assert_eq!(&sql[token.span.start..token.span.end], token.text);
        }
        assert_eq!(
            kinds(sql),
            vec![
                (TokenKind::Word, "SELECT"),
                (TokenKind::Word, "a"),
                (TokenKind::Punct, ","),
                (TokenKind::String, "'x''y'"),
                (TokenKind::Word, "FROM"),
                (TokenKind::QuotedIdent, "\"T\""),
                (TokenKind::Word, "WHERE"),
                (TokenKind::Word, "b"),
                (TokenKind::Punct, "="),
                (TokenKind::Param, "$2"),
            ]
        );
        assert_eq!(tokens.last().unwrap().param_index(), Some(2));
    }

    #[test]
    fn tokenize_keeps_dollar_quoted_bodies_whole() {
        let sql = "DO $body$ BEGIN PERFORM 1; END $body$";
        let tokens = tokenize(sql).unwrap();

        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].kind, TokenKind::DollarString);
        assert_eq!(tokens[1].text, "$body$ BEGIN PERFORM 1; END $body$");
    }

    #[test]
    fn tokenize_skips_comments_and_handles_multibyte_text() {
        let sql = "SELECT 'café' -- note\n , /* block */ 2";
        let tokens = tokenize(sql).unwrap();

        let texts: Vec<&str> = tokens.iter().map(|t| t.text).collect();
        assert_eq!(texts, vec!["SELECT", "'café'", ",", "2"]);
        let last = tokens.last().unwrap();
        assert_eq!(&sql[last.span.start..last.span.end], "2");
    }

    #[test]
    fn tokenize_rejects_unterminated_string() {
        let error = tokenize("SELECT 'abc").unwrap_err();
        assert!(error.message.to_lowercase().contains("unterminated"));
        assert_eq!(error.line, 1);
    }

    #[test]
    fn tokenize_rejects_out_of_range_parameters() {
        let error = tokenize("SELECT $4294967295, 1").unwrap_err();
        assert_eq!(error.message, "parameter number too large");
        assert_eq!(error.column, 8);
        assert!(tokenize("SELECT $99999999999999999999").is_err());

        let tokens = tokenize("SELECT $2147483647").unwrap();
        assert_eq!(tokens[1].param_index(), Some(MAX_PARAM_INDEX));
    }

    #[test]
    fn span_helpers_behave_like_ranges() {
        let outer = Span::new(2, 10);
        let inner = Span::new(4, 6);
        assert!(outer.contains(inner));
        assert!(outer.overlaps(inner));
        assert!(!inner.overlaps(Span::new(6, 8)));
        assert_eq!(inner.union(Span::new(6, 8)), Span::new(4, 8));
        assert_eq!(outer.len(), 8);
    }
}
