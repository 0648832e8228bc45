//! Expression and type-name productions.
//!
//! Operators are parsed by precedence climbing. Binding powers follow the
//! `PostgreSQL` operator table, lowest first.

use super::ast::{
    Expr, ExprKind, FrameBound, Function, FunctionArg, Ident, LiteralKind, ObjectName, TypeName,
    WindowFrame, WindowRef, WindowSpec,
};
use super::grammar::Parser;
use super::lexer::{Span, Token, TokenKind};
use super::names::{is_interval_field, is_multiword_type_start, is_reserved_keyword};
use crate::error::ParseError;

pub(crate) const PREC_OR: u8 = 1;
pub(crate) const PREC_AND: u8 = 2;
pub(crate) const PREC_NOT: u8 = 3;
pub(crate) const PREC_IS: u8 = 4;
pub(crate) const PREC_COMPARISON: u8 = 5;
pub(crate) const PREC_LIKE: u8 = 6;
pub(crate) const PREC_OTHER_OP: u8 = 7;
pub(crate) const PREC_ADD: u8 = 8;
pub(crate) const PREC_MUL: u8 = 9;
pub(crate) const PREC_EXP: u8 = 10;
pub(crate) const PREC_AT: u8 = 11;
pub(crate) const PREC_COLLATE: u8 = 12;
pub(crate) const PREC_UNARY: u8 = 13;
pub(crate) const PREC_POSTFIX: u8 = 14;
pub(crate) const PREC_CAST: u8 = 15;

/// Reserved words that still name ordinary functions when followed by `(`.
const RESERVED_FUNCTION_NAMES: &[&str] = &["left", "right", "current_schema", "collation"];

/// Keyword value functions; those in the first group accept a precision.
const TIME_VALUE_FUNCTIONS: &[&str] = &[
    "CURRENT_TIME",
    "CURRENT_TIMESTAMP",
    "LOCALTIME",
    "LOCALTIMESTAMP",
];
const PLAIN_VALUE_FUNCTIONS: &[&str] = &[
    "CURRENT_CATALOG",
    "CURRENT_DATE",
    "CURRENT_ROLE",
    "CURRENT_USER",
    "SESSION_USER",
    "SYSTEM_USER",
    "USER",
];

/// Classify a numeric constant: 32-bit integers apart from everything else.
pub(crate) fn number_kind(text: &str) -> LiteralKind {
    if text.parse::<i32>().is_ok() {
        LiteralKind::Integer
    } else {
        LiteralKind::Numeric
    }
}

/// Types whose `type 'string'` constant may also be written `type $n`.
fn takes_typed_placeholder(type_name: &str) -> bool {
    let first = type_name.split_whitespace().next().unwrap_or_default();
    matches!(
        first.to_ascii_lowercase().as_str(),
        "date" | "time" | "timetz" | "timestamp" | "timestamptz" | "interval" | "json" | "jsonb" | "uuid"
    )
}

impl<'a> Parser<'a> {
    /// Parse a complete expression.
    pub(crate) fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_subexpr(0)
    }

    /// Parse an expression whose operators all bind tighter than `min_prec`.
    pub(crate) fn parse_subexpr(&mut self, min_prec: u8) -> Result<Expr, ParseError> {
        self.nested(|p| {
            let mut expr = p.parse_prefix()?;
            loop {
                let prec = p.next_infix_precedence();
                if prec == 0 || prec <= min_prec {
                    break;
                }
                expr = p.parse_infix(expr, prec)?;
            }
            Ok(expr)
        })
    }

    /// A literal constant or placeholder, as accepted by option clauses.
    pub(crate) fn parse_constant(&mut self) -> Result<Expr, ParseError> {
        let Some(token) = self.peek() else {
            return Err(self.error_here());
        };
        let accepted = match token.kind {
            TokenKind::Number | TokenKind::String | TokenKind::DollarString | TokenKind::Param => {
                true
            }
            TokenKind::Punct => {
                (token.is_punct("-") || token.is_punct("+"))
                    && self.peek_nth(1).is_some_and(|t| t.kind == TokenKind::Number)
            }
            TokenKind::Word => {
                ["TRUE", "FALSE", "NULL"].iter().any(|kw| token.is_keyword(kw))
                    || self.at_bit_string()
            }
            TokenKind::QuotedIdent => false,
        };
        if !accepted {
            return Err(self.error_here());
        }
        self.parse_prefix()
    }

    fn next_infix_precedence(&self) -> u8 {
        let Some(token) = self.peek() else {
            return 0;
        };
        match token.kind {
            TokenKind::Word => {
                let upper = token.text.to_ascii_uppercase();
                match upper.as_str() {
                    "OR" => PREC_OR,
                    "AND" => PREC_AND,
                    "IS" | "ISNULL" | "NOTNULL" => PREC_IS,
                    "NOT" => {
                        let negatable = ["BETWEEN", "IN", "LIKE", "ILIKE", "SIMILAR"]
                            .iter()
                            .any(|kw| self.peek_nth_keyword(1, kw));
                        if negatable {
                            PREC_LIKE
                        } else {
                            0
                        }
                    }
                    "BETWEEN" | "IN" | "LIKE" | "ILIKE" | "SIMILAR" => PREC_LIKE,
                    "AT" if self.peek_nth_keyword(1, "TIME") || self.peek_nth_keyword(1, "LOCAL") => {
                        PREC_AT
                    }
                    "COLLATE" => PREC_COLLATE,
                    "OPERATOR" if self.peek_nth_punct(1, "(") => PREC_OTHER_OP,
                    _ => 0,
                }
            }
            TokenKind::Punct => match token.text {
                "=" | "<" | ">" | "<=" | ">=" | "<>" | "!=" => PREC_COMPARISON,
                "+" | "-" => PREC_ADD,
                "*" | "/" | "%" => PREC_MUL,
                "^" => PREC_EXP,
                "[" | "." => PREC_POSTFIX,
                "::" => PREC_CAST,
                "," | "(" | ")" | ";" | "]" | ":" | "=>" | ":=" => 0,
                _ => PREC_OTHER_OP,
            },
            _ => 0,
        }
    }

    fn parse_infix(&mut self, left: Expr, prec: u8) -> Result<Expr, ParseError> {
        let start = left.span.start;
        let token = self.next_token().ok_or_else(|| self.error_here())?;

        if token.kind == TokenKind::Punct {
            return match token.text {
                "::" => {
                    let data_type = self.parse_type_name()?;
                    Ok(Expr::new(
                        ExprKind::Cast {
                            expr: Box::new(left),
                            data_type,
                        },
                        self.span_from(start),
                    ))
                }
                "[" => {
                    self.pos -= 1;
                    self.parse_subscript(left)
                }
                "." => {
                    let field = if self.parse_punct("*") {
                        None
                    } else {
                        Some(self.parse_any_identifier()?)
                    };
                    Ok(Expr::new(
                        ExprKind::FieldAccess {
                            expr: Box::new(left),
                            field,
                        },
                        self.span_from(start),
                    ))
                }
                op => {
                    let right = self.parse_operator_rhs(prec)?;
                    Ok(self.binary(left, op.to_string(), right, start))
                }
            };
        }

        let keyword = token.text.to_ascii_uppercase();
        match keyword.as_str() {
            "OR" | "AND" => {
                let right = self.parse_subexpr(prec)?;
                let mut operands = match left.kind {
                    ExprKind::BoolOp { op, operands } if op == keyword => operands,
                    kind => vec![Expr::new(kind, left.span)],
                };
                operands.push(right);
                Ok(Expr::new(
                    ExprKind::BoolOp {
                        op: keyword,
                        operands,
                    },
                    self.span_from(start),
                ))
            }
            "IS" => self.parse_is(left, start),
            "ISNULL" | "NOTNULL" => Ok(Expr::new(
                ExprKind::Is {
                    expr: Box::new(left),
                    negated: keyword == "NOTNULL",
                    predicate: "NULL".to_string(),
                    other: None,
                },
                self.span_from(start),
            )),
            "NOT" => {
                let next = self.next_token().ok_or_else(|| self.error_here())?;
                self.parse_negatable(left, next, true, start)
            }
            "BETWEEN" | "IN" | "LIKE" | "ILIKE" | "SIMILAR" => {
                self.parse_negatable(left, token, false, start)
            }
            "AT" => {
                let zone = if self.parse_keyword("LOCAL") {
                    None
                } else {
                    self.expect_keyword("TIME")?;
                    self.expect_keyword("ZONE")?;
                    Some(Box::new(self.parse_subexpr(PREC_AT)?))
                };
                Ok(Expr::new(
                    ExprKind::AtTimeZone {
                        expr: Box::new(left),
                        zone,
                    },
                    self.span_from(start),
                ))
            }
            "COLLATE" => {
                let collation = self.parse_object_name()?;
                Ok(Expr::new(
                    ExprKind::Collate {
                        expr: Box::new(left),
                        collation,
                    },
                    self.span_from(start),
                ))
            }
            "OPERATOR" => {
                let op_start = token.span.start;
                self.expect_punct("(")?;
                while !self.parse_punct(")") {
                    self.next_token().ok_or_else(|| self.error_here())?;
                }
                let op = self.source[op_start..self.prev_end()].to_string();
                let right = self.parse_operator_rhs(prec)?;
                Ok(self.binary(left, op, right, start))
            }
            _ => Err(ParseError::at(
                format!("syntax error at or near \"{}\"", token.text),
                self.source,
                token.span.start,
            )),
        }
    }

    fn binary(&self, left: Expr, op: String, right: Expr, start: usize) -> Expr {
        Expr::new(
            ExprKind::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
            },
            self.span_from(start),
        )
    }

    /// Right operand of a binary operator, including `ANY|ALL|SOME (…)`.
    fn parse_operator_rhs(&mut self, prec: u8) -> Result<Expr, ParseError> {
        let quantified = ["ANY", "ALL", "SOME"]
            .iter()
            .any(|kw| self.peek_keyword(kw))
            && self.peek_nth_punct(1, "(");
        if !quantified {
            return self.parse_subexpr(prec);
        }

        let start = self.offset();
        let quantifier = self
            .next_token()
            .map(|t| t.text.to_ascii_uppercase())
            .unwrap_or_default();
        let operand = if self.peek_query_start(1) {
            self.parse_parenthesized_subquery()?
        } else {
            self.expect_punct("(")?;
            let operand = self.parse_expr()?;
            self.expect_punct(")")?;
            operand
        };
        Ok(Expr::new(
            ExprKind::Quantified {
                quantifier,
                operand: Box::new(operand),
            },
            self.span_from(start),
        ))
    }

    fn parse_is(&mut self, left: Expr, start: usize) -> Result<Expr, ParseError> {
        let negated = self.parse_keyword("NOT");
        let (predicate, other) = if self.parse_keywords(&["DISTINCT", "FROM"]) {
            let other = self.parse_subexpr(PREC_IS)?;
            ("DISTINCT FROM".to_string(), Some(Box::new(other)))
        } else if let Some(word) = self.parse_one_of_keywords(&[
            "NULL",
            "TRUE",
            "FALSE",
            "UNKNOWN",
            "DOCUMENT",
            "NORMALIZED",
        ]) {
            (word.to_string(), None)
        } else {
            return Err(self.error_here());
        };
        Ok(Expr::new(
            ExprKind::Is {
                expr: Box::new(left),
                negated,
                predicate,
                other,
            },
            self.span_from(start),
        ))
    }

    /// `[NOT] BETWEEN|IN|LIKE|ILIKE|SIMILAR TO`, with `keyword` already consumed.
    fn parse_negatable(
        &mut self,
        left: Expr,
        keyword: Token<'a>,
        negated: bool,
        start: usize,
    ) -> Result<Expr, ParseError> {
        let upper = keyword.text.to_ascii_uppercase();
        match upper.as_str() {
            "BETWEEN" => {
                self.parse_one_of_keywords(&["SYMMETRIC", "ASYMMETRIC"]);
                let low = self.parse_subexpr(PREC_LIKE)?;
                self.expect_keyword("AND")?;
                let high = self.parse_subexpr(PREC_LIKE)?;
                Ok(Expr::new(
                    ExprKind::Between {
                        expr: Box::new(left),
                        negated,
                        low: Box::new(low),
                        high: Box::new(high),
                    },
                    self.span_from(start),
                ))
            }
            "IN" => {
                if self.peek_query_start(1) {
                    self.expect_punct("(")?;
                    let subquery = self.parse_query()?;
                    self.expect_punct(")")?;
                    return Ok(Expr::new(
                        ExprKind::InSubquery {
                            expr: Box::new(left),
                            negated,
                            subquery: Box::new(subquery),
                        },
                        self.span_from(start),
                    ));
                }
                self.expect_punct("(")?;
                let list = self.parse_comma_separated(Self::parse_expr)?;
                self.expect_punct(")")?;
                Ok(Expr::new(
                    ExprKind::InList {
                        expr: Box::new(left),
                        negated,
                        list,
                    },
                    self.span_from(start),
                ))
            }
            "LIKE" | "ILIKE" | "SIMILAR" => {
                if upper == "SIMILAR" {
                    self.expect_keyword("TO")?;
                }
                let mut op = if upper == "SIMILAR" {
                    "SIMILAR TO".to_string()
                } else {
                    upper.clone()
                };
                if negated {
                    op = format!("NOT {op}");
                }
                // `LIKE ANY (…)` and `ILIKE ALL (…)` take a quantified pattern.
                let pattern = if upper == "SIMILAR" {
                    self.parse_subexpr(PREC_LIKE)?
                } else {
                    self.parse_operator_rhs(PREC_LIKE)?
                };
                let escape = if self.parse_keyword("ESCAPE") {
                    Some(Box::new(self.parse_subexpr(PREC_LIKE)?))
                } else {
                    None
                };
                Ok(Expr::new(
                    ExprKind::Like {
                        expr: Box::new(left),
                        op,
                        pattern: Box::new(pattern),
                        escape,
                    },
                    self.span_from(start),
                ))
            }
            _ => Err(ParseError::at(
                format!("syntax error at or near \"{}\"", keyword.text),
                self.source,
                keyword.span.start,
            )),
        }
    }

    /// `expr[index]` or `expr[lower:upper]`, positioned at `[`.
    pub(crate) fn parse_subscript(&mut self, base: Expr) -> Result<Expr, ParseError> {
        let start = base.span.start;
        self.expect_punct("[")?;
        let lower = if self.peek_punct(":") {
            None
        } else {
            Some(Box::new(self.parse_expr()?))
        };
        let upper = if self.parse_punct(":") && !self.peek_punct("]") {
            Some(Box::new(self.parse_expr()?))
        } else {
            None
        };
        self.expect_punct("]")?;
        Ok(Expr::new(
            ExprKind::Subscript {
                expr: Box::new(base),
                lower,
                upper,
            },
            self.span_from(start),
        ))
    }

    // -----------------------------------------------------------------------
    // Prefix forms
    // -----------------------------------------------------------------------

    fn parse_prefix(&mut self) -> Result<Expr, ParseError> {
        let Some(token) = self.peek() else {
            return Err(self.error_here());
        };
        match token.kind {
            TokenKind::Number => {
                self.pos += 1;
                Ok(Expr::new(
                    ExprKind::Literal(number_kind(token.text)),
                    token.span,
                ))
            }
            TokenKind::String => {
                self.pos += 1;
                let kind = if token.text.starts_with(['b', 'B', 'x', 'X']) {
                    LiteralKind::BitString
                } else {
                    LiteralKind::String
                };
                let span = self.string_continuation(token.span);
                Ok(Expr::new(ExprKind::Literal(kind), span))
            }
            TokenKind::DollarString => {
                self.pos += 1;
                Ok(Expr::new(
                    ExprKind::Literal(LiteralKind::DollarString),
                    token.span,
                ))
            }
            TokenKind::Param => {
                let index = token.param_index().ok_or_else(|| self.error_here())?;
                self.pos += 1;
                Ok(Expr::new(ExprKind::Param(index), token.span))
            }
            TokenKind::QuotedIdent => self.parse_identifier_expr(),
            TokenKind::Punct => self.parse_punct_prefix(token),
            TokenKind::Word => self.parse_word_prefix(token),
        }
    }

    /// Extend a string constant over quoted segments that continue it on a
    /// later line (`'a'` newline `'b'` is the single constant `'ab'`).
    fn string_continuation(&mut self, mut span: Span) -> Span {
        while let Some(next) = self.peek() {
            let continues = next.kind == TokenKind::String
                && next.text.starts_with('\'')
                && self.source[span.end..next.span.start].contains('\n');
            if !continues {
                break;
            }
            self.pos += 1;
            span = Span::new(span.start, next.span.end);
        }
        span
    }

    fn parse_punct_prefix(&mut self, token: Token<'a>) -> Result<Expr, ParseError> {
        match token.text {
            "(" => self.parse_parenthesized(),
            "-" => {
                self.pos += 1;
                let operand = self.parse_subexpr(PREC_UNARY)?;
                let span = Span::new(token.span.start, operand.span.end);
                if let ExprKind::Literal(LiteralKind::Integer | LiteralKind::Numeric) = operand.kind
                {
                    // A negated numeric constant is one literal, sign included.
                    let signed: String = self.source[span.start..span.end]
                        .chars()
                        .filter(|c| !c.is_whitespace())
                        .collect();
                    return Ok(Expr::new(ExprKind::Literal(number_kind(&signed)), span));
                }
                Ok(Expr::new(
                    ExprKind::Unary {
                        op: "-".to_string(),
                        operand: Box::new(operand),
                    },
                    span,
                ))
            }
            "+" | "~" | "@" | "|/" | "||/" | "!!" => {
                self.pos += 1;
                let operand = self.parse_subexpr(PREC_UNARY)?;
                let span = Span::new(token.span.start, operand.span.end);
                Ok(Expr::new(
                    ExprKind::Unary {
                        op: token.text.to_string(),
                        operand: Box::new(operand),
                    },
                    span,
                ))
            }
            _ => Err(self.error_here()),
        }
    }

    fn parse_word_prefix(&mut self, token: Token<'a>) -> Result<Expr, ParseError> {
        let start = token.span.start;
        let upper = token.text.to_ascii_uppercase();
        let followed_by_paren = self.peek_nth_punct(1, "(");

        match upper.as_str() {
            "TRUE" | "FALSE" => {
                self.pos += 1;
                return Ok(Expr::new(
                    ExprKind::Literal(LiteralKind::Boolean),
                    token.span,
                ));
            }
            "NULL" => {
                self.pos += 1;
                return Ok(Expr::new(ExprKind::Literal(LiteralKind::Null), token.span));
            }
            "DEFAULT" => {
                self.pos += 1;
                return Ok(Expr::new(ExprKind::Default, token.span));
            }
            "NOT" => {
                self.pos += 1;
                let operand = self.parse_subexpr(PREC_NOT)?;
                let span = Span::new(start, operand.span.end);
                return Ok(Expr::new(
                    ExprKind::Unary {
                        op: "NOT".to_string(),
                        operand: Box::new(operand),
                    },
                    span,
                ));
            }
            "CASE" => return self.parse_case(),
            "CAST" if followed_by_paren => {
                self.pos += 2;
                let expr = self.parse_expr()?;
                self.expect_keyword("AS")?;
                let data_type = self.parse_type_name()?;
                self.expect_punct(")")?;
                return Ok(Expr::new(
                    ExprKind::Cast {
                        expr: Box::new(expr),
                        data_type,
                    },
                    self.span_from(start),
                ));
            }
            "EXISTS" if followed_by_paren => {
                self.pos += 2;
                let query = self.parse_query()?;
                self.expect_punct(")")?;
                return Ok(Expr::new(
                    ExprKind::Exists(Box::new(query)),
                    self.span_from(start),
                ));
            }
            "ARRAY" if self.peek_nth_punct(1, "[") => {
                self.pos += 1;
                let elements = self.parse_array_elements()?;
                return Ok(Expr::new(ExprKind::Array(elements), self.span_from(start)));
            }
            "ARRAY" if followed_by_paren => {
                self.pos += 2;
                let query = self.parse_query()?;
                self.expect_punct(")")?;
                return Ok(Expr::new(
                    ExprKind::ArraySubquery(Box::new(query)),
                    self.span_from(start),
                ));
            }
            "ROW" if followed_by_paren => {
                self.pos += 2;
                let items = if self.peek_punct(")") {
                    Vec::new()
                } else {
                    self.parse_comma_separated(Self::parse_expr)?
                };
                self.expect_punct(")")?;
                return Ok(Expr::new(ExprKind::Row(items), self.span_from(start)));
            }
            "EXTRACT" | "POSITION" | "SUBSTRING" | "TRIM" | "OVERLAY" if followed_by_paren => {
                return self.parse_special_function(token);
            }
            "CURRENT" if self.peek_nth_keyword(1, "OF") => {
                self.pos += 2;
                let cursor = self.parse_identifier()?;
                return Ok(Expr::new(
                    ExprKind::CurrentOf(cursor),
                    self.span_from(start),
                ));
            }
            "CURRENT_SCHEMA" if !followed_by_paren => {
                self.pos += 1;
                return Ok(self.value_function(upper, None, start));
            }
            name if PLAIN_VALUE_FUNCTIONS.contains(&name) => {
                self.pos += 1;
                return Ok(self.value_function(upper, None, start));
            }
            name if TIME_VALUE_FUNCTIONS.contains(&name) => {
                self.pos += 1;
                let precision = if self.parse_punct("(") {
                    let precision = self.parse_expr()?;
                    self.expect_punct(")")?;
                    Some(Box::new(precision))
                } else {
                    None
                };
                return Ok(self.value_function(upper, precision, start));
            }
            _ => {}
        }

        if self.at_bit_string() {
            let Some(literal) = self.peek_nth(1) else {
                return Err(self.error_here());
            };
            self.pos += 2;
            return Ok(Expr::new(
                ExprKind::Literal(LiteralKind::BitString),
                Span::new(start, literal.span.end),
            ));
        }

        if let Some(typed) = self.try_parse_typed_string()? {
            return Ok(typed);
        }
        self.parse_identifier_expr()
    }

    fn value_function(&self, name: String, precision: Option<Box<Expr>>, start: usize) -> Expr {
        Expr::new(
            ExprKind::ValueFunction { name, precision },
            self.span_from(start),
        )
    }

    /// `B'0101'`: the prefix word immediately followed by a string.
    fn at_bit_string(&self) -> bool {
        let (Some(prefix), Some(literal)) = (self.peek(), self.peek_nth(1)) else {
            return false;
        };
        prefix.kind == TokenKind::Word
            && prefix.text.eq_ignore_ascii_case("b")
            && literal.kind == TokenKind::String
            && literal.span.start == prefix.span.end
    }

    /// `type 'string'` constants (`DATE '2020-01-01'`, `INTERVAL '1' DAY`).
    fn try_parse_typed_string(&mut self) -> Result<Option<Expr>, ParseError> {
        let Some(token) = self.peek() else {
            return Ok(None);
        };
        if token.kind != TokenKind::Word || is_reserved_keyword(token.text) {
            return Ok(None);
        }

        let mark = self.pos;
        let start = token.span.start;
        let mut data_type = if is_multiword_type_start(token.text) {
            match self.parse_type_name() {
                Ok(data_type) => data_type,
                Err(_) => {
                    self.pos = mark;
                    return Ok(None);
                }
            }
        } else if self.peek_nth(1).is_some_and(|t| {
            t.kind == TokenKind::String
                || (t.kind == TokenKind::Param && takes_typed_placeholder(token.text))
        }) {
            self.pos += 1;
            TypeName {
                name: token.text.to_ascii_lowercase(),
                modifiers: Vec::new(),
                array_bounds: Vec::new(),
                span: token.span,
            }
        } else {
            return Ok(None);
        };

        let Some(literal) = self.peek().filter(|t| {
            t.kind == TokenKind::String
                || (t.kind == TokenKind::Param && takes_typed_placeholder(&data_type.name))
        }) else {
            self.pos = mark;
            return Ok(None);
        };
        self.pos += 1;
        // `DATE $1` is how a normalized typed string reads back.
        let value = match literal.param_index() {
            Some(index) => Expr::new(ExprKind::Param(index), literal.span),
            None => Expr::new(ExprKind::Literal(LiteralKind::String), literal.span),
        };

        if data_type.name == "interval" {
            let fields_start = self.offset();
            let mut fields = Vec::new();
            while let Some(field) = self
                .peek()
                .filter(|t| t.kind == TokenKind::Word && (is_interval_field(t.text) || t.is_keyword("TO")))
            {
                self.pos += 1;
                fields.push(field.text.to_ascii_lowercase());
            }
            if !fields.is_empty() {
                data_type.name = format!("interval {}", fields.join(" "));
                if self.parse_punct("(") {
                    data_type.modifiers = self.parse_comma_separated(Self::parse_expr)?;
                    self.expect_punct(")")?;
                }
                data_type.span = data_type.span.union(self.span_from(fields_start));
            }
        }

        Ok(Some(Expr::new(
            ExprKind::TypedString {
                data_type,
                value: Box::new(value),
            },
            self.span_from(start),
        )))
    }

    /// Column reference, qualified wildcard, or function call.
    fn parse_identifier_expr(&mut self) -> Result<Expr, ParseError> {
        let start = self.offset();
        let first = match self.peek() {
            Some(t)
                if t.kind == TokenKind::Word
                    && is_reserved_keyword(t.text)
                    && self.peek_nth_punct(1, "(")
                    && RESERVED_FUNCTION_NAMES.contains(&t.text.to_ascii_lowercase().as_str()) =>
            {
                self.parse_any_identifier()?
            }
            _ => self.parse_identifier()?,
        };

        let mut parts = vec![first];
        while self.peek_punct(".") {
            match self.peek_nth(1) {
                Some(t) if t.is_punct("*") => {
                    self.pos += 2;
                    return Ok(Expr::new(ExprKind::Wildcard(parts), self.span_from(start)));
                }
                Some(t) if matches!(t.kind, TokenKind::Word | TokenKind::QuotedIdent) => {
                    self.pos += 1;
                    parts.push(self.parse_any_identifier()?);
                }
                _ => break,
            }
        }

        if self.peek_punct("(") {
            let name = ObjectName {
                parts,
                span: self.span_from(start),
            };
            return self.parse_function_call(name, start);
        }
        Ok(Expr::new(ExprKind::Column(parts), self.span_from(start)))
    }

    /// Parenthesized expression, row constructor, or scalar subquery.
    fn parse_parenthesized(&mut self) -> Result<Expr, ParseError> {
        let start = self.offset();
        if self.peek_query_start(1) {
            return self.parse_parenthesized_subquery();
        }
        self.expect_punct("(")?;
        if self.parse_punct(")") {
            return Ok(Expr::new(ExprKind::Row(Vec::new()), self.span_from(start)));
        }
        let mut items = self.parse_comma_separated(Self::parse_expr)?;
        self.expect_punct(")")?;
        let span = self.span_from(start);
        if items.len() == 1 {
            let inner = items.remove(0);
            return Ok(Expr::new(ExprKind::Nested(Box::new(inner)), span));
        }
        Ok(Expr::new(ExprKind::Row(items), span))
    }

    fn parse_parenthesized_subquery(&mut self) -> Result<Expr, ParseError> {
        let start = self.offset();
        self.expect_punct("(")?;
        let query = self.parse_query()?;
        self.expect_punct(")")?;
        Ok(Expr::new(
            ExprKind::Subquery(Box::new(query)),
            self.span_from(start),
        ))
    }

    /// Elements of `ARRAY[…]`, positioned at `[`; inner brackets nest.
    fn parse_array_elements(&mut self) -> Result<Vec<Expr>, ParseError> {
        self.expect_punct("[")?;
        if self.parse_punct("]") {
            return Ok(Vec::new());
        }
        let elements = self.parse_comma_separated(|p| {
            if p.peek_punct("[") {
                let start = p.offset();
                let inner = p.parse_array_elements()?;
                Ok(Expr::new(ExprKind::Array(inner), p.span_from(start)))
            } else {
                p.parse_expr()
            }
        })?;
        self.expect_punct("]")?;
        Ok(elements)
    }

    fn parse_case(&mut self) -> Result<Expr, ParseError> {
        let start = self.offset();
        self.expect_keyword("CASE")?;
        let operand = if self.peek_keyword("WHEN") {
            None
        } else {
            Some(Box::new(self.parse_expr()?))
        };
        let mut branches = Vec::new();
        while self.parse_keyword("WHEN") {
            let condition = self.parse_expr()?;
            self.expect_keyword("THEN")?;
            let result = self.parse_expr()?;
            branches.push((condition, result));
        }
        if branches.is_empty() {
            return Err(self.error_here());
        }
        let else_result = if self.parse_keyword("ELSE") {
            Some(Box::new(self.parse_expr()?))
        } else {
            None
        };
        self.expect_keyword("END")?;
        Ok(Expr::new(
            ExprKind::Case {
                operand,
                branches,
                else_result,
            },
            self.span_from(start),
        ))
    }

    /// `EXTRACT`, `POSITION`, `SUBSTRING`, `TRIM` and `OVERLAY` with their
    /// keyword-separated argument syntax.
    fn parse_special_function(&mut self, token: Token<'a>) -> Result<Expr, ParseError> {
        let start = token.span.start;
        let upper = token.text.to_ascii_uppercase();
        self.pos += 1;
        self.expect_punct("(")?;

        let mut args = Vec::new();
        match upper.as_str() {
            "EXTRACT" => {
                match self.peek() {
                    Some(t) if t.kind == TokenKind::String => args.push(self.parse_prefix()?),
                    Some(t) if matches!(t.kind, TokenKind::Word | TokenKind::QuotedIdent) => {
                        // Field keywords are part of the syntax, not constants.
                        self.pos += 1;
                    }
                    _ => return Err(self.error_here()),
                }
                self.expect_keyword("FROM")?;
                args.push(self.parse_expr()?);
            }
            "POSITION" => {
                args.push(self.parse_subexpr(PREC_LIKE)?);
                self.expect_keyword("IN")?;
                args.push(self.parse_expr()?);
            }
            "SUBSTRING" => {
                args.push(self.parse_expr()?);
                while self.parse_keyword("FROM")
                    || self.parse_keyword("FOR")
                    || self.parse_punct(",")
                {
                    args.push(self.parse_expr()?);
                }
            }
            "TRIM" => {
                self.parse_one_of_keywords(&["BOTH", "LEADING", "TRAILING"]);
                if !self.parse_keyword("FROM") {
                    args.push(self.parse_expr()?);
                    self.parse_keyword("FROM");
                }
                while !self.peek_punct(")") {
                    args.push(self.parse_expr()?);
                    if !self.parse_punct(",") {
                        break;
                    }
                }
            }
            _ => {
                args.push(self.parse_expr()?);
                self.expect_keyword("PLACING")?;
                args.push(self.parse_expr()?);
                self.expect_keyword("FROM")?;
                args.push(self.parse_expr()?);
                if self.parse_keyword("FOR") {
                    args.push(self.parse_expr()?);
                }
            }
        }
        self.expect_punct(")")?;

        let name = ObjectName {
            parts: vec![Ident {
                value: upper.to_ascii_lowercase(),
                quoted: false,
                span: token.span,
            }],
            span: token.span,
        };
        Ok(Expr::new(
            ExprKind::Function(Box::new(Function {
                name,
                args: args
                    .into_iter()
                    .map(|value| FunctionArg { name: None, value })
                    .collect(),
                distinct: false,
                order_by: Vec::new(),
                within_group: Vec::new(),
                filter: None,
                over: None,
            })),
            self.span_from(start),
        ))
    }

    /// Call of `name`, positioned at the opening parenthesis.
    pub(crate) fn parse_function_call(
        &mut self,
        name: ObjectName,
        start: usize,
    ) -> Result<Expr, ParseError> {
        self.expect_punct("(")?;
        let mut function = Function {
            name,
            args: Vec::new(),
            distinct: false,
            order_by: Vec::new(),
            within_group: Vec::new(),
            filter: None,
            over: None,
        };

        if let Some(star) = self.peek().filter(|t| t.is_punct("*")) {
            self.pos += 1;
            function.args.push(FunctionArg {
                name: None,
                value: Expr::new(ExprKind::Wildcard(Vec::new()), star.span),
            });
        } else if !self.peek_punct(")") {
            if self.parse_keyword("DISTINCT") {
                function.distinct = true;
            } else {
                self.parse_keyword("ALL");
            }
            function.args = self.parse_comma_separated(Self::parse_function_arg)?;
            if self.parse_keywords(&["ORDER", "BY"]) {
                function.order_by = self.parse_comma_separated(Self::parse_order_by_expr)?;
            }
        }
        self.expect_punct(")")?;

        if self.parse_keywords(&["WITHIN", "GROUP"]) {
            self.expect_punct("(")?;
            self.expect_keyword("ORDER")?;
            self.expect_keyword("BY")?;
            function.within_group = self.parse_comma_separated(Self::parse_order_by_expr)?;
            self.expect_punct(")")?;
        }
        if self.peek_keyword("FILTER") && self.peek_nth_punct(1, "(") {
            self.pos += 2;
            self.expect_keyword("WHERE")?;
            function.filter = Some(Box::new(self.parse_expr()?));
            self.expect_punct(")")?;
        }
        if self.parse_keyword("OVER") {
            function.over = Some(if self.parse_punct("(") {
                let spec = self.parse_window_spec()?;
                self.expect_punct(")")?;
                WindowRef::Spec(spec)
            } else {
                WindowRef::Named(self.parse_identifier()?)
            });
        }

        Ok(Expr::new(
            ExprKind::Function(Box::new(function)),
            self.span_from(start),
        ))
    }

    fn parse_function_arg(&mut self) -> Result<FunctionArg, ParseError> {
        self.parse_keyword("VARIADIC");
        let named = self
            .peek()
            .is_some_and(|t| matches!(t.kind, TokenKind::Word | TokenKind::QuotedIdent))
            && (self.peek_nth_punct(1, "=>") || self.peek_nth_punct(1, ":="));
        let name = if named {
            let name = self.parse_any_identifier()?;
            self.pos += 1;
            Some(name)
        } else {
            None
        };
        Ok(FunctionArg {
            name,
            value: self.parse_expr()?,
        })
    }

    /// Body of a window definition, between its parentheses.
    pub(crate) fn parse_window_spec(&mut self) -> Result<WindowSpec, ParseError> {
        let base = match self.peek() {
            Some(t)
                if matches!(t.kind, TokenKind::Word | TokenKind::QuotedIdent)
                    && !["PARTITION", "ORDER", "ROWS", "RANGE", "GROUPS"]
                        .iter()
                        .any(|kw| t.is_keyword(kw)) =>
            {
                Some(self.parse_identifier()?)
            }
            _ => None,
        };
        let partition_by = if self.parse_keywords(&["PARTITION", "BY"]) {
            self.parse_comma_separated(Self::parse_expr)?
        } else {
            Vec::new()
        };
        let order_by = if self.parse_keywords(&["ORDER", "BY"]) {
            self.parse_comma_separated(Self::parse_order_by_expr)?
        } else {
            Vec::new()
        };
        let frame = match self.parse_one_of_keywords(&["ROWS", "RANGE", "GROUPS"]) {
            Some(units) => {
                let (start, end) = if self.parse_keyword("BETWEEN") {
                    let start = self.parse_frame_bound()?;
                    self.expect_keyword("AND")?;
                    (start, Some(self.parse_frame_bound()?))
                } else {
                    (self.parse_frame_bound()?, None)
                };
                if self.parse_keyword("EXCLUDE") {
                    if !self.parse_keywords(&["CURRENT", "ROW"])
                        && !self.parse_keywords(&["NO", "OTHERS"])
                        && self.parse_one_of_keywords(&["GROUP", "TIES"]).is_none()
                    {
                        return Err(self.error_here());
                    }
                }
                Some(WindowFrame {
                    units: units.to_string(),
                    start,
                    end,
                })
            }
            None => None,
        };
        Ok(WindowSpec {
            base,
            partition_by,
            order_by,
            frame,
        })
    }

    fn parse_frame_bound(&mut self) -> Result<FrameBound, ParseError> {
        if self.parse_keywords(&["CURRENT", "ROW"]) {
            return Ok(FrameBound::CurrentRow);
        }
        let bound = if self.parse_keyword("UNBOUNDED") {
            FrameBound::Unbounded
        } else {
            FrameBound::Offset(self.parse_subexpr(PREC_AND)?)
        };
        if self
            .parse_one_of_keywords(&["PRECEDING", "FOLLOWING"])
            .is_none()
        {
            return Err(self.error_here());
        }
        Ok(bound)
    }

    // -----------------------------------------------------------------------
    // Type names
    // -----------------------------------------------------------------------

    /// Parse a type name with modifiers, `%TYPE` references and array bounds.
    pub(crate) fn parse_type_name(&mut self) -> Result<TypeName, ParseError> {
        let start = self.offset();
        let Some(first) = self.peek() else {
            return Err(self.error_here());
        };

        let mut modifiers = Vec::new();
        let multiword = if first.kind == TokenKind::Word {
            self.parse_multiword_type(&mut modifiers)?
        } else {
            None
        };
        let mut name = match multiword {
            Some(name) => name,
            None => self.parse_object_name()?.to_string(),
        };

        if modifiers.is_empty() && self.parse_punct("(") {
            modifiers = self.parse_comma_separated(Self::parse_expr)?;
            self.expect_punct(")")?;
        }

        if self.peek_punct("%")
            && (self.peek_nth_keyword(1, "TYPE") || self.peek_nth_keyword(1, "ROWTYPE"))
        {
            self.pos += 1;
            let suffix = self
                .next_token()
                .map(|t| t.text.to_ascii_lowercase())
                .unwrap_or_default();
            name = format!("{name}%{suffix}");
        }

        let mut array_bounds = Vec::new();
        if self.parse_keyword("ARRAY") {
            array_bounds.push(None);
        }
        while self.parse_punct("[") {
            if self.parse_punct("]") {
                array_bounds.push(None);
                continue;
            }
            array_bounds.push(Some(self.parse_expr()?));
            self.expect_punct("]")?;
        }

        Ok(TypeName {
            name,
            modifiers,
            array_bounds,
            span: self.span_from(start),
        })
    }

    /// SQL-standard spellings made of several keywords; `None` for other names.
    fn parse_multiword_type(
        &mut self,
        modifiers: &mut Vec<Expr>,
    ) -> Result<Option<String>, ParseError> {
        let Some(first) = self.peek() else {
            return Ok(None);
        };
        let lower = first.text.to_ascii_lowercase();
        let name = match lower.as_str() {
            "double" if self.peek_nth_keyword(1, "PRECISION") => {
                self.pos += 2;
                "double precision".to_string()
            }
            "character" | "char" | "nchar" | "bit" => {
                self.pos += 1;
                if self.parse_keyword("VARYING") {
                    format!("{lower} varying")
                } else {
                    lower
                }
            }
            "national" => {
                self.pos += 1;
                self.parse_one_of_keywords(&["CHARACTER", "CHAR"])
                    .ok_or_else(|| self.error_here())?;
                if self.parse_keyword("VARYING") {
                    "national character varying".to_string()
                } else {
                    "national character".to_string()
                }
            }
            "timestamp" | "time" => {
                self.pos += 1;
                if self.parse_punct("(") {
                    *modifiers = self.parse_comma_separated(Self::parse_expr)?;
                    self.expect_punct(")")?;
                }
                if self.parse_keywords(&["WITH", "TIME", "ZONE"]) {
                    format!("{lower} with time zone")
                } else if self.parse_keywords(&["WITHOUT", "TIME", "ZONE"]) {
                    format!("{lower} without time zone")
                } else {
                    lower
                }
            }
            "interval" => {
                self.pos += 1;
                let mut name = lower;
                while let Some(field) = self.peek().filter(|t| {
                    t.kind == TokenKind::Word && (is_interval_field(t.text) || t.is_keyword("TO"))
                }) {
                    self.pos += 1;
                    name.push(' ');
                    name.push_str(&field.text.to_ascii_lowercase());
                }
                name
            }
            _ => return Ok(None),
        };
        Ok(Some(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expr(sql: &str) -> Expr {
        let mut parser = Parser::new(sql).unwrap();
        let expr = parser.parse_expr().unwrap();
        assert!(parser.peek().is_none(), "unconsumed input in {sql}");
        expr
    }

    fn text<'s>(sql: &'s str, span: Span) -> &'s str {
        &sql[span.start..span.end]
    }

    #[test]
    fn negative_numbers_fold_into_one_literal() {
        let sql = "- 42";
        let folded = expr(sql);
        assert_eq!(folded.literal_kind(), Some(LiteralKind::Integer));
        assert_eq!(text(sql, folded.span), "- 42");

        let big = expr("-2147483648");
        assert_eq!(big.literal_kind(), Some(LiteralKind::Integer));
        let bigger = expr("-2147483649");
        assert_eq!(bigger.literal_kind(), Some(LiteralKind::Numeric));
    }

    #[test]
    fn typed_placeholders_read_back() {
        let ExprKind::TypedString { data_type, value } = expr("interval $3").kind else {
            panic!("expected typed string");
        };
        assert_eq!(data_type.name, "interval");
        assert_eq!(value.kind, ExprKind::Param(3));

        assert!(crate::parser::parse_script("SELECT total $1").is_err());
    }

    #[test]
    fn negated_parenthesized_number_stays_an_operator() {
        let negated = expr("-(1)");
        assert!(matches!(negated.kind, ExprKind::Unary { .. }));
    }

    #[test]
    fn precedence_binds_multiplication_before_addition() {
        let tree = expr("1 + 2 * 3");
        let ExprKind::Binary { op, right, .. } = tree.kind else {
            panic!("expected binary");
        };
        assert_eq!(op, "+");
        assert!(matches!(right.kind, ExprKind::Binary { ref op, .. } if op == "*"));
    }

    #[test]
    fn between_bounds_stop_at_and() {
        let tree = expr("a BETWEEN 1 AND 5 AND b");
        let ExprKind::BoolOp { op, operands } = tree.kind else {
            panic!("expected AND at the root");
        };
        assert_eq!(op, "AND");
        assert_eq!(operands.len(), 2);
        assert!(matches!(operands[0].kind, ExprKind::Between { .. }));
    }

    #[test]
    fn cast_and_type_modifiers_are_separate() {
        let sql = "CAST('abc' AS varchar(50))";
        let ExprKind::Cast { expr: inner, data_type } = expr(sql).kind else {
            panic!("expected cast");
        };
        assert_eq!(inner.literal_kind(), Some(LiteralKind::String));
        assert_eq!(data_type.name, "varchar");
        assert_eq!(data_type.modifiers.len(), 1);
        assert_eq!(text(sql, data_type.modifiers[0].span), "50");
    }

    #[test]
    fn typed_strings_cover_interval_fields() {
        let sql = "INTERVAL '1' DAY TO SECOND(3)";
        let ExprKind::TypedString { data_type, value } = expr(sql).kind else {
            panic!("expected typed string");
        };
        assert_eq!(data_type.name, "interval day to second");
        assert_eq!(text(sql, value.span), "'1'");
        assert_eq!(data_type.modifiers.len(), 1);

        let ExprKind::TypedString { data_type, .. } =
            expr("timestamp with time zone '2020-01-01'").kind
        else {
            panic!("expected typed string");
        };
        assert_eq!(data_type.name, "timestamp with time zone");
    }

    #[test]
    fn bit_string_prefix_joins_the_literal() {
        let sql = "B'0101'";
        let literal = expr(sql);
        assert_eq!(literal.literal_kind(), Some(LiteralKind::BitString));
        assert_eq!(text(sql, literal.span), sql);
    }

    #[test]
    fn function_calls_keep_aggregate_clauses() {
        let tree = expr(
            "percentile_cont(0.5) WITHIN GROUP (ORDER BY x) FILTER (WHERE y > 1) OVER (PARTITION BY z)",
        );
        let ExprKind::Function(function) = tree.kind else {
            panic!("expected function");
        };
        assert_eq!(function.within_group.len(), 1);
        assert!(function.filter.is_some());
        assert!(matches!(function.over, Some(WindowRef::Spec(_))));
    }

    #[test]
    fn field_access_on_parenthesized_column() {
        let tree = expr("(testfunc.response).\"mycolumn\"");
        let ExprKind::FieldAccess { field, .. } = tree.kind else {
            panic!("expected field access");
        };
        assert_eq!(field.map(|f| f.value), Some("mycolumn".to_string()));
    }

    #[test]
    fn quantified_comparison_wraps_array_operand() {
        let tree = expr("id = ANY('{1,2}'::int[])");
        let ExprKind::Binary { right, .. } = tree.kind else {
            panic!("expected comparison");
        };
        assert!(matches!(right.kind, ExprKind::Quantified { .. }));
    }

    #[test]
    fn at_time_zone_and_value_functions() {
        let tree = expr("created_at AT TIME ZONE 'UTC' > CURRENT_TIMESTAMP(3)");
        let ExprKind::Binary { left, right, .. } = tree.kind else {
            panic!("expected comparison");
        };
        assert!(matches!(left.kind, ExprKind::AtTimeZone { .. }));
        assert!(matches!(
            right.kind,
            ExprKind::ValueFunction { precision: Some(_), .. }
        ));
    }

    #[test]
    fn extract_keyword_field_is_not_an_argument() {
        let ExprKind::Function(function) = expr("EXTRACT(epoch FROM now())").kind else {
            panic!("expected function");
        };
        assert_eq!(function.args.len(), 1);
    }

    #[test]
    fn and_chains_flatten_into_one_node() {
        let tree = expr("a = 1 AND b = 2 AND (c = 3 AND d = 4) OR e");
        let ExprKind::BoolOp { op, operands } = tree.kind else {
            panic!("expected OR at the root");
        };
        assert_eq!(op, "OR");
        let ExprKind::BoolOp { op, operands: conjuncts } = &operands[0].kind else {
            panic!("expected AND chain");
        };
        assert_eq!(op, "AND");
        assert_eq!(conjuncts.len(), 3);
        assert!(matches!(conjuncts[2].kind, ExprKind::Nested(_)));
    }

    #[test]
    fn nesting_past_the_limit_is_a_parse_error() {
        let sql = format!("{}1{}", "(".repeat(200), ")".repeat(200));
        let mut parser = Parser::new(&sql).unwrap();
        let err = parser.parse_expr().unwrap_err();
        assert_eq!(err.message, "stack depth limit exceeded");

        let sql = format!("{}1{}", "(".repeat(20), ")".repeat(20));
        let mut parser = Parser::new(&sql).unwrap();
        assert!(parser.parse_expr().is_ok());
    }

    #[test]
    fn string_constants_continue_across_lines() {
        let sql = "'a'\n  'b' || 'c'";
        let ExprKind::Binary { left, right, .. } = expr(sql).kind else {
            panic!("expected concatenation");
        };
        assert_eq!(text(sql, left.span), "'a'\n  'b'");
        assert_eq!(text(sql, right.span), "'c'");
    }

    #[test]
    fn like_accepts_a_quantified_pattern() {
        let ExprKind::Like { op, pattern, .. } = expr("a NOT ILIKE ANY (ARRAY['x%'])").kind else {
            panic!("expected like");
        };
        assert_eq!(op, "NOT ILIKE");
        assert!(matches!(pattern.kind, ExprKind::Quantified { .. }));
    }

    #[test]
    fn constants_reject_column_references() {
        let mut parser = Parser::new("some_column").unwrap();
        assert!(parser.parse_constant().is_err());
    }
}
