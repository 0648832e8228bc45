//! Recursive-descent `PostgreSQL` statement grammar.
//!
//! The parser walks the token stream produced by [`tokenize`] and builds the
//! span-carrying tree in [`super::ast`]. Statements the normalizer has no
//! rules for are recognised by their leading keywords and kept as opaque
//! [`Utility`] nodes. Expression parsing lives in [`super::expr`].

use super::ast::{
    AlterSubscription, AlterSubscriptionAction, Assignment, ConflictAction, CreateRoutine,
    CreateSubscription, Cte, Delete, DeclareCursor, Distinct, DoBlock, Expr, ExprKind, Fetch,
    GenericOption, Ident, Insert, Join, JoinConstraint, LockingClause, Merge, MergeAction,
    MergeClause, NamedWindow, ObjectName, OnConflict, OptionValue, OrderByExpr, Query,
    RoleOption, RoleStatement, RoutineOption, RoutineParam, Select, SelectItem, SetExpr,
    SetVariable, Statement, StatementKind, TableAlias, TableRef, TableSample, TypeName, Update,
    UserMapping, Utility, Values, With,
};
use super::lexer::{tokenize, Span, Token, TokenKind};
use super::names::{
    canonical_option_name, is_multiword_type_start, is_reserved_keyword, unquote_identifier,
};
use crate::error::ParseError;

/// Leading keywords of commands kept as opaque utility statements.
const UTILITY_COMMANDS: &[&str] = &[
    "ABORT",
    "ALTER",
    "ANALYSE",
    "ANALYZE",
    "BEGIN",
    "CHECKPOINT",
    "CLUSTER",
    "COMMENT",
    "COMMIT",
    "CREATE",
    "DEALLOCATE",
    "DISCARD",
    "DROP",
    "END",
    "EXECUTE",
    "GRANT",
    "IMPORT",
    "LISTEN",
    "LOAD",
    "LOCK",
    "NOTIFY",
    "REASSIGN",
    "REFRESH",
    "REINDEX",
    "RELEASE",
    "RESET",
    "REVOKE",
    "ROLLBACK",
    "SAVEPOINT",
    "SECURITY",
    "SHOW",
    "START",
    "TRUNCATE",
    "UNLISTEN",
    "VACUUM",
];

/// Nesting allowed for expressions, set operations and joined tables.
const MAX_NESTING_DEPTH: usize = 50;

/// Keyword-only role attributes (`LOGIN`, `NOSUPERUSER`, …).
const ROLE_FLAGS: &[&str] = &[
    "BYPASSRLS",
    "CREATEDB",
    "CREATEROLE",
    "CREATEUSER",
    "INHERIT",
    "LOGIN",
    "NOBYPASSRLS",
    "NOCREATEDB",
    "NOCREATEROLE",
    "NOCREATEUSER",
    "NOINHERIT",
    "NOLOGIN",
    "NOREPLICATION",
    "NOSUPERUSER",
    "REPLICATION",
    "SUPERUSER",
];

/// Keyword-only routine attributes.
const ROUTINE_FLAGS: &[&str] = &[
    "IMMUTABLE",
    "LEAKPROOF",
    "STABLE",
    "STRICT",
    "VOLATILE",
    "WINDOW",
];

/// A parsed script: its statements plus the token stream they were built from.
#[derive(Debug, Clone)]
pub struct Script<'a> {
    /// The source text.
    pub source: &'a str,
    /// Top-level statements in source order.
    pub statements: Vec<Statement>,
    /// All tokens of the source, comments and whitespace excluded.
    pub tokens: Vec<Token<'a>>,
}

/// Tokenize and parse a semicolon-separated script.
///
/// Empty statements (`;;`) are skipped. Any tokenizer or grammar failure
/// aborts the whole script.
pub fn parse_script(source: &str) -> Result<Script<'_>, ParseError> {
    let mut parser = Parser::new(source)?;
    let statements = parser.parse_statements()?;
    Ok(Script {
        source,
        statements,
        tokens: parser.tokens,
    })
}

/// Token cursor plus the statement-level productions.
pub struct Parser<'a> {
    pub(crate) source: &'a str,
    pub(crate) tokens: Vec<Token<'a>>,
    pub(crate) pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    /// Tokenize `source` and position the cursor on the first token.
    pub fn new(source: &'a str) -> Result<Self, ParseError> {
        Ok(Self {
            source,
            tokens: tokenize(source)?,
            pos: 0,
            depth: 0,
        })
    }

    // -----------------------------------------------------------------------
    // Token helpers
    // -----------------------------------------------------------------------

    pub(crate) fn peek(&self) -> Option<Token<'a>> {
        self.tokens.get(self.pos).copied()
    }

    pub(crate) fn peek_nth(&self, n: usize) -> Option<Token<'a>> {
        self.tokens.get(self.pos + n).copied()
    }

    pub(crate) fn next_token(&mut self) -> Option<Token<'a>> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    pub(crate) fn peek_keyword(&self, keyword: &str) -> bool {
        self.peek().is_some_and(|t| t.is_keyword(keyword))
    }

    pub(crate) fn peek_nth_keyword(&self, n: usize, keyword: &str) -> bool {
        self.peek_nth(n).is_some_and(|t| t.is_keyword(keyword))
    }

    pub(crate) fn peek_punct(&self, punct: &str) -> bool {
        self.peek().is_some_and(|t| t.is_punct(punct))
    }

    pub(crate) fn peek_nth_punct(&self, n: usize, punct: &str) -> bool {
        self.peek_nth(n).is_some_and(|t| t.is_punct(punct))
    }

    /// True when the next token is one of the keywords opening a query.
    pub(crate) fn peek_query_start(&self, n: usize) -> bool {
        self.peek_nth(n).is_some_and(|t| {
            ["SELECT", "VALUES", "WITH", "TABLE"]
                .iter()
                .any(|kw| t.is_keyword(kw))
        })
    }

    pub(crate) fn parse_keyword(&mut self, keyword: &str) -> bool {
        if self.peek_keyword(keyword) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Consume the whole keyword sequence, or nothing.
    pub(crate) fn parse_keywords(&mut self, keywords: &[&str]) -> bool {
        let matched = keywords
            .iter()
            .enumerate()
            .all(|(idx, kw)| self.peek_nth_keyword(idx, kw));
        if matched {
            self.pos += keywords.len();
        }
        matched
    }

    pub(crate) fn parse_one_of_keywords(&mut self, keywords: &[&'static str]) -> Option<&'static str> {
        let found = keywords.iter().copied().find(|kw| self.peek_keyword(kw))?;
        self.pos += 1;
        Some(found)
    }

    pub(crate) fn expect_keyword(&mut self, keyword: &str) -> Result<Token<'a>, ParseError> {
        match self.peek() {
            Some(token) if token.is_keyword(keyword) => {
                self.pos += 1;
                Ok(token)
            }
            _ => Err(self.error_here()),
        }
    }

    pub(crate) fn parse_punct(&mut self, punct: &str) -> bool {
        if self.peek_punct(punct) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub(crate) fn expect_punct(&mut self, punct: &str) -> Result<Token<'a>, ParseError> {
        match self.peek() {
            Some(token) if token.is_punct(punct) => {
                self.pos += 1;
                Ok(token)
            }
            _ => Err(self.error_here()),
        }
    }

    /// Run `production` one nesting level deeper.
    ///
    /// Fails with "stack depth limit exceeded" instead of recursing past
    /// [`MAX_NESTING_DEPTH`].
    pub(crate) fn nested<T>(
        &mut self,
        production: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(ParseError::at(
                "stack depth limit exceeded",
                self.source,
                self.offset(),
            ));
        }
        self.depth += 1;
        let result = production(self);
        self.depth -= 1;
        result
    }

    /// A syntax error located at the next token (or at end of input).
    pub(crate) fn error_here(&self) -> ParseError {
        match self.peek() {
            Some(token) => ParseError::at(
                format!("syntax error at or near \"{}\"", token.text),
                self.source,
                token.span.start,
            ),
            None => ParseError::at("syntax error at end of input", self.source, self.source.len()),
        }
    }

    /// Byte offset of the next token, or the end of the source.
    pub(crate) fn offset(&self) -> usize {
        self.peek().map_or(self.source.len(), |t| t.span.start)
    }

    /// Byte offset just past the last consumed token.
    pub(crate) fn prev_end(&self) -> usize {
        self.pos
            .checked_sub(1)
            .and_then(|idx| self.tokens.get(idx))
            .map_or(0, |t| t.span.end)
    }

    pub(crate) fn span_from(&self, start: usize) -> Span {
        Span::new(start, self.prev_end().max(start))
    }

    pub(crate) fn at_statement_end(&self) -> bool {
        self.peek().map_or(true, |t| t.is_punct(";"))
    }

    pub(crate) fn parse_comma_separated<T>(
        &mut self,
        mut item: impl FnMut(&mut Self) -> Result<T, ParseError>,
    ) -> Result<Vec<T>, ParseError> {
        let mut items = vec![item(self)?];
        while self.parse_punct(",") {
            items.push(item(self)?);
        }
        Ok(items)
    }

    /// Skip tokens up to the next top-level `;`, balancing parentheses.
    fn skip_to_statement_end(&mut self) {
        let mut depth = 0usize;
        while let Some(token) = self.peek() {
            if depth == 0 && token.is_punct(";") {
                break;
            }
            if token.is_punct("(") {
                depth += 1;
            } else if token.is_punct(")") {
                depth = depth.saturating_sub(1);
            }
            self.pos += 1;
        }
    }

    /// Skip a balanced parenthesized group starting at `(`.
    fn skip_parenthesized(&mut self) -> Result<(), ParseError> {
        self.expect_punct("(")?;
        let mut depth = 1usize;
        while depth > 0 {
            let Some(token) = self.next_token() else {
                return Err(self.error_here());
            };
            if token.is_punct("(") {
                depth += 1;
            } else if token.is_punct(")") {
                depth -= 1;
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Identifiers
    // -----------------------------------------------------------------------

    /// Parse an identifier; reserved keywords are rejected unless quoted.
    pub(crate) fn parse_identifier(&mut self) -> Result<Ident, ParseError> {
        match self.peek() {
            Some(token) if token.kind == TokenKind::Word && is_reserved_keyword(token.text) => {
                Err(self.error_here())
            }
            _ => self.parse_any_identifier(),
        }
    }

    /// Parse an identifier, accepting any keyword (option names, role specs).
    pub(crate) fn parse_any_identifier(&mut self) -> Result<Ident, ParseError> {
        match self.peek() {
            Some(token) if token.kind == TokenKind::QuotedIdent => {
                self.pos += 1;
                Ok(Ident {
                    value: unquote_identifier(token.text),
                    quoted: true,
                    span: token.span,
                })
            }
            Some(token) if token.kind == TokenKind::Word => {
                self.pos += 1;
                Ok(Ident {
                    value: token.text.to_string(),
                    quoted: false,
                    span: token.span,
                })
            }
            _ => Err(self.error_here()),
        }
    }

    pub(crate) fn parse_object_name(&mut self) -> Result<ObjectName, ParseError> {
        let start = self.offset();
        let mut parts = vec![self.parse_identifier()?];
        while self.peek_punct(".")
            && self.peek_nth(1).is_some_and(|t| {
                matches!(t.kind, TokenKind::Word | TokenKind::QuotedIdent)
            })
        {
            self.pos += 1;
            parts.push(self.parse_any_identifier()?);
        }
        Ok(ObjectName {
            parts,
            span: self.span_from(start),
        })
    }

    fn parse_parenthesized_identifiers(&mut self) -> Result<Vec<Ident>, ParseError> {
        self.expect_punct("(")?;
        let idents = self.parse_comma_separated(Self::parse_identifier)?;
        self.expect_punct(")")?;
        Ok(idents)
    }

    // -----------------------------------------------------------------------
    // Statements
    // -----------------------------------------------------------------------

    /// Parse every statement up to the end of input.
    pub fn parse_statements(&mut self) -> Result<Vec<Statement>, ParseError> {
        let mut statements = Vec::new();
        loop {
            while self.parse_punct(";") {}
            if self.peek().is_none() {
                break;
            }
            statements.push(self.parse_statement()?);
            if !self.at_statement_end() {
                return Err(self.error_here());
            }
        }
        Ok(statements)
    }

    /// Parse one statement, leaving the terminator unconsumed.
    pub fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        let start = self.offset();
        let kind = self.parse_statement_kind()?;
        Ok(Statement {
            kind,
            span: self.span_from(start),
        })
    }

    fn parse_statement_kind(&mut self) -> Result<StatementKind, ParseError> {
        let Some(token) = self.peek() else {
            return Err(self.error_here());
        };
        if token.is_punct("(") {
            return Ok(StatementKind::Query(Box::new(self.parse_query()?)));
        }
        if token.kind != TokenKind::Word {
            return Err(self.error_here());
        }

        let keyword = token.text.to_ascii_uppercase();
        match keyword.as_str() {
            "SELECT" | "VALUES" | "TABLE" => {
                Ok(StatementKind::Query(Box::new(self.parse_query()?)))
            }
            "WITH" => self.parse_with_statement(),
            "INSERT" => Ok(StatementKind::Insert(Box::new(self.parse_insert(None)?))),
            "UPDATE" => Ok(StatementKind::Update(Box::new(self.parse_update(None)?))),
            "DELETE" => Ok(StatementKind::Delete(Box::new(self.parse_delete(None)?))),
            "MERGE" => Ok(StatementKind::Merge(Box::new(self.parse_merge(None)?))),
            "CREATE" => self.parse_create(),
            "ALTER" => self.parse_alter(),
            "DO" => self.parse_do(),
            "DECLARE" => self.parse_declare_cursor(),
            "FETCH" | "MOVE" => self.parse_fetch(),
            "CLOSE" => self.parse_close(),
            "SET" => self.parse_set_statement(),
            "EXPLAIN" => self.parse_explain(),
            "PREPARE" => self.parse_prepare(),
            "CALL" => {
                self.pos += 1;
                Ok(StatementKind::Call(self.parse_expr()?))
            }
            "COPY" => self.parse_copy(),
            command if UTILITY_COMMANDS.contains(&command) => self.parse_utility(),
            _ => Err(self.error_here()),
        }
    }

    fn parse_utility(&mut self) -> Result<StatementKind, ParseError> {
        let start = self.offset();
        let mut words = Vec::new();
        for token in self.tokens[self.pos..].iter().take(4) {
            if token.kind != TokenKind::Word {
                break;
            }
            let upper = token.text.to_ascii_uppercase();
            let modifier = matches!(
                upper.as_str(),
                "OR" | "REPLACE" | "TEMP" | "TEMPORARY" | "UNLOGGED" | "UNIQUE"
            );
            if words.is_empty() || !modifier {
                words.push(upper);
            }
            if words.len() == 2 {
                break;
            }
        }
        self.skip_to_statement_end();
        Ok(StatementKind::Utility(Utility {
            command: words.join(" "),
            span: self.span_from(start),
        }))
    }

    fn parse_with_statement(&mut self) -> Result<StatementKind, ParseError> {
        let start = self.offset();
        let with = self.parse_with_clause()?;
        let Some(token) = self.peek() else {
            return Err(self.error_here());
        };
        if token.is_keyword("INSERT") {
            Ok(StatementKind::Insert(Box::new(self.parse_insert(with)?)))
        } else if token.is_keyword("UPDATE") {
            Ok(StatementKind::Update(Box::new(self.parse_update(with)?)))
        } else if token.is_keyword("DELETE") {
            Ok(StatementKind::Delete(Box::new(self.parse_delete(with)?)))
        } else if token.is_keyword("MERGE") {
            Ok(StatementKind::Merge(Box::new(self.parse_merge(with)?)))
        } else {
            Ok(StatementKind::Query(Box::new(
                self.parse_query_rest(with, start)?,
            )))
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Parse a full query expression: `[WITH] body [ORDER BY] [LIMIT] …`.
    pub(crate) fn parse_query(&mut self) -> Result<Query, ParseError> {
        let start = self.offset();
        let with = self.parse_with_clause()?;
        self.parse_query_rest(with, start)
    }

    fn parse_query_rest(&mut self, with: Option<With>, start: usize) -> Result<Query, ParseError> {
        let body = self.parse_set_expr(0)?;

        let mut order_by = Vec::new();
        if self.parse_keywords(&["ORDER", "BY"]) {
            order_by = self.parse_comma_separated(Self::parse_order_by_expr)?;
        }

        let mut limit = None;
        let mut offset = None;
        let mut locking = Vec::new();
        loop {
            if self.parse_keyword("LIMIT") {
                if !self.parse_keyword("ALL") {
                    limit = Some(self.parse_expr()?);
                }
            } else if self.parse_keyword("OFFSET") {
                offset = Some(self.parse_expr()?);
                self.parse_one_of_keywords(&["ROW", "ROWS"]);
            } else if self.peek_keyword("FETCH")
                && (self.peek_nth_keyword(1, "FIRST") || self.peek_nth_keyword(1, "NEXT"))
            {
                self.pos += 2;
                if !self.peek_keyword("ROW") && !self.peek_keyword("ROWS") {
                    limit = Some(self.parse_subexpr(super::expr::PREC_UNARY)?);
                }
                if self.parse_one_of_keywords(&["ROW", "ROWS"]).is_none() {
                    return Err(self.error_here());
                }
                if !self.parse_keyword("ONLY") && !self.parse_keywords(&["WITH", "TIES"]) {
                    return Err(self.error_here());
                }
            } else if self.peek_keyword("FOR")
                && ["UPDATE", "NO", "SHARE", "KEY"]
                    .iter()
                    .any(|kw| self.peek_nth_keyword(1, kw))
            {
                locking.push(self.parse_locking_clause()?);
            } else {
                break;
            }
        }

        Ok(Query {
            with,
            body,
            order_by,
            limit,
            offset,
            locking,
            span: self.span_from(start),
        })
    }

    fn parse_locking_clause(&mut self) -> Result<LockingClause, ParseError> {
        self.expect_keyword("FOR")?;
        let strength = if self.parse_keyword("UPDATE") {
            "UPDATE"
        } else if self.parse_keywords(&["NO", "KEY", "UPDATE"]) {
            "NO KEY UPDATE"
        } else if self.parse_keyword("SHARE") {
            "SHARE"
        } else if self.parse_keywords(&["KEY", "SHARE"]) {
            "KEY SHARE"
        } else {
            return Err(self.error_here());
        };
        let mut of = Vec::new();
        if self.parse_keyword("OF") {
            of = self.parse_comma_separated(Self::parse_object_name)?;
        }
        if !self.parse_keyword("NOWAIT") {
            self.parse_keywords(&["SKIP", "LOCKED"]);
        }
        Ok(LockingClause {
            strength: strength.to_string(),
            of,
        })
    }

    fn parse_with_clause(&mut self) -> Result<Option<With>, ParseError> {
        if !self.parse_keyword("WITH") {
            return Ok(None);
        }
        let recursive = self.parse_keyword("RECURSIVE");
        let ctes = self.parse_comma_separated(|p| {
            let name = p.parse_identifier()?;
            let columns = if p.peek_punct("(") {
                p.parse_parenthesized_identifiers()?
            } else {
                Vec::new()
            };
            p.expect_keyword("AS")?;
            if !p.parse_keyword("MATERIALIZED") {
                p.parse_keywords(&["NOT", "MATERIALIZED"]);
            }
            p.expect_punct("(")?;
            let body = p.parse_statement()?;
            p.expect_punct(")")?;
            Ok(Cte {
                name,
                columns,
                body: Box::new(body),
            })
        })?;
        Ok(Some(With { recursive, ctes }))
    }

    fn parse_set_expr(&mut self, min_prec: u8) -> Result<SetExpr, ParseError> {
        self.nested(|p| p.parse_set_expr_inner(min_prec))
    }

    fn parse_set_expr_inner(&mut self, min_prec: u8) -> Result<SetExpr, ParseError> {
        let mut left = self.parse_set_primary()?;
        loop {
            let prec = match self.peek() {
                Some(t) if t.is_keyword("UNION") || t.is_keyword("EXCEPT") => 1,
                Some(t) if t.is_keyword("INTERSECT") => 2,
                _ => break,
            };
            if prec <= min_prec {
                break;
            }
            let op = self
                .next_token()
                .map(|t| t.text.to_ascii_uppercase())
                .unwrap_or_default();
            let all = if self.parse_keyword("ALL") {
                true
            } else {
                self.parse_keyword("DISTINCT");
                false
            };
            let right = self.parse_set_expr(prec)?;
            left = SetExpr::SetOperation {
                op,
                all,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_set_primary(&mut self) -> Result<SetExpr, ParseError> {
        if self.peek_keyword("SELECT") {
            Ok(SetExpr::Select(Box::new(self.parse_select()?)))
        } else if self.peek_keyword("VALUES") {
            Ok(SetExpr::Values(self.parse_values()?))
        } else if self.parse_keyword("TABLE") {
            Ok(SetExpr::Table(self.parse_object_name()?))
        } else if self.parse_punct("(") {
            let query = self.parse_query()?;
            self.expect_punct(")")?;
            Ok(SetExpr::Query(Box::new(query)))
        } else {
            Err(self.error_here())
        }
    }

    fn parse_values(&mut self) -> Result<Values, ParseError> {
        let start = self.offset();
        self.expect_keyword("VALUES")?;
        let rows = self.parse_comma_separated(|p| {
            p.expect_punct("(")?;
            let row = p.parse_comma_separated(Self::parse_expr)?;
            p.expect_punct(")")?;
            Ok(row)
        })?;
        Ok(Values {
            rows,
            span: self.span_from(start),
        })
    }

    /// True when the select list is empty (`SELECT FROM t`, `SELECT;`).
    fn at_select_list_end(&self) -> bool {
        match self.peek() {
            None => true,
            Some(t) if t.is_punct(";") || t.is_punct(")") => true,
            Some(t) => [
                "FROM", "WHERE", "GROUP", "HAVING", "WINDOW", "ORDER", "LIMIT", "OFFSET", "FETCH",
                "FOR", "UNION", "INTERSECT", "EXCEPT", "INTO",
            ]
            .iter()
            .any(|kw| t.is_keyword(kw)),
        }
    }

    fn parse_select(&mut self) -> Result<Select, ParseError> {
        let start = self.offset();
        self.expect_keyword("SELECT")?;

        let distinct = if self.parse_keyword("DISTINCT") {
            if self.parse_keyword("ON") {
                self.expect_punct("(")?;
                let exprs = self.parse_comma_separated(Self::parse_expr)?;
                self.expect_punct(")")?;
                Some(Distinct::On(exprs))
            } else {
                Some(Distinct::All)
            }
        } else {
            self.parse_keyword("ALL");
            None
        };

        let projection = if self.at_select_list_end() {
            Vec::new()
        } else {
            self.parse_comma_separated(Self::parse_select_item)?
        };

        let into = if self.parse_keyword("INTO") {
            self.parse_one_of_keywords(&["TEMPORARY", "TEMP", "UNLOGGED"]);
            self.parse_keyword("TABLE");
            Some(self.parse_object_name()?)
        } else {
            None
        };

        let from = if self.parse_keyword("FROM") {
            self.parse_comma_separated(Self::parse_table_ref)?
        } else {
            Vec::new()
        };

        let selection = self.parse_where()?;

        let mut group_by = Vec::new();
        if self.parse_keywords(&["GROUP", "BY"]) {
            self.parse_one_of_keywords(&["ALL", "DISTINCT"]);
            group_by = self.parse_comma_separated(Self::parse_group_by_item)?;
        }

        let having = if self.parse_keyword("HAVING") {
            Some(self.parse_expr()?)
        } else {
            None
        };

        let mut windows = Vec::new();
        if self.parse_keyword("WINDOW") {
            windows = self.parse_comma_separated(|p| {
                let name = p.parse_identifier()?;
                p.expect_keyword("AS")?;
                p.expect_punct("(")?;
                let spec = p.parse_window_spec()?;
                p.expect_punct(")")?;
                Ok(NamedWindow { name, spec })
            })?;
        }

        Ok(Select {
            distinct,
            projection,
            into,
            from,
            selection,
            group_by,
            having,
            windows,
            span: self.span_from(start),
        })
    }

    fn parse_where(&mut self) -> Result<Option<Expr>, ParseError> {
        if !self.parse_keyword("WHERE") {
            return Ok(None);
        }
        if self.peek_keyword("CURRENT") && self.peek_nth_keyword(1, "OF") {
            let start = self.offset();
            self.pos += 2;
            let cursor = self.parse_identifier()?;
            return Ok(Some(Expr::new(
                ExprKind::CurrentOf(cursor),
                self.span_from(start),
            )));
        }
        Ok(Some(self.parse_expr()?))
    }

    fn parse_group_by_item(&mut self) -> Result<Expr, ParseError> {
        let start = self.offset();
        if self.peek_keyword("GROUPING") && self.peek_nth_keyword(1, "SETS") {
            let first = self.next_token().ok_or_else(|| self.error_here())?;
            let second = self.next_token().ok_or_else(|| self.error_here())?;
            let name = ObjectName {
                parts: vec![Ident {
                    value: "GROUPING SETS".to_string(),
                    quoted: false,
                    span: first.span.union(second.span),
                }],
                span: first.span.union(second.span),
            };
            self.expect_punct("(")?;
            let args = self.parse_comma_separated(Self::parse_group_by_item)?;
            self.expect_punct(")")?;
            return Ok(Expr::new(
                ExprKind::Function(Box::new(super::ast::Function {
                    name,
                    args: args
                        .into_iter()
                        .map(|value| super::ast::FunctionArg { name: None, value })
                        .collect(),
                    distinct: false,
                    order_by: Vec::new(),
                    within_group: Vec::new(),
                    filter: None,
                    over: None,
                })),
                self.span_from(start),
            ));
        }
        self.parse_expr()
    }

    pub(crate) fn parse_select_item(&mut self) -> Result<SelectItem, ParseError> {
        if let Some(star) = self.peek().filter(|t| t.is_punct("*")) {
            self.pos += 1;
            return Ok(SelectItem {
                expr: Expr::new(ExprKind::Wildcard(Vec::new()), star.span),
                alias: None,
            });
        }
        let expr = self.parse_expr()?;
        let alias = if self.parse_keyword("AS") {
            Some(self.parse_any_identifier()?)
        } else {
            self.parse_bare_alias()?
        };
        Ok(SelectItem { expr, alias })
    }

    /// An alias written without `AS`; reserved keywords end the item instead.
    fn parse_bare_alias(&mut self) -> Result<Option<Ident>, ParseError> {
        match self.peek() {
            Some(t) if t.kind == TokenKind::QuotedIdent => Ok(Some(self.parse_any_identifier()?)),
            Some(t)
                if t.kind == TokenKind::Word
                    && !is_reserved_keyword(t.text)
                    && !t.is_keyword("SET") =>
            {
                Ok(Some(self.parse_any_identifier()?))
            }
            _ => Ok(None),
        }
    }

    pub(crate) fn parse_order_by_expr(&mut self) -> Result<OrderByExpr, ParseError> {
        let expr = self.parse_expr()?;
        let asc = if self.parse_keyword("ASC") {
            Some(true)
        } else if self.parse_keyword("DESC") {
            Some(false)
        } else {
            if self.parse_keyword("USING") {
                self.next_token().ok_or_else(|| self.error_here())?;
            }
            None
        };
        let nulls_first = if self.parse_keywords(&["NULLS", "FIRST"]) {
            Some(true)
        } else if self.parse_keywords(&["NULLS", "LAST"]) {
            Some(false)
        } else {
            None
        };
        Ok(OrderByExpr {
            expr,
            asc,
            nulls_first,
        })
    }

    // -----------------------------------------------------------------------
    // FROM items
    // -----------------------------------------------------------------------

    pub(crate) fn parse_table_ref(&mut self) -> Result<TableRef, ParseError> {
        let mut left = self.parse_table_primary()?;
        while let Some(kind) = self.parse_join_kind() {
            let right = self.parse_table_primary()?;
            let constraint = if kind.contains("CROSS") || kind.contains("NATURAL") {
                JoinConstraint::None
            } else if self.parse_keyword("ON") {
                JoinConstraint::On(self.parse_expr()?)
            } else if self.parse_keyword("USING") {
                let columns = self.parse_parenthesized_identifiers()?;
                if self.parse_keyword("AS") {
                    self.parse_identifier()?;
                }
                JoinConstraint::Using(columns)
            } else {
                return Err(self.error_here());
            };
            left = TableRef::Join(Box::new(Join {
                left,
                right,
                kind,
                constraint,
            }));
        }
        Ok(left)
    }

    fn parse_join_kind(&mut self) -> Option<String> {
        let mark = self.pos;
        let mut words = Vec::new();
        if self.parse_keyword("NATURAL") {
            words.push("NATURAL");
        }
        if let Some(kind) = self.parse_one_of_keywords(&["INNER", "LEFT", "RIGHT", "FULL", "CROSS"]) {
            words.push(kind);
            self.parse_keyword("OUTER");
        }
        if !self.parse_keyword("JOIN") {
            self.pos = mark;
            return None;
        }
        if words.is_empty() || words == ["NATURAL"] {
            words.push("INNER");
        }
        Some(words.join(" "))
    }

    fn parse_table_primary(&mut self) -> Result<TableRef, ParseError> {
        self.nested(Self::parse_table_factor)
    }

    fn parse_table_factor(&mut self) -> Result<TableRef, ParseError> {
        let lateral = self.parse_keyword("LATERAL");

        if self.peek_punct("(") {
            if self.peek_query_start(1) {
                self.pos += 1;
                let subquery = self.parse_query()?;
                self.expect_punct(")")?;
                let alias = self.parse_table_alias()?;
                return Ok(TableRef::Derived {
                    lateral,
                    subquery: Box::new(subquery),
                    alias,
                });
            }
            if self.peek_nth_punct(1, "(") {
                let mark = self.pos;
                self.pos += 1;
                if let Ok(subquery) = self.parse_query() {
                    if self.parse_punct(")") {
                        let alias = self.parse_table_alias()?;
                        return Ok(TableRef::Derived {
                            lateral,
                            subquery: Box::new(subquery),
                            alias,
                        });
                    }
                }
                self.pos = mark;
            }
            self.expect_punct("(")?;
            let inner = self.parse_table_ref()?;
            self.expect_punct(")")?;
            let nested = TableRef::Nested(Box::new(inner));
            // An alias on a parenthesized join only renames it; it holds no literals.
            self.parse_table_alias()?;
            return Ok(nested);
        }

        self.parse_keyword("ONLY");
        let start = self.offset();
        let name = self.parse_object_name()?;

        if self.peek_punct("(") {
            let call = self.parse_function_call(name, start)?;
            self.parse_keywords(&["WITH", "ORDINALITY"]);
            let alias = self.parse_table_alias()?;
            return Ok(TableRef::Function {
                lateral,
                call,
                alias,
            });
        }

        self.parse_punct("*");
        let alias = self.parse_table_alias()?;
        let sample = if self.parse_keyword("TABLESAMPLE") {
            let method = self.parse_object_name()?;
            self.expect_punct("(")?;
            let args = self.parse_comma_separated(Self::parse_expr)?;
            self.expect_punct(")")?;
            let repeatable = if self.parse_keyword("REPEATABLE") {
                self.expect_punct("(")?;
                let seed = self.parse_expr()?;
                self.expect_punct(")")?;
                Some(seed)
            } else {
                None
            };
            Some(TableSample {
                method,
                args,
                repeatable,
            })
        } else {
            None
        };

        Ok(TableRef::Table {
            name,
            alias,
            sample,
        })
    }

    fn parse_table_alias(&mut self) -> Result<Option<TableAlias>, ParseError> {
        let name = if self.parse_keyword("AS") {
            self.parse_any_identifier()?
        } else {
            match self.parse_bare_alias()? {
                Some(name) => name,
                None => return Ok(None),
            }
        };
        let columns = if self.peek_punct("(") {
            self.parse_parenthesized_identifiers()?
        } else {
            Vec::new()
        };
        Ok(Some(TableAlias { name, columns }))
    }

    // -----------------------------------------------------------------------
    // Data-modifying statements
    // -----------------------------------------------------------------------

    fn parse_target_alias(&mut self) -> Result<Option<Ident>, ParseError> {
        if self.parse_keyword("AS") {
            return Ok(Some(self.parse_any_identifier()?));
        }
        self.parse_bare_alias()
    }

    fn parse_returning(&mut self) -> Result<Vec<SelectItem>, ParseError> {
        if self.parse_keyword("RETURNING") {
            self.parse_comma_separated(Self::parse_select_item)
        } else {
            Ok(Vec::new())
        }
    }

    fn parse_insert(&mut self, with: Option<With>) -> Result<Insert, ParseError> {
        self.expect_keyword("INSERT")?;
        self.expect_keyword("INTO")?;
        let table = self.parse_object_name()?;
        let alias = if self.parse_keyword("AS") {
            Some(self.parse_any_identifier()?)
        } else {
            None
        };

        let columns = if self.peek_punct("(") && !self.peek_query_start(1) {
            self.parse_parenthesized_identifiers()?
        } else {
            Vec::new()
        };

        if self.parse_keyword("OVERRIDING") {
            self.parse_one_of_keywords(&["SYSTEM", "USER"]);
            self.expect_keyword("VALUE")?;
        }

        let source = if self.parse_keywords(&["DEFAULT", "VALUES"]) {
            None
        } else {
            Some(Box::new(self.parse_query()?))
        };

        let on_conflict = if self.parse_keywords(&["ON", "CONFLICT"]) {
            Some(self.parse_on_conflict()?)
        } else {
            None
        };

        let returning = self.parse_returning()?;
        Ok(Insert {
            with,
            table,
            alias,
            columns,
            source,
            on_conflict,
            returning,
        })
    }

    fn parse_on_conflict(&mut self) -> Result<OnConflict, ParseError> {
        let mut target = Vec::new();
        let mut target_where = None;
        if self.parse_punct("(") {
            target = self.parse_comma_separated(|p| {
                let expr = p.parse_expr()?;
                // Operator class and ordering decorations carry no literals.
                while !p.peek_punct(",") && !p.peek_punct(")") && p.peek().is_some() {
                    p.pos += 1;
                }
                Ok(expr)
            })?;
            self.expect_punct(")")?;
            target_where = self.parse_where()?;
        } else if self.parse_keywords(&["ON", "CONSTRAINT"]) {
            self.parse_identifier()?;
        }

        self.expect_keyword("DO")?;
        let action = if self.parse_keyword("NOTHING") {
            ConflictAction::Nothing
        } else {
            self.expect_keyword("UPDATE")?;
            self.expect_keyword("SET")?;
            let assignments = self.parse_comma_separated(Self::parse_assignment)?;
            let selection = self.parse_where()?;
            ConflictAction::Update {
                assignments,
                selection,
            }
        };

        Ok(OnConflict {
            target,
            target_where,
            action,
        })
    }

    fn parse_assignment(&mut self) -> Result<Assignment, ParseError> {
        let targets = if self.parse_punct("(") {
            let targets = self.parse_comma_separated(Self::parse_assignment_target)?;
            self.expect_punct(")")?;
            targets
        } else {
            vec![self.parse_assignment_target()?]
        };
        self.expect_punct("=")?;
        let value = self.parse_expr()?;
        Ok(Assignment { targets, value })
    }

    fn parse_assignment_target(&mut self) -> Result<Expr, ParseError> {
        let start = self.offset();
        let mut parts = vec![self.parse_identifier()?];
        while self.parse_punct(".") {
            parts.push(self.parse_any_identifier()?);
        }
        let mut target = Expr::new(ExprKind::Column(parts), self.span_from(start));
        while self.peek_punct("[") {
            target = self.parse_subscript(target)?;
        }
        Ok(target)
    }

    fn parse_update(&mut self, with: Option<With>) -> Result<Update, ParseError> {
        self.expect_keyword("UPDATE")?;
        self.parse_keyword("ONLY");
        let table = self.parse_object_name()?;
        self.parse_punct("*");
        let alias = self.parse_target_alias()?;
        self.expect_keyword("SET")?;
        let assignments = self.parse_comma_separated(Self::parse_assignment)?;
        let from = if self.parse_keyword("FROM") {
            self.parse_comma_separated(Self::parse_table_ref)?
        } else {
            Vec::new()
        };
        let selection = self.parse_where()?;
        let returning = self.parse_returning()?;
        Ok(Update {
            with,
            table,
            alias,
            assignments,
            from,
            selection,
            returning,
        })
    }

    fn parse_delete(&mut self, with: Option<With>) -> Result<Delete, ParseError> {
        self.expect_keyword("DELETE")?;
        self.expect_keyword("FROM")?;
        self.parse_keyword("ONLY");
        let table = self.parse_object_name()?;
        self.parse_punct("*");
        let alias = self.parse_target_alias()?;
        let using = if self.parse_keyword("USING") {
            self.parse_comma_separated(Self::parse_table_ref)?
        } else {
            Vec::new()
        };
        let selection = self.parse_where()?;
        let returning = self.parse_returning()?;
        Ok(Delete {
            with,
            table,
            alias,
            using,
            selection,
            returning,
        })
    }

    fn parse_merge(&mut self, with: Option<With>) -> Result<Merge, ParseError> {
        self.expect_keyword("MERGE")?;
        self.expect_keyword("INTO")?;
        self.parse_keyword("ONLY");
        let table = self.parse_object_name()?;
        let alias = self.parse_target_alias()?;
        self.expect_keyword("USING")?;
        let source = self.parse_table_primary()?;
        self.expect_keyword("ON")?;
        let on = self.parse_expr()?;

        let mut clauses = Vec::new();
        while self.parse_keyword("WHEN") {
            let matched = if self.parse_keywords(&["NOT", "MATCHED"]) {
                if self.parse_keywords(&["BY", "SOURCE"]) {
                    true
                } else {
                    self.parse_keywords(&["BY", "TARGET"]);
                    false
                }
            } else {
                self.expect_keyword("MATCHED")?;
                true
            };
            let condition = if self.parse_keyword("AND") {
                Some(self.parse_expr()?)
            } else {
                None
            };
            self.expect_keyword("THEN")?;
            let action = self.parse_merge_action()?;
            clauses.push(MergeClause {
                matched,
                condition,
                action,
            });
        }
        if clauses.is_empty() {
            return Err(self.error_here());
        }

        let returning = self.parse_returning()?;
        Ok(Merge {
            with,
            table,
            alias,
            source,
            on,
            clauses,
            returning,
        })
    }

    fn parse_merge_action(&mut self) -> Result<MergeAction, ParseError> {
        if self.parse_keyword("UPDATE") {
            self.expect_keyword("SET")?;
            return Ok(MergeAction::Update(
                self.parse_comma_separated(Self::parse_assignment)?,
            ));
        }
        if self.parse_keyword("DELETE") {
            return Ok(MergeAction::Delete);
        }
        if self.parse_keywords(&["DO", "NOTHING"]) {
            return Ok(MergeAction::Nothing);
        }
        self.expect_keyword("INSERT")?;
        let columns = if self.peek_punct("(") {
            self.parse_parenthesized_identifiers()?
        } else {
            Vec::new()
        };
        if self.parse_keyword("OVERRIDING") {
            self.parse_one_of_keywords(&["SYSTEM", "USER"]);
            self.expect_keyword("VALUE")?;
        }
        let values = if self.parse_keywords(&["DEFAULT", "VALUES"]) {
            Vec::new()
        } else {
            self.expect_keyword("VALUES")?;
            self.expect_punct("(")?;
            let values = self.parse_comma_separated(Self::parse_expr)?;
            self.expect_punct(")")?;
            values
        };
        Ok(MergeAction::Insert { columns, values })
    }

    // -----------------------------------------------------------------------
    // CREATE / ALTER
    // -----------------------------------------------------------------------

    fn parse_create(&mut self) -> Result<StatementKind, ParseError> {
        let mark = self.pos;
        self.expect_keyword("CREATE")?;
        let or_replace = self.parse_keywords(&["OR", "REPLACE"]);

        if self.peek_keyword("FUNCTION") || self.peek_keyword("PROCEDURE") {
            return Ok(StatementKind::CreateRoutine(Box::new(
                self.parse_create_routine(or_replace)?,
            )));
        }
        if !or_replace {
            if self.peek_keyword("USER") && self.peek_nth_keyword(1, "MAPPING") {
                return Ok(StatementKind::UserMapping(self.parse_user_mapping(true)?));
            }
            if self.parse_one_of_keywords(&["ROLE", "USER", "GROUP"]).is_some() {
                let name = self.parse_any_identifier()?;
                let options = self.parse_role_options()?;
                return Ok(StatementKind::Role(RoleStatement {
                    create: true,
                    name,
                    options,
                }));
            }
            if self.parse_keyword("SUBSCRIPTION") {
                return Ok(StatementKind::CreateSubscription(
                    self.parse_create_subscription()?,
                ));
            }
        }

        self.pos = mark;
        self.parse_utility()
    }

    fn parse_alter(&mut self) -> Result<StatementKind, ParseError> {
        let mark = self.pos;
        self.expect_keyword("ALTER")?;

        if self.peek_keyword("USER") && self.peek_nth_keyword(1, "MAPPING") {
            return Ok(StatementKind::UserMapping(self.parse_user_mapping(false)?));
        }
        if self.parse_one_of_keywords(&["ROLE", "USER"]).is_some() {
            let name = self.parse_any_identifier()?;
            if self.parse_keywords(&["IN", "DATABASE"]) {
                self.parse_any_identifier()?;
            }
            if self.peek_keyword("SET") {
                return self.parse_set_statement();
            }
            let option_follows = self.peek_keyword("WITH")
                || self.peek().is_some_and(|t| {
                    t.kind == TokenKind::Word && is_role_option_keyword(t.text)
                });
            if option_follows {
                let options = self.parse_role_options()?;
                return Ok(StatementKind::Role(RoleStatement {
                    create: false,
                    name,
                    options,
                }));
            }
        } else if self.parse_keyword("SUBSCRIPTION") {
            let name = self.parse_identifier()?;
            let start = self.offset();
            let action = if self.parse_keyword("CONNECTION") {
                AlterSubscriptionAction::Connection(self.parse_constant()?)
            } else {
                self.skip_to_statement_end();
                AlterSubscriptionAction::Other(self.span_from(start))
            };
            return Ok(StatementKind::AlterSubscription(AlterSubscription {
                name,
                action,
            }));
        }

        self.pos = mark;
        self.parse_utility()
    }

    fn parse_role_options(&mut self) -> Result<Vec<RoleOption>, ParseError> {
        self.parse_keyword("WITH");
        let mut options = Vec::new();
        while !self.at_statement_end() {
            let start = self.offset();
            let Some(token) = self.peek().filter(|t| t.kind == TokenKind::Word) else {
                return Err(self.error_here());
            };
            let upper = token.text.to_ascii_uppercase();
            let (name, value) = match upper.as_str() {
                "PASSWORD" | "ENCRYPTED" | "UNENCRYPTED" => {
                    self.pos += 1;
                    if upper != "PASSWORD" {
                        self.expect_keyword("PASSWORD")?;
                    }
                    let name = canonical_option_name(&[upper.as_str(), "PASSWORD"]);
                    (name, OptionValue::Value(self.parse_constant()?))
                }
                "VALID" => {
                    self.pos += 1;
                    self.expect_keyword("UNTIL")?;
                    (
                        canonical_option_name(&["VALID", "UNTIL"]),
                        OptionValue::Value(self.parse_constant()?),
                    )
                }
                "CONNECTION" => {
                    self.pos += 1;
                    self.expect_keyword("LIMIT")?;
                    (
                        canonical_option_name(&["CONNECTION", "LIMIT"]),
                        OptionValue::Value(self.parse_constant()?),
                    )
                }
                "SYSID" => {
                    self.pos += 1;
                    ("sysid".to_string(), OptionValue::Value(self.parse_constant()?))
                }
                "IN" => {
                    self.pos += 1;
                    let group = self
                        .parse_one_of_keywords(&["ROLE", "GROUP"])
                        .ok_or_else(|| self.error_here())?;
                    let names = self.parse_comma_separated(Self::parse_any_identifier)?;
                    (
                        canonical_option_name(&["IN", group]),
                        OptionValue::Names(names),
                    )
                }
                "ROLE" | "ADMIN" | "USER" => {
                    self.pos += 1;
                    let names = self.parse_comma_separated(Self::parse_any_identifier)?;
                    (upper.to_ascii_lowercase(), OptionValue::Names(names))
                }
                flag if ROLE_FLAGS.contains(&flag) => {
                    self.pos += 1;
                    (flag.to_ascii_lowercase(), OptionValue::None)
                }
                _ => return Err(self.error_here()),
            };
            options.push(RoleOption {
                name,
                value,
                span: self.span_from(start),
            });
        }
        Ok(options)
    }

    fn parse_create_routine(&mut self, or_replace: bool) -> Result<CreateRoutine, ParseError> {
        let procedure = if self.parse_keyword("PROCEDURE") {
            true
        } else {
            self.expect_keyword("FUNCTION")?;
            false
        };
        let name = self.parse_object_name()?;

        self.expect_punct("(")?;
        let params = if self.peek_punct(")") {
            Vec::new()
        } else {
            self.parse_comma_separated(Self::parse_routine_param)?
        };
        self.expect_punct(")")?;

        let returns = if self.peek_keyword("RETURNS") && !self.peek_nth_keyword(1, "NULL") {
            self.pos += 1;
            Some(self.parse_return_type()?)
        } else {
            None
        };

        let mut options = Vec::new();
        let mut sql_body = None;
        while !self.at_statement_end() {
            let start = self.offset();
            if self.parse_keyword("AS") {
                options.push(RoutineOption::Body(
                    self.parse_comma_separated(Self::parse_constant)?,
                ));
            } else if self.parse_keyword("LANGUAGE") {
                options.push(RoutineOption::Language(self.parse_language_name()?));
            } else if let Some(keyword) = self.parse_one_of_keywords(&["COST", "ROWS"]) {
                options.push(RoutineOption::Numeric {
                    name: keyword.to_ascii_lowercase(),
                    value: self.parse_constant()?,
                });
            } else if self.peek_keyword("SET") {
                self.pos += 1;
                options.push(RoutineOption::Set(self.parse_set_variable(false)?));
            } else if self.parse_keyword("RETURN") {
                self.skip_to_statement_end();
                sql_body = Some(self.span_from(start));
            } else if self.parse_keywords(&["BEGIN", "ATOMIC"]) {
                self.skip_atomic_block()?;
                sql_body = Some(self.span_from(start));
            } else {
                options.push(RoutineOption::Flag(self.parse_routine_flag()?));
            }
        }

        Ok(CreateRoutine {
            procedure,
            or_replace,
            name,
            params,
            returns,
            options,
            sql_body,
        })
    }

    fn parse_return_type(&mut self) -> Result<TypeName, ParseError> {
        let start = self.offset();
        if self.parse_keyword("TABLE") {
            self.expect_punct("(")?;
            self.parse_comma_separated(|p| {
                p.parse_any_identifier()?;
                p.parse_type_name()
            })?;
            self.expect_punct(")")?;
            return Ok(TypeName {
                name: "table".to_string(),
                modifiers: Vec::new(),
                array_bounds: Vec::new(),
                span: self.span_from(start),
            });
        }
        let setof = self.parse_keyword("SETOF");
        let mut data_type = self.parse_type_name()?;
        if setof {
            data_type.name = format!("setof {}", data_type.name);
            data_type.span = self.span_from(start);
        }
        Ok(data_type)
    }

    fn parse_language_name(&mut self) -> Result<Ident, ParseError> {
        match self.peek() {
            Some(token) if token.kind == TokenKind::String => {
                self.pos += 1;
                Ok(Ident {
                    value: token.text.trim_matches('\'').to_string(),
                    quoted: true,
                    span: token.span,
                })
            }
            _ => self.parse_any_identifier(),
        }
    }

    fn parse_routine_flag(&mut self) -> Result<String, ParseError> {
        let start = self.offset();
        let consumed = if self.parse_one_of_keywords(ROUTINE_FLAGS).is_some()
            || self.parse_keywords(&["NOT", "LEAKPROOF"])
            || self.parse_keywords(&["CALLED", "ON", "NULL", "INPUT"])
            || self.parse_keywords(&["RETURNS", "NULL", "ON", "NULL", "INPUT"])
        {
            true
        } else if self.peek_keyword("EXTERNAL") || self.peek_keyword("SECURITY") {
            self.parse_keyword("EXTERNAL");
            self.expect_keyword("SECURITY")?;
            self.parse_one_of_keywords(&["INVOKER", "DEFINER"])
                .ok_or_else(|| self.error_here())?;
            true
        } else if self.parse_keyword("PARALLEL") || self.parse_keyword("SUPPORT") {
            self.parse_object_name()?;
            true
        } else if self.parse_keyword("RESET") {
            if !self.parse_keyword("ALL") {
                self.parse_object_name()?;
            }
            true
        } else if self.parse_keyword("TRANSFORM") {
            self.parse_comma_separated(|p| {
                p.expect_keyword("FOR")?;
                p.expect_keyword("TYPE")?;
                p.parse_type_name()
            })?;
            true
        } else {
            false
        };
        if !consumed {
            return Err(self.error_here());
        }
        let span = self.span_from(start);
        Ok(self.source[span.start..span.end].to_ascii_uppercase())
    }

    /// Skip a `BEGIN ATOMIC … END` body whose opening keywords were consumed.
    fn skip_atomic_block(&mut self) -> Result<(), ParseError> {
        let mut depth = 1usize;
        while depth > 0 {
            let Some(token) = self.next_token() else {
                return Err(self.error_here());
            };
            if token.is_keyword("CASE") || token.is_keyword("BEGIN") {
                depth += 1;
            } else if token.is_keyword("END") {
                depth -= 1;
            }
        }
        Ok(())
    }

    fn parse_routine_param(&mut self) -> Result<RoutineParam, ParseError> {
        let mode = self
            .parse_one_of_keywords(&["INOUT", "IN", "OUT", "VARIADIC"])
            .map(str::to_string);
        let name = if self.routine_param_has_name() {
            Some(self.parse_any_identifier()?)
        } else {
            None
        };
        let data_type = self.parse_type_name()?;
        let default = if self.parse_keyword("DEFAULT") || self.parse_punct("=") {
            Some(self.parse_expr()?)
        } else {
            None
        };
        Ok(RoutineParam {
            mode,
            name,
            data_type,
            default,
        })
    }

    /// A parameter is named when its first word is followed by another word
    /// that starts the type (`a integer`, `response "mytable"`).
    fn routine_param_has_name(&self) -> bool {
        let Some(first) = self.peek() else {
            return false;
        };
        match first.kind {
            TokenKind::Word if is_multiword_type_start(first.text) => false,
            TokenKind::Word | TokenKind::QuotedIdent => self.peek_nth(1).is_some_and(|next| {
                matches!(next.kind, TokenKind::Word | TokenKind::QuotedIdent)
                    && !next.is_keyword("DEFAULT")
            }),
            _ => false,
        }
    }

    fn parse_create_subscription(&mut self) -> Result<CreateSubscription, ParseError> {
        let name = self.parse_identifier()?;
        self.expect_keyword("CONNECTION")?;
        let connection = self.parse_constant()?;
        self.expect_keyword("PUBLICATION")?;
        let publications = self.parse_comma_separated(Self::parse_identifier)?;
        let with = if self.parse_keyword("WITH") {
            self.parse_generic_options()?
        } else {
            Vec::new()
        };
        Ok(CreateSubscription {
            name,
            connection,
            publications,
            with,
        })
    }

    fn parse_user_mapping(&mut self, create: bool) -> Result<UserMapping, ParseError> {
        self.expect_keyword("USER")?;
        self.expect_keyword("MAPPING")?;
        if create {
            self.parse_keywords(&["IF", "NOT", "EXISTS"]);
        }
        self.expect_keyword("FOR")?;
        let user = self.parse_any_identifier()?;
        self.expect_keyword("SERVER")?;
        let server = self.parse_identifier()?;
        let options = if self.parse_keyword("OPTIONS") {
            self.parse_generic_options()?
        } else {
            Vec::new()
        };
        Ok(UserMapping {
            create,
            user,
            server,
            options,
        })
    }

    /// `( [ADD|SET|DROP] name [value] [, …] )`, also accepting `name = value`.
    fn parse_generic_options(&mut self) -> Result<Vec<GenericOption>, ParseError> {
        self.expect_punct("(")?;
        let options = self.parse_comma_separated(|p| {
            let action = if ["ADD", "SET", "DROP"].iter().any(|kw| p.peek_keyword(kw))
                && p.peek_nth(1).is_some_and(|t| {
                    matches!(t.kind, TokenKind::Word | TokenKind::QuotedIdent)
                }) {
                p.next_token().map(|t| t.text.to_ascii_uppercase())
            } else {
                None
            };
            let name = p.parse_any_identifier()?;
            p.parse_punct("=");
            let value = if p.peek_punct(",") || p.peek_punct(")") {
                None
            } else {
                Some(p.parse_option_value()?)
            };
            Ok(GenericOption {
                action,
                name,
                value,
            })
        })?;
        self.expect_punct(")")?;
        Ok(options)
    }

    /// A constant, or a bare word kept as a column-like reference (`on`, `off`).
    fn parse_option_value(&mut self) -> Result<Expr, ParseError> {
        match self.peek() {
            Some(t)
                if matches!(t.kind, TokenKind::Word | TokenKind::QuotedIdent)
                    && !["TRUE", "FALSE", "NULL"].iter().any(|kw| t.is_keyword(kw)) =>
            {
                let ident = self.parse_any_identifier()?;
                let span = ident.span;
                Ok(Expr::new(ExprKind::Column(vec![ident]), span))
            }
            _ => self.parse_constant(),
        }
    }

    // -----------------------------------------------------------------------
    // Procedural, cursor and session statements
    // -----------------------------------------------------------------------

    fn parse_do(&mut self) -> Result<StatementKind, ParseError> {
        self.expect_keyword("DO")?;
        let mut language = None;
        if self.parse_keyword("LANGUAGE") {
            language = Some(self.parse_language_name()?);
        }
        let body = self.parse_constant()?;
        if self.parse_keyword("LANGUAGE") {
            language = Some(self.parse_language_name()?);
        }
        Ok(StatementKind::Do(DoBlock { body, language }))
    }

    fn parse_declare_cursor(&mut self) -> Result<StatementKind, ParseError> {
        self.expect_keyword("DECLARE")?;
        let name = self.parse_identifier()?;
        while self
            .parse_one_of_keywords(&["BINARY", "ASENSITIVE", "INSENSITIVE", "NO", "SCROLL"])
            .is_some()
        {}
        self.expect_keyword("CURSOR")?;
        if self.parse_one_of_keywords(&["WITH", "WITHOUT"]).is_some() {
            self.expect_keyword("HOLD")?;
        }
        self.expect_keyword("FOR")?;
        let query = self.parse_query()?;
        Ok(StatementKind::DeclareCursor(Box::new(DeclareCursor {
            name,
            query,
        })))
    }

    fn parse_fetch(&mut self) -> Result<StatementKind, ParseError> {
        let is_move = self.parse_keyword("MOVE");
        if !is_move {
            self.expect_keyword("FETCH")?;
        }

        let mut direction = None;
        let mut count = None;
        if let Some(word) = self.parse_one_of_keywords(&["NEXT", "PRIOR", "FIRST", "LAST", "ALL"]) {
            direction = Some(word.to_string());
        } else if let Some(word) = self.parse_one_of_keywords(&["ABSOLUTE", "RELATIVE"]) {
            direction = Some(word.to_string());
            count = Some(self.parse_constant()?);
        } else if let Some(word) = self.parse_one_of_keywords(&["FORWARD", "BACKWARD"]) {
            direction = Some(if self.parse_keyword("ALL") {
                format!("{word} ALL")
            } else {
                word.to_string()
            });
            if self.peek_fetch_count() {
                count = Some(self.parse_constant()?);
            }
        } else if self.peek_fetch_count() {
            count = Some(self.parse_constant()?);
        }

        self.parse_one_of_keywords(&["FROM", "IN"]);
        let cursor = self.parse_identifier()?;
        Ok(StatementKind::Fetch(Fetch {
            is_move,
            direction,
            count,
            cursor,
        }))
    }

    fn peek_fetch_count(&self) -> bool {
        match self.peek() {
            Some(t) if matches!(t.kind, TokenKind::Number | TokenKind::Param) => true,
            Some(t) if t.is_punct("-") || t.is_punct("+") => true,
            _ => false,
        }
    }

    fn parse_close(&mut self) -> Result<StatementKind, ParseError> {
        self.expect_keyword("CLOSE")?;
        if self.parse_keyword("ALL") {
            return Ok(StatementKind::Close(None));
        }
        Ok(StatementKind::Close(Some(self.parse_identifier()?)))
    }

    fn parse_set_statement(&mut self) -> Result<StatementKind, ParseError> {
        let mark = self.pos;
        self.expect_keyword("SET")?;
        let opaque = self.peek_keyword("TRANSACTION")
            || self.peek_keyword("CONSTRAINTS")
            || (self.peek_keyword("SESSION") && self.peek_nth_keyword(1, "CHARACTERISTICS"));
        if opaque {
            self.pos = mark;
            return self.parse_utility();
        }
        let local = self.parse_keyword("LOCAL");
        if !local && !(self.peek_keyword("SESSION") && self.peek_nth_keyword(1, "AUTHORIZATION")) {
            self.parse_keyword("SESSION");
        }
        Ok(StatementKind::Set(self.parse_set_variable(local)?))
    }

    /// Parse `name {TO|=} value[, …]` and the keyword forms of `SET`.
    fn parse_set_variable(&mut self, local: bool) -> Result<SetVariable, ParseError> {
        let (name, needs_assignment) = if self.parse_keywords(&["TIME", "ZONE"]) {
            ("timezone".to_string(), false)
        } else if self.parse_keywords(&["SESSION", "AUTHORIZATION"]) {
            ("session_authorization".to_string(), false)
        } else if self.parse_keyword("ROLE") {
            ("role".to_string(), false)
        } else if self.parse_keyword("NAMES") {
            ("client_encoding".to_string(), false)
        } else if self.parse_keyword("SCHEMA") {
            ("search_path".to_string(), false)
        } else {
            let name = self.parse_object_name()?;
            (name.to_string().to_ascii_lowercase(), true)
        };

        if needs_assignment {
            if self.parse_keywords(&["FROM", "CURRENT"]) {
                return Ok(SetVariable {
                    local,
                    name,
                    values: Vec::new(),
                });
            }
            if !self.parse_keyword("TO") {
                self.expect_punct("=")?;
            }
        }

        let values = if self.parse_keyword("DEFAULT") {
            Vec::new()
        } else {
            self.parse_comma_separated(Self::parse_set_value)?
        };
        Ok(SetVariable {
            local,
            name,
            values,
        })
    }

    fn parse_set_value(&mut self) -> Result<Expr, ParseError> {
        match self.peek() {
            Some(t) if t.is_keyword("INTERVAL") => self.parse_expr(),
            _ => self.parse_option_value(),
        }
    }

    fn parse_explain(&mut self) -> Result<StatementKind, ParseError> {
        self.expect_keyword("EXPLAIN")?;
        if self.peek_punct("(") {
            self.skip_parenthesized()?;
        } else {
            while self
                .parse_one_of_keywords(&["ANALYZE", "ANALYSE", "VERBOSE"])
                .is_some()
            {}
        }
        Ok(StatementKind::Explain(Box::new(self.parse_statement()?)))
    }

    fn parse_prepare(&mut self) -> Result<StatementKind, ParseError> {
        self.expect_keyword("PREPARE")?;
        self.parse_identifier()?;
        if self.peek_punct("(") {
            self.expect_punct("(")?;
            self.parse_comma_separated(Self::parse_type_name)?;
            self.expect_punct(")")?;
        }
        self.expect_keyword("AS")?;
        Ok(StatementKind::Prepare(Box::new(self.parse_statement()?)))
    }

    fn parse_copy(&mut self) -> Result<StatementKind, ParseError> {
        self.expect_keyword("COPY")?;
        let query = if self.parse_punct("(") {
            let statement = self.parse_statement()?;
            self.expect_punct(")")?;
            Some(Box::new(statement))
        } else {
            None
        };
        // Targets and COPY options are plain strings, never constants.
        self.skip_to_statement_end();
        Ok(StatementKind::Copy(query))
    }
}

/// True for the words that can open a role option.
fn is_role_option_keyword(word: &str) -> bool {
    let upper = word.to_ascii_uppercase();
    ROLE_FLAGS.contains(&upper.as_str())
        || matches!(
            upper.as_str(),
            "PASSWORD"
                | "ENCRYPTED"
                | "UNENCRYPTED"
                | "VALID"
                | "CONNECTION"
                | "SYSID"
                | "IN"
                | "ROLE"
                | "ADMIN"
                | "USER"
        )
}
