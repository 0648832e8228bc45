//! Pre-order traversal of a parsed statement that records every literal
//! location with its site tag, every pre-existing placeholder, and every
//! construct the normalizer has no rules for.

use serde::Serialize;
use std::ops::Range;
use tracing::debug;

use super::options::NormalizeOptions;
use super::rules::{classify, Disposition, LiteralSite};
use crate::parser::ast::{
    AlterSubscriptionAction, Assignment, ConflictAction, Distinct, Expr, ExprKind, FrameBound,
    Function, GenericOption, JoinConstraint, LiteralKind, MergeAction, OptionValue, OrderByExpr,
    Query, RoutineOption, Select, SelectItem, SetExpr, SetVariable, Statement, StatementKind,
    TableRef, TypeName, WindowRef, WindowSpec, With,
};
use crate::parser::lexer::{Span, Token, TokenKind};

/// Where a candidate takes its placeholder index from, instead of a fresh one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderRef {
    /// The index assigned to another candidate of the same statement.
    Candidate(usize),
    /// A placeholder already present in the source.
    Existing(u32),
}

/// A literal location found by the walker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Byte range of the literal, sign or prefix included.
    pub span: Span,
    /// Literal kind.
    pub kind: LiteralKind,
    /// Syntactic position.
    pub site: LiteralSite,
    /// Result of [`classify`].
    pub disposition: Disposition,
    /// Index sharing set up by `GROUP BY` alignment.
    pub reuse: Option<PlaceholderRef>,
}

/// A `$n` placeholder already present in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExistingParam {
    /// Byte range of the placeholder.
    pub span: Span,
    /// Its index.
    pub index: u32,
}

/// A construct left unchanged because no literal rules apply to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnsupportedConstruct {
    /// Short description, e.g. `CREATE TABLE`.
    pub construct: String,
    /// Byte range of the construct.
    pub span: Span,
}

/// Everything the walker collected for one statement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LiteralScan {
    /// Literal locations in pre-order.
    pub candidates: Vec<Candidate>,
    /// Pre-existing placeholders in pre-order.
    pub params: Vec<ExistingParam>,
    /// Constructs without literal rules.
    pub unsupported: Vec<UnsupportedConstruct>,
}

/// Walk `statement` and collect its literal candidates.
///
/// `tokens` is the token stream the statement was parsed from; it is used to
/// compare the shapes of `GROUP BY` elements and `SELECT` targets.
pub fn scan_statement(
    statement: &Statement,
    tokens: &[Token<'_>],
    options: &NormalizeOptions,
) -> LiteralScan {
    let mut walker = Walker {
        options,
        tokens,
        scan: LiteralScan::default(),
    };
    walker.visit_statement(statement);
    walker.scan
}

/// Candidates and placeholders produced while visiting one expression.
struct Tracked {
    span: Span,
    candidates: Range<usize>,
    params: Range<usize>,
}

#[derive(Debug, Clone, Copy)]
enum Slot {
    Candidate(usize),
    Param(u32),
}

struct Walker<'w, 'a> {
    options: &'w NormalizeOptions,
    tokens: &'w [Token<'a>],
    scan: LiteralScan,
}

impl Walker<'_, '_> {
    fn push_candidate(&mut self, span: Span, kind: LiteralKind, site: LiteralSite) {
        let disposition = classify(site, kind, self.options);
        self.scan.candidates.push(Candidate {
            span,
            kind,
            site,
            disposition,
            reuse: None,
        });
    }

    fn unsupported(&mut self, construct: impl Into<String>, span: Span) {
        let construct = construct.into();
        debug!(
            construct = %construct,
            start = span.start,
            end = span.end,
            "no literal rules for construct, leaving it unchanged"
        );
        self.scan
            .unsupported
            .push(UnsupportedConstruct { construct, span });
    }

    // -----------------------------------------------------------------------
    // Statements
    // -----------------------------------------------------------------------

    fn visit_statement(&mut self, statement: &Statement) {
        match &statement.kind {
            StatementKind::Query(query) => self.visit_query(query),
            StatementKind::Insert(insert) => {
                self.visit_with(insert.with.as_ref());
                if let Some(source) = &insert.source {
                    self.visit_query(source);
                }
                if let Some(on_conflict) = &insert.on_conflict {
                    self.visit_exprs(&on_conflict.target);
                    self.visit_opt_expr(on_conflict.target_where.as_ref());
                    if let ConflictAction::Update {
                        assignments,
                        selection,
                    } = &on_conflict.action
                    {
                        self.visit_assignments(assignments);
                        self.visit_opt_expr(selection.as_ref());
                    }
                }
                self.visit_select_items(&insert.returning);
            }
            StatementKind::Update(update) => {
                self.visit_with(update.with.as_ref());
                self.visit_assignments(&update.assignments);
                for table in &update.from {
                    self.visit_table_ref(table);
                }
                self.visit_opt_expr(update.selection.as_ref());
                self.visit_select_items(&update.returning);
            }
            StatementKind::Delete(delete) => {
                self.visit_with(delete.with.as_ref());
                for table in &delete.using {
                    self.visit_table_ref(table);
                }
                self.visit_opt_expr(delete.selection.as_ref());
                self.visit_select_items(&delete.returning);
            }
            StatementKind::Merge(merge) => {
                self.visit_with(merge.with.as_ref());
                self.visit_table_ref(&merge.source);
                self.visit_expr(&merge.on);
                for clause in &merge.clauses {
                    self.visit_opt_expr(clause.condition.as_ref());
                    match &clause.action {
                        MergeAction::Update(assignments) => self.visit_assignments(assignments),
                        MergeAction::Insert { values, .. } => self.visit_exprs(values),
                        MergeAction::Delete | MergeAction::Nothing => {}
                    }
                }
                self.visit_select_items(&merge.returning);
            }
            StatementKind::Role(role) => {
                for option in &role.options {
                    if let OptionValue::Value(value) = &option.value {
                        self.visit_site_literal(value, LiteralSite::OptionArgument);
                    }
                }
            }
            StatementKind::CreateRoutine(routine) => {
                for param in &routine.params {
                    // Defaults belong to the routine's signature, not to a query.
                    self.visit_type_name(&param.data_type);
                }
                if let Some(returns) = &routine.returns {
                    self.visit_type_name(returns);
                }
                for option in &routine.options {
                    match option {
                        RoutineOption::Body(parts) => {
                            for part in parts {
                                self.visit_site_literal(part, LiteralSite::RoutineBody);
                            }
                        }
                        RoutineOption::Numeric { value, .. } => {
                            self.visit_site_literal(value, LiteralSite::OptionArgument);
                        }
                        RoutineOption::Set(set) => self.visit_set_variable(set),
                        RoutineOption::Language(_) | RoutineOption::Flag(_) => {}
                    }
                }
                if let Some(body) = routine.sql_body {
                    self.unsupported("SQL-standard routine body", body);
                }
            }
            StatementKind::Do(block) => {
                self.visit_site_literal(&block.body, LiteralSite::RoutineBody);
            }
            StatementKind::CreateSubscription(subscription) => {
                self.visit_site_literal(&subscription.connection, LiteralSite::OptionArgument);
                self.visit_generic_options(&subscription.with, LiteralSite::StorageParameter);
            }
            StatementKind::AlterSubscription(alter) => {
                if let AlterSubscriptionAction::Connection(connection) = &alter.action {
                    self.visit_site_literal(connection, LiteralSite::OptionArgument);
                }
            }
            StatementKind::UserMapping(mapping) => {
                self.visit_generic_options(&mapping.options, LiteralSite::OptionArgument);
            }
            StatementKind::DeclareCursor(cursor) => self.visit_query(&cursor.query),
            StatementKind::Fetch(fetch) => {
                if let Some(count) = &fetch.count {
                    self.visit_site_literal(count, LiteralSite::FetchCount);
                }
            }
            StatementKind::Close(_) => {}
            StatementKind::Set(set) => self.visit_set_variable(set),
            StatementKind::Explain(inner) | StatementKind::Prepare(inner) => {
                self.visit_statement(inner);
            }
            StatementKind::Call(call) => self.visit_expr(call),
            StatementKind::Copy(query) => {
                if let Some(inner) = query {
                    self.visit_statement(inner);
                }
            }
            StatementKind::Utility(utility) => {
                self.unsupported(utility.command.clone(), utility.span);
            }
        }
    }

    fn visit_with(&mut self, with: Option<&With>) {
        for cte in with.iter().flat_map(|w| &w.ctes) {
            self.visit_statement(&cte.body);
        }
    }

    fn visit_assignments(&mut self, assignments: &[Assignment]) {
        for assignment in assignments {
            self.visit_exprs(&assignment.targets);
            self.visit_expr(&assignment.value);
        }
    }

    fn visit_set_variable(&mut self, set: &SetVariable) {
        self.visit_exprs(&set.values);
    }

    fn visit_generic_options(&mut self, options: &[GenericOption], site: LiteralSite) {
        for option in options {
            if let Some(value) = &option.value {
                self.visit_site_literal(value, site);
            }
        }
    }

    /// A literal at a dedicated site; anything else is walked as a value.
    fn visit_site_literal(&mut self, expr: &Expr, site: LiteralSite) {
        match &expr.kind {
            ExprKind::Literal(kind) => self.push_candidate(expr.span, *kind, site),
            ExprKind::Unary { operand, .. } => self.visit_site_literal(operand, site),
            _ => self.visit_expr(expr),
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    fn visit_query(&mut self, query: &Query) {
        self.visit_with(query.with.as_ref());
        self.visit_set_expr(&query.body);
        self.visit_order_by(&query.order_by, true);
        self.visit_opt_expr(query.limit.as_ref());
        self.visit_opt_expr(query.offset.as_ref());
    }

    fn visit_set_expr(&mut self, body: &SetExpr) {
        match body {
            SetExpr::Select(select) => self.visit_select(select),
            SetExpr::Values(values) => {
                for row in &values.rows {
                    self.visit_exprs(row);
                }
            }
            SetExpr::Table(_) => {}
            SetExpr::Query(query) => self.visit_query(query),
            SetExpr::SetOperation { left, right, .. } => {
                self.visit_set_expr(left);
                self.visit_set_expr(right);
            }
        }
    }

    fn visit_select(&mut self, select: &Select) {
        if let Some(Distinct::On(exprs)) = &select.distinct {
            self.visit_exprs(exprs);
        }

        let mut targets = Vec::with_capacity(select.projection.len());
        for item in &select.projection {
            let before = self.mark();
            self.visit_expr(&item.expr);
            targets.push(self.tracked(item.expr.span, before));
        }

        for table in &select.from {
            self.visit_table_ref(table);
        }
        self.visit_opt_expr(select.selection.as_ref());

        let mut groups = Vec::with_capacity(select.group_by.len());
        for element in &select.group_by {
            let before = self.mark();
            if let Some((span, kind)) = direct_literal(element) {
                self.push_candidate(span, kind, LiteralSite::GroupByItem);
                if kind == LiteralKind::Integer {
                    continue;
                }
            } else {
                self.visit_expr(element);
            }
            groups.push(self.tracked(element.span, before));
        }
        if self.options.match_group_by_targets {
            self.align_group_by(&targets, &groups);
        }

        self.visit_opt_expr(select.having.as_ref());
        for window in &select.windows {
            self.visit_window_spec(&window.spec);
        }
    }

    /// Statement-level `ORDER BY` (`ordinals == true`) treats direct integers
    /// as column positions; aggregate and window orderings do not.
    fn visit_order_by(&mut self, items: &[OrderByExpr], ordinals: bool) {
        for item in items {
            match direct_literal(&item.expr) {
                Some((span, kind)) if ordinals => {
                    self.push_candidate(span, kind, LiteralSite::OrderByItem);
                }
                _ => self.visit_expr(&item.expr),
            }
        }
    }

    fn visit_select_items(&mut self, items: &[SelectItem]) {
        for item in items {
            self.visit_expr(&item.expr);
        }
    }

    fn visit_table_ref(&mut self, table: &TableRef) {
        match table {
            TableRef::Table { sample, .. } => {
                if let Some(sample) = sample {
                    self.visit_exprs(&sample.args);
                    self.visit_opt_expr(sample.repeatable.as_ref());
                }
            }
            TableRef::Derived { subquery, .. } => self.visit_query(subquery),
            TableRef::Function { call, .. } => self.visit_expr(call),
            TableRef::Join(join) => {
                self.visit_table_ref(&join.left);
                self.visit_table_ref(&join.right);
                if let JoinConstraint::On(condition) = &join.constraint {
                    self.visit_expr(condition);
                }
            }
            TableRef::Nested(inner) => self.visit_table_ref(inner),
        }
    }

    fn visit_window_spec(&mut self, spec: &WindowSpec) {
        self.visit_exprs(&spec.partition_by);
        self.visit_order_by(&spec.order_by, false);
        if let Some(frame) = &spec.frame {
            for bound in std::iter::once(&frame.start).chain(frame.end.as_ref()) {
                if let FrameBound::Offset(offset) = bound {
                    self.visit_expr(offset);
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Expressions
    // -----------------------------------------------------------------------

    fn visit_exprs(&mut self, exprs: &[Expr]) {
        for expr in exprs {
            self.visit_expr(expr);
        }
    }

    fn visit_opt_expr(&mut self, expr: Option<&Expr>) {
        if let Some(expr) = expr {
            self.visit_expr(expr);
        }
    }

    /// Left-deep operator chains (`a + b + c …`) are walked along their
    /// spine so long generated expressions do not grow the call stack.
    fn visit_operator_chain(&mut self, expr: &Expr) {
        let mut rights = Vec::new();
        let mut node = expr;
        while let ExprKind::Binary { left, right, .. } = &node.kind {
            rights.push(right.as_ref());
            node = left;
        }
        self.visit_expr(node);
        for right in rights.into_iter().rev() {
            self.visit_expr(right);
        }
    }

    fn visit_expr(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Literal(kind) => self.push_candidate(expr.span, *kind, LiteralSite::Value),
            ExprKind::Param(index) => self.scan.params.push(ExistingParam {
                span: expr.span,
                index: *index,
            }),
            ExprKind::Column(_)
            | ExprKind::Wildcard(_)
            | ExprKind::Default
            | ExprKind::CurrentOf(_) => {}
            ExprKind::ValueFunction { precision, .. } => {
                if let Some(precision) = precision {
                    self.visit_type_modifier(precision);
                }
            }
            ExprKind::Unary { operand, .. } => self.visit_expr(operand),
            ExprKind::Binary { .. } => self.visit_operator_chain(expr),
            ExprKind::BoolOp { operands, .. } => self.visit_exprs(operands),
            ExprKind::Is { expr, other, .. } => {
                self.visit_expr(expr);
                self.visit_opt_expr(other.as_deref());
            }
            ExprKind::Between {
                expr, low, high, ..
            } => {
                self.visit_expr(expr);
                self.visit_expr(low);
                self.visit_expr(high);
            }
            ExprKind::InList { expr, list, .. } => {
                self.visit_expr(expr);
                self.visit_exprs(list);
            }
            ExprKind::InSubquery { expr, subquery, .. } => {
                self.visit_expr(expr);
                self.visit_query(subquery);
            }
            ExprKind::Like {
                expr,
                pattern,
                escape,
                ..
            } => {
                self.visit_expr(expr);
                self.visit_expr(pattern);
                self.visit_opt_expr(escape.as_deref());
            }
            ExprKind::Quantified { operand, .. } => self.visit_expr(operand),
            ExprKind::Function(function) => self.visit_function(function),
            ExprKind::Cast { expr, data_type } => {
                self.visit_expr(expr);
                self.visit_type_name(data_type);
            }
            ExprKind::TypedString { data_type, value } => {
                self.visit_type_name(data_type);
                self.visit_expr(value);
            }
            ExprKind::Case {
                operand,
                branches,
                else_result,
            } => {
                self.visit_opt_expr(operand.as_deref());
                for (condition, result) in branches {
                    self.visit_expr(condition);
                    self.visit_expr(result);
                }
                self.visit_opt_expr(else_result.as_deref());
            }
            ExprKind::Exists(query) | ExprKind::Subquery(query) | ExprKind::ArraySubquery(query) => {
                self.visit_query(query);
            }
            ExprKind::Array(items) | ExprKind::Row(items) => self.visit_exprs(items),
            ExprKind::Nested(inner) => self.visit_expr(inner),
            ExprKind::FieldAccess { expr, .. } => self.visit_expr(expr),
            ExprKind::Subscript { expr, lower, upper } => {
                self.visit_expr(expr);
                self.visit_opt_expr(lower.as_deref());
                self.visit_opt_expr(upper.as_deref());
            }
            ExprKind::AtTimeZone { expr, zone } => {
                self.visit_expr(expr);
                self.visit_opt_expr(zone.as_deref());
            }
            ExprKind::Collate { expr, .. } => self.visit_expr(expr),
        }
    }

    fn visit_function(&mut self, function: &Function) {
        for arg in &function.args {
            self.visit_expr(&arg.value);
        }
        self.visit_order_by(&function.order_by, false);
        self.visit_order_by(&function.within_group, false);
        self.visit_opt_expr(function.filter.as_deref());
        if let Some(WindowRef::Spec(spec)) = &function.over {
            self.visit_window_spec(spec);
        }
    }

    fn visit_type_name(&mut self, data_type: &TypeName) {
        for modifier in &data_type.modifiers {
            self.visit_type_modifier(modifier);
        }
        for bound in data_type.array_bounds.iter().flatten() {
            self.visit_type_modifier(bound);
        }
    }

    fn visit_type_modifier(&mut self, expr: &Expr) {
        match expr.literal_kind() {
            Some(kind) => self.push_candidate(expr.span, kind, LiteralSite::TypeModifier),
            None => self.visit_expr(expr),
        }
    }

    // -----------------------------------------------------------------------
    // GROUP BY alignment
    // -----------------------------------------------------------------------

    fn mark(&self) -> (usize, usize) {
        (self.scan.candidates.len(), self.scan.params.len())
    }

    fn tracked(&self, span: Span, (candidates, params): (usize, usize)) -> Tracked {
        Tracked {
            span,
            candidates: candidates..self.scan.candidates.len(),
            params: params..self.scan.params.len(),
        }
    }

    /// Replaceable literals and existing placeholders of a tracked expression,
    /// in source order.
    fn slots(&self, tracked: &Tracked) -> Vec<(Span, Slot)> {
        let mut slots: Vec<(Span, Slot)> = tracked
            .candidates
            .clone()
            .filter(|&idx| self.scan.candidates[idx].disposition == Disposition::Replace)
            .map(|idx| (self.scan.candidates[idx].span, Slot::Candidate(idx)))
            .collect();
        slots.extend(tracked.params.clone().map(|idx| {
            let param = self.scan.params[idx];
            (param.span, Slot::Param(param.index))
        }));
        slots.sort_by_key(|(span, _)| span.start);
        slots
    }

    /// Token sequence of `span` with every slot masked as `?` and unquoted
    /// words lower-cased.
    fn fingerprint(&self, span: Span, slots: &[(Span, Slot)]) -> Vec<String> {
        let first = self.tokens.partition_point(|t| t.span.start < span.start);
        let mut shape = Vec::new();
        for token in self.tokens[first..]
            .iter()
            .take_while(|t| t.span.end <= span.end)
        {
            match slots.iter().find(|(slot, _)| slot.contains(token.span)) {
                Some((slot, _)) => {
                    if slot.start == token.span.start {
                        shape.push("?".to_string());
                    }
                }
                None if token.kind == TokenKind::Word => shape.push(token.text.to_ascii_lowercase()),
                None => shape.push(token.text.to_string()),
            }
        }
        shape
    }

    fn align_group_by(&mut self, targets: &[Tracked], groups: &[Tracked]) {
        let shapes: Vec<(Vec<String>, Vec<(Span, Slot)>)> = targets
            .iter()
            .map(|target| {
                let slots = self.slots(target);
                (self.fingerprint(target.span, &slots), slots)
            })
            .collect();
        let mut matched = vec![false; targets.len()];

        for group in groups {
            let slots = self.slots(group);
            if slots.is_empty() {
                continue;
            }
            let shape = self.fingerprint(group.span, &slots);
            let Some(target) = shapes.iter().enumerate().position(|(idx, (target_shape, target_slots))| {
                !matched[idx] && *target_shape == shape && target_slots.len() == slots.len()
            }) else {
                continue;
            };
            matched[target] = true;

            for ((_, group_slot), (_, target_slot)) in slots.iter().zip(&shapes[target].1) {
                if let Slot::Candidate(idx) = *group_slot {
                    self.scan.candidates[idx].reuse = Some(match *target_slot {
                        Slot::Candidate(source) => PlaceholderRef::Candidate(source),
                        Slot::Param(index) => PlaceholderRef::Existing(index),
                    });
                }
            }
            debug!(
                group_start = group.span.start,
                target = target,
                "group by element reuses select target placeholders"
            );
        }
    }
}

/// The literal written directly in a `GROUP BY`/`ORDER BY` slot, looking
/// through parentheses.
fn direct_literal(expr: &Expr) -> Option<(Span, LiteralKind)> {
    match &expr.kind {
        ExprKind::Literal(kind) => Some((expr.span, *kind)),
        ExprKind::Nested(inner) => direct_literal(inner),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_script;

    fn scan(sql: &str, options: &NormalizeOptions) -> LiteralScan {
        let script = parse_script(sql).unwrap();
        scan_statement(&script.statements[0], &script.tokens, options)
    }

    fn sites(sql: &str) -> Vec<(String, LiteralSite, Disposition)> {
        scan(sql, &NormalizeOptions::default())
            .candidates
            .into_iter()
            .map(|c| (sql[c.span.start..c.span.end].to_string(), c.site, c.disposition))
            .collect()
    }

    #[test]
    fn ordinals_are_kept_and_other_literals_replaced() {
        let found = sites("SELECT a FROM t WHERE c = 'foo' GROUP BY 1, 'bar' ORDER BY (2), 'cafe'");
        assert_eq!(
            found,
            vec![
                ("'foo'".to_string(), LiteralSite::Value, Disposition::Replace),
                ("1".to_string(), LiteralSite::GroupByItem, Disposition::Keep),
                ("'bar'".to_string(), LiteralSite::GroupByItem, Disposition::Replace),
                ("2".to_string(), LiteralSite::OrderByItem, Disposition::Keep),
                ("'cafe'".to_string(), LiteralSite::OrderByItem, Disposition::Replace),
            ]
        );
    }

    #[test]
    fn aggregate_order_by_is_not_an_ordinal() {
        let found = sites("SELECT string_agg(x, ',' ORDER BY 1) FROM t");
        assert!(found
            .iter()
            .all(|(_, _, disposition)| *disposition == Disposition::Replace));
    }

    #[test]
    fn type_modifiers_and_precision_are_kept() {
        let found = sites("SELECT CAST('abc' AS varchar(50)), x::numeric(10, 2), CURRENT_TIMESTAMP(3)");
        let kept: Vec<&str> = found
            .iter()
            .filter(|(_, _, d)| *d == Disposition::Keep)
            .map(|(text, _, _)| text.as_str())
            .collect();
        assert_eq!(kept, vec!["50", "10", "2", "3"]);
    }

    #[test]
    fn existing_placeholders_are_recorded_not_replaced() {
        let found = scan("SELECT $1, 1", &NormalizeOptions::default());
        assert_eq!(found.params.len(), 1);
        assert_eq!(found.params[0].index, 1);
        assert_eq!(found.candidates.len(), 1);
    }

    #[test]
    fn utility_statements_are_reported_unsupported() {
        let found = scan("CREATE TABLE t (a int DEFAULT 5)", &NormalizeOptions::default());
        assert!(found.candidates.is_empty());
        assert_eq!(found.unsupported.len(), 1);
        assert_eq!(found.unsupported[0].construct, "CREATE TABLE");
    }

    #[test]
    fn role_option_values_use_the_option_site() {
        let found = sites("CREATE ROLE r PASSWORD 'x' CONNECTION LIMIT 3");
        assert_eq!(
            found,
            vec![
                ("'x'".to_string(), LiteralSite::OptionArgument, Disposition::Replace),
                ("3".to_string(), LiteralSite::OptionArgument, Disposition::Keep),
            ]
        );
    }

    #[test]
    fn group_by_elements_claim_the_first_unmatched_target_of_the_same_shape() {
        let options = NormalizeOptions {
            match_group_by_targets: true,
            ..NormalizeOptions::default()
        };
        let sql = "SELECT date_trunc('day', ts), 'x' FROM t GROUP BY DATE_TRUNC('week', ts), date_trunc('day', ts), 'y'";
        let found = scan(sql, &options);
        let reuse: Vec<Option<PlaceholderRef>> = found.candidates.iter().map(|c| c.reuse).collect();
        assert_eq!(
            reuse,
            vec![
                None,
                None,
                Some(PlaceholderRef::Candidate(0)),
                None,
                Some(PlaceholderRef::Candidate(1)),
            ]
        );
    }

    #[test]
    fn group_by_alignment_is_off_by_default() {
        let found = scan(
            "SELECT lower('A') FROM t GROUP BY lower('A')",
            &NormalizeOptions::default(),
        );
        assert!(found.candidates.iter().all(|c| c.reuse.is_none()));
    }
}
