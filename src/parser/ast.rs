//! Span-carrying syntax tree for the statements the normalizer understands.
//!
//! Every node that can hold a literal owns the byte [`Span`] of its source
//! text. Nodes are produced by the grammar and never mutated afterwards.

pub use super::lexer::Span;

/// An identifier as written, quoted or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    /// Identifier text without surrounding quotes.
    pub value: String,
    /// `true` when written as a double-quoted identifier.
    pub quoted: bool,
    /// Source span, quotes included.
    pub span: Span,
}

/// A possibly schema-qualified object name (`schema.table`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectName {
    /// Name components, outermost first.
    pub parts: Vec<Ident>,
    /// Source span of the whole name.
    pub span: Span,
}

impl std::fmt::Display for ObjectName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<&str> = self.parts.iter().map(|p| p.value.as_str()).collect();
        write!(f, "{}", parts.join("."))
    }
}

/// A parsed top-level statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// Statement payload.
    pub kind: StatementKind,
    /// Span from the first token to the last, terminator excluded.
    pub span: Span,
}

/// The statement shapes the grammar models.
#[derive(Debug, Clone, PartialEq)]
pub enum StatementKind {
    /// `SELECT`, `VALUES`, `TABLE` and set operations, optionally with `WITH`.
    Query(Box<Query>),
    /// `INSERT INTO …`.
    Insert(Box<Insert>),
    /// `UPDATE … SET …`.
    Update(Box<Update>),
    /// `DELETE FROM …`.
    Delete(Box<Delete>),
    /// `MERGE INTO … USING …`.
    Merge(Box<Merge>),
    /// `CREATE ROLE|USER|GROUP` and `ALTER ROLE|USER` option forms.
    Role(RoleStatement),
    /// `CREATE [OR REPLACE] FUNCTION|PROCEDURE`.
    CreateRoutine(Box<CreateRoutine>),
    /// `DO` anonymous code block.
    Do(DoBlock),
    /// `CREATE SUBSCRIPTION`.
    CreateSubscription(CreateSubscription),
    /// `ALTER SUBSCRIPTION`.
    AlterSubscription(AlterSubscription),
    /// `CREATE|ALTER USER MAPPING`.
    UserMapping(UserMapping),
    /// `DECLARE … CURSOR FOR query`.
    DeclareCursor(Box<DeclareCursor>),
    /// `FETCH|MOVE … cursor`.
    Fetch(Fetch),
    /// `CLOSE cursor|ALL`.
    Close(Option<Ident>),
    /// `SET name TO value`.
    Set(SetVariable),
    /// `EXPLAIN [options] statement`.
    Explain(Box<Statement>),
    /// `PREPARE name [(types)] AS statement`.
    Prepare(Box<Statement>),
    /// `CALL procedure(args)`.
    Call(Expr),
    /// `COPY`; only the query form carries a nested statement.
    Copy(Option<Box<Statement>>),
    /// Any other recognised command, kept opaque.
    Utility(Utility),
}

impl StatementKind {
    /// Short, stable name of the statement kind.
    pub fn name(&self) -> &'static str {
        match self {
            StatementKind::Query(_) => "select",
            StatementKind::Insert(_) => "insert",
            StatementKind::Update(_) => "update",
            StatementKind::Delete(_) => "delete",
            StatementKind::Merge(_) => "merge",
            StatementKind::Role(_) => "role",
            StatementKind::CreateRoutine(_) => "create_routine",
            StatementKind::Do(_) => "do",
            StatementKind::CreateSubscription(_) => "create_subscription",
            StatementKind::AlterSubscription(_) => "alter_subscription",
            StatementKind::UserMapping(_) => "user_mapping",
            StatementKind::DeclareCursor(_) => "declare_cursor",
            StatementKind::Fetch(_) => "fetch",
            StatementKind::Close(_) => "close",
            StatementKind::Set(_) => "set",
            StatementKind::Explain(_) => "explain",
            StatementKind::Prepare(_) => "prepare",
            StatementKind::Call(_) => "call",
            StatementKind::Copy(_) => "copy",
            StatementKind::Utility(_) => "utility",
        }
    }
}

/// A command the grammar recognises by its leading keywords only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utility {
    /// Upper-cased leading keywords, e.g. `CREATE TABLE`.
    pub command: String,
    /// Span of the whole command.
    pub span: Span,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// A full query expression with its statement-level clauses.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// `WITH` clause.
    pub with: Option<With>,
    /// Select core or set operation tree.
    pub body: SetExpr,
    /// Statement-level `ORDER BY`.
    pub order_by: Vec<OrderByExpr>,
    /// `LIMIT n` (or `FETCH FIRST n ROWS`).
    pub limit: Option<Expr>,
    /// `OFFSET n`.
    pub offset: Option<Expr>,
    /// `FOR UPDATE … OF tables` locking clauses.
    pub locking: Vec<LockingClause>,
    /// Source span.
    pub span: Span,
}

/// `WITH [RECURSIVE] name AS (…), …`.
#[derive(Debug, Clone, PartialEq)]
pub struct With {
    /// `true` for `WITH RECURSIVE`.
    pub recursive: bool,
    /// Common table expressions in order.
    pub ctes: Vec<Cte>,
}

/// One common table expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Cte {
    /// CTE name.
    pub name: Ident,
    /// Optional column aliases.
    pub columns: Vec<Ident>,
    /// Body statement (query or data-modifying statement).
    pub body: Box<Statement>,
}

/// `FOR UPDATE|SHARE … [OF tables]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockingClause {
    /// Lock strength keywords, upper-cased.
    pub strength: String,
    /// Locked relations.
    pub of: Vec<ObjectName>,
}

/// Body of a query: a select core, `VALUES`, `TABLE`, or a set operation.
#[derive(Debug, Clone, PartialEq)]
pub enum SetExpr {
    /// `SELECT …`.
    Select(Box<Select>),
    /// `VALUES (…), (…)`.
    Values(Values),
    /// `TABLE name`.
    Table(ObjectName),
    /// Parenthesized query.
    Query(Box<Query>),
    /// `left UNION|INTERSECT|EXCEPT [ALL|DISTINCT] right`.
    SetOperation {
        /// Operator keyword, upper-cased.
        op: String,
        /// `true` for `ALL`.
        all: bool,
        /// Left operand.
        left: Box<SetExpr>,
        /// Right operand.
        right: Box<SetExpr>,
    },
}

/// `VALUES` rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Values {
    /// Rows of expressions.
    pub rows: Vec<Vec<Expr>>,
    /// Source span.
    pub span: Span,
}

/// A `SELECT` core.
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    /// `DISTINCT` / `DISTINCT ON (…)`.
    pub distinct: Option<Distinct>,
    /// Target list.
    pub projection: Vec<SelectItem>,
    /// `INTO [TEMP] table`.
    pub into: Option<ObjectName>,
    /// `FROM` items.
    pub from: Vec<TableRef>,
    /// `WHERE` condition.
    pub selection: Option<Expr>,
    /// `GROUP BY` elements.
    pub group_by: Vec<Expr>,
    /// `HAVING` condition.
    pub having: Option<Expr>,
    /// `WINDOW name AS (…)` definitions.
    pub windows: Vec<NamedWindow>,
    /// Source span.
    pub span: Span,
}

/// `DISTINCT` flavour.
#[derive(Debug, Clone, PartialEq)]
pub enum Distinct {
    /// Plain `DISTINCT`.
    All,
    /// `DISTINCT ON (exprs)`.
    On(Vec<Expr>),
}

/// One target-list entry.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectItem {
    /// Projected expression (wildcards included).
    pub expr: Expr,
    /// Output alias.
    pub alias: Option<Ident>,
}

/// `name AS (window spec)`.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedWindow {
    /// Window name.
    pub name: Ident,
    /// Its definition.
    pub spec: WindowSpec,
}

/// `(PARTITION BY … ORDER BY … frame)`.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowSpec {
    /// Referenced base window.
    pub base: Option<Ident>,
    /// `PARTITION BY` expressions.
    pub partition_by: Vec<Expr>,
    /// `ORDER BY` terms.
    pub order_by: Vec<OrderByExpr>,
    /// Frame clause.
    pub frame: Option<WindowFrame>,
}

/// `ROWS|RANGE|GROUPS BETWEEN start AND end`.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowFrame {
    /// Frame unit keyword, upper-cased.
    pub units: String,
    /// Start bound.
    pub start: FrameBound,
    /// End bound, when written with `BETWEEN`.
    pub end: Option<FrameBound>,
}

/// A frame bound.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameBound {
    /// `CURRENT ROW`.
    CurrentRow,
    /// `UNBOUNDED PRECEDING|FOLLOWING`.
    Unbounded,
    /// `offset PRECEDING|FOLLOWING`.
    Offset(Expr),
}

/// `expr [ASC|DESC|USING op] [NULLS FIRST|LAST]`.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderByExpr {
    /// Sort key.
    pub expr: Expr,
    /// `Some(true)` for `ASC`, `Some(false)` for `DESC`.
    pub asc: Option<bool>,
    /// `Some(true)` for `NULLS FIRST`.
    pub nulls_first: Option<bool>,
}

/// An item of a `FROM` list.
#[derive(Debug, Clone, PartialEq)]
pub enum TableRef {
    /// A named relation.
    Table {
        /// Relation name.
        name: ObjectName,
        /// Alias.
        alias: Option<TableAlias>,
        /// `TABLESAMPLE method (args) [REPEATABLE (seed)]`.
        sample: Option<TableSample>,
    },
    /// `[LATERAL] (query) alias`.
    Derived {
        /// `true` for `LATERAL`.
        lateral: bool,
        /// Subquery.
        subquery: Box<Query>,
        /// Alias.
        alias: Option<TableAlias>,
    },
    /// `[LATERAL] func(args) [WITH ORDINALITY] alias`.
    Function {
        /// `true` for `LATERAL`.
        lateral: bool,
        /// Function call expression.
        call: Expr,
        /// Alias.
        alias: Option<TableAlias>,
    },
    /// `left [kind] JOIN right [ON …|USING (…)]`.
    Join(Box<Join>),
    /// Parenthesized join tree.
    Nested(Box<TableRef>),
}

/// A join between two `FROM` items.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    /// Left operand.
    pub left: TableRef,
    /// Right operand.
    pub right: TableRef,
    /// Join type keywords, upper-cased (`LEFT`, `CROSS`, `NATURAL INNER`, …).
    pub kind: String,
    /// Join condition.
    pub constraint: JoinConstraint,
}

/// Join condition.
#[derive(Debug, Clone, PartialEq)]
pub enum JoinConstraint {
    /// `ON expr`.
    On(Expr),
    /// `USING (columns)`.
    Using(Vec<Ident>),
    /// No condition (`CROSS`, `NATURAL`).
    None,
}

/// `[AS] alias [(columns)]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableAlias {
    /// Alias name.
    pub name: Ident,
    /// Column aliases.
    pub columns: Vec<Ident>,
}

/// `TABLESAMPLE method (args) [REPEATABLE (seed)]`.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSample {
    /// Sampling method.
    pub method: ObjectName,
    /// Method arguments.
    pub args: Vec<Expr>,
    /// Seed.
    pub repeatable: Option<Expr>,
}

// ---------------------------------------------------------------------------
// Data-modifying statements
// ---------------------------------------------------------------------------

/// `INSERT INTO …`.
#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    /// `WITH` clause.
    pub with: Option<With>,
    /// Target table.
    pub table: ObjectName,
    /// Target alias.
    pub alias: Option<Ident>,
    /// Target column list.
    pub columns: Vec<Ident>,
    /// Row source; `None` for `DEFAULT VALUES`.
    pub source: Option<Box<Query>>,
    /// `ON CONFLICT` clause.
    pub on_conflict: Option<OnConflict>,
    /// `RETURNING` list.
    pub returning: Vec<SelectItem>,
}

/// `ON CONFLICT [target] DO NOTHING|UPDATE`.
#[derive(Debug, Clone, PartialEq)]
pub struct OnConflict {
    /// Conflict target index expressions.
    pub target: Vec<Expr>,
    /// Predicate of a partial-index target.
    pub target_where: Option<Expr>,
    /// Conflict action.
    pub action: ConflictAction,
}

/// What `ON CONFLICT` does.
#[derive(Debug, Clone, PartialEq)]
pub enum ConflictAction {
    /// `DO NOTHING`.
    Nothing,
    /// `DO UPDATE SET … [WHERE …]`.
    Update {
        /// Assignments.
        assignments: Vec<Assignment>,
        /// Update predicate.
        selection: Option<Expr>,
    },
}

/// `column = value` or `(a, b) = (…)` inside `SET`.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    /// Assigned columns, possibly subscripted (`arr[1]`) or field-qualified.
    pub targets: Vec<Expr>,
    /// Assigned value.
    pub value: Expr,
}

/// `UPDATE … SET …`.
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    /// `WITH` clause.
    pub with: Option<With>,
    /// Target table.
    pub table: ObjectName,
    /// Target alias.
    pub alias: Option<Ident>,
    /// Assignments.
    pub assignments: Vec<Assignment>,
    /// `FROM` list.
    pub from: Vec<TableRef>,
    /// `WHERE` condition.
    pub selection: Option<Expr>,
    /// `RETURNING` list.
    pub returning: Vec<SelectItem>,
}

/// `DELETE FROM …`.
#[derive(Debug, Clone, PartialEq)]
pub struct Delete {
    /// `WITH` clause.
    pub with: Option<With>,
    /// Target table.
    pub table: ObjectName,
    /// Target alias.
    pub alias: Option<Ident>,
    /// `USING` list.
    pub using: Vec<TableRef>,
    /// `WHERE` condition.
    pub selection: Option<Expr>,
    /// `RETURNING` list.
    pub returning: Vec<SelectItem>,
}

/// `MERGE INTO target USING source ON cond WHEN …`.
#[derive(Debug, Clone, PartialEq)]
pub struct Merge {
    /// `WITH` clause.
    pub with: Option<With>,
    /// Target table.
    pub table: ObjectName,
    /// Target alias.
    pub alias: Option<Ident>,
    /// Source relation.
    pub source: TableRef,
    /// Join condition.
    pub on: Expr,
    /// `WHEN` clauses in order.
    pub clauses: Vec<MergeClause>,
    /// `RETURNING` list.
    pub returning: Vec<SelectItem>,
}

/// One `WHEN [NOT] MATCHED [AND cond] THEN action`.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeClause {
    /// `true` for `WHEN MATCHED` (and `NOT MATCHED BY SOURCE`).
    pub matched: bool,
    /// Extra condition.
    pub condition: Option<Expr>,
    /// Action.
    pub action: MergeAction,
}

/// Action of a `MERGE` clause.
#[derive(Debug, Clone, PartialEq)]
pub enum MergeAction {
    /// `UPDATE SET …`.
    Update(Vec<Assignment>),
    /// `DELETE`.
    Delete,
    /// `INSERT [(cols)] VALUES (…) | DEFAULT VALUES`.
    Insert {
        /// Target columns.
        columns: Vec<Ident>,
        /// Inserted values; empty for `DEFAULT VALUES`.
        values: Vec<Expr>,
    },
    /// `DO NOTHING`.
    Nothing,
}

// ---------------------------------------------------------------------------
// Utility statements with literal-bearing options
// ---------------------------------------------------------------------------

/// `CREATE ROLE|USER|GROUP name [WITH] options` or `ALTER ROLE|USER name [WITH] options`.
#[derive(Debug, Clone, PartialEq)]
pub struct RoleStatement {
    /// `true` for `CREATE`, `false` for `ALTER`.
    pub create: bool,
    /// Role name.
    pub name: Ident,
    /// Options in order.
    pub options: Vec<RoleOption>,
}

/// One role option such as `PASSWORD 'x'` or `LOGIN`.
#[derive(Debug, Clone, PartialEq)]
pub struct RoleOption {
    /// Canonical option name (`password`, `validuntil`, `connectionlimit`, `login`, …).
    pub name: String,
    /// Option argument.
    pub value: OptionValue,
    /// Source span of the option.
    pub span: Span,
}

/// Argument of a role or generic option.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    /// Flag without an argument.
    None,
    /// A constant (or placeholder) argument.
    Value(Expr),
    /// A list of role names.
    Names(Vec<Ident>),
}

/// `CREATE [OR REPLACE] FUNCTION|PROCEDURE`.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateRoutine {
    /// `true` for `PROCEDURE`.
    pub procedure: bool,
    /// `true` with `OR REPLACE`.
    pub or_replace: bool,
    /// Routine name.
    pub name: ObjectName,
    /// Parameters.
    pub params: Vec<RoutineParam>,
    /// `RETURNS type`.
    pub returns: Option<TypeName>,
    /// Options (`AS`, `LANGUAGE`, `COST`, `SET`, …) in order.
    pub options: Vec<RoutineOption>,
    /// SQL-standard body (`RETURN …` / `BEGIN ATOMIC … END`).
    pub sql_body: Option<Span>,
}

/// One routine parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutineParam {
    /// `IN`, `OUT`, `INOUT`, `VARIADIC`.
    pub mode: Option<String>,
    /// Parameter name.
    pub name: Option<Ident>,
    /// Parameter type.
    pub data_type: TypeName,
    /// `DEFAULT expr`.
    pub default: Option<Expr>,
}

/// One routine option.
#[derive(Debug, Clone, PartialEq)]
pub enum RoutineOption {
    /// `AS 'definition' [, 'link_symbol']`; the procedural-language body.
    Body(Vec<Expr>),
    /// `LANGUAGE name`.
    Language(Ident),
    /// Numeric option such as `COST 100` or `ROWS 10`.
    Numeric {
        /// Option keyword, lower-cased.
        name: String,
        /// Its value.
        value: Expr,
    },
    /// `SET name TO value` attached to the routine.
    Set(SetVariable),
    /// Keyword-only option (`IMMUTABLE`, `STRICT`, `SECURITY DEFINER`, …).
    Flag(String),
}

/// `DO [LANGUAGE lang] body`.
#[derive(Debug, Clone, PartialEq)]
pub struct DoBlock {
    /// Code block, a string constant or placeholder.
    pub body: Expr,
    /// `LANGUAGE` clause.
    pub language: Option<Ident>,
}

/// `CREATE SUBSCRIPTION name CONNECTION conninfo PUBLICATION … [WITH (…)]`.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateSubscription {
    /// Subscription name.
    pub name: Ident,
    /// Connection string.
    pub connection: Expr,
    /// Publication names.
    pub publications: Vec<Ident>,
    /// `WITH (…)` parameters.
    pub with: Vec<GenericOption>,
}

/// `ALTER SUBSCRIPTION name action`.
#[derive(Debug, Clone, PartialEq)]
pub struct AlterSubscription {
    /// Subscription name.
    pub name: Ident,
    /// What is altered.
    pub action: AlterSubscriptionAction,
}

/// Action of `ALTER SUBSCRIPTION`.
#[derive(Debug, Clone, PartialEq)]
pub enum AlterSubscriptionAction {
    /// `CONNECTION 'conninfo'`.
    Connection(Expr),
    /// Publication, refresh, enable/disable, ownership and parameter actions.
    Other(Span),
}

/// `CREATE|ALTER USER MAPPING FOR role SERVER name OPTIONS (…)`.
#[derive(Debug, Clone, PartialEq)]
pub struct UserMapping {
    /// `true` for `CREATE`.
    pub create: bool,
    /// Mapped role.
    pub user: Ident,
    /// Foreign server.
    pub server: Ident,
    /// `OPTIONS (…)` entries.
    pub options: Vec<GenericOption>,
}

/// `[ADD|SET|DROP] name [value]` or `name [= value]`.
#[derive(Debug, Clone, PartialEq)]
pub struct GenericOption {
    /// `ADD`, `SET` or `DROP` in an `ALTER … OPTIONS` list.
    pub action: Option<String>,
    /// Option name.
    pub name: Ident,
    /// Option value.
    pub value: Option<Expr>,
}

/// `DECLARE name … CURSOR FOR query`.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclareCursor {
    /// Cursor name.
    pub name: Ident,
    /// Cursor query.
    pub query: Query,
}

/// `FETCH|MOVE [direction] [FROM|IN] cursor`.
#[derive(Debug, Clone, PartialEq)]
pub struct Fetch {
    /// `true` for `MOVE`.
    pub is_move: bool,
    /// Direction keywords, upper-cased.
    pub direction: Option<String>,
    /// Row count or position.
    pub count: Option<Expr>,
    /// Cursor name.
    pub cursor: Ident,
}

/// `SET [SESSION|LOCAL] name {TO|=} value, …`.
#[derive(Debug, Clone, PartialEq)]
pub struct SetVariable {
    /// `true` for `SET LOCAL`.
    pub local: bool,
    /// Variable name (lower-cased for keyword forms such as `timezone`).
    pub name: String,
    /// Values; empty for `DEFAULT`/`FROM CURRENT`.
    pub values: Vec<Expr>,
}

// ---------------------------------------------------------------------------
// Types and expressions
// ---------------------------------------------------------------------------

/// A type name with its modifiers.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeName {
    /// Type name, multi-word forms joined by spaces (`double precision`).
    pub name: String,
    /// Length/precision modifiers (`varchar(50)` → `[50]`).
    pub modifiers: Vec<Expr>,
    /// Array bounds (`int[3]` → `[Some(3)]`).
    pub array_bounds: Vec<Option<Expr>>,
    /// Source span.
    pub span: Span,
}

/// Kind of a literal constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LiteralKind {
    /// Integer that fits in 32 bits.
    Integer,
    /// Any other numeric constant.
    Numeric,
    /// Quoted string.
    String,
    /// Dollar-quoted string.
    DollarString,
    /// Bit or hex string (`B'…'`, `X'…'`).
    BitString,
    /// `TRUE` / `FALSE`.
    Boolean,
    /// `NULL`.
    Null,
}

/// An expression node with its span.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    /// Expression payload.
    pub kind: ExprKind,
    /// Source span.
    pub span: Span,
}

impl Expr {
    /// Wrap `kind` with `span`.
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// The literal kind when this is a bare literal.
    pub fn literal_kind(&self) -> Option<LiteralKind> {
        match &self.kind {
            ExprKind::Literal(kind) => Some(*kind),
            _ => None,
        }
    }
}

/// Expression forms.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// Constant.
    Literal(LiteralKind),
    /// Positional parameter `$n`.
    Param(u32),
    /// Column reference, possibly qualified.
    Column(Vec<Ident>),
    /// `*` or `qualifier.*`.
    Wildcard(Vec<Ident>),
    /// `DEFAULT` in `VALUES` or `SET`.
    Default,
    /// Keyword value functions: `CURRENT_DATE`, `CURRENT_TIMESTAMP(3)`, `CURRENT_USER`, …
    ValueFunction {
        /// Keyword, upper-cased.
        name: String,
        /// Precision argument.
        precision: Option<Box<Expr>>,
    },
    /// Prefix operator.
    Unary {
        /// Operator text, upper-cased for keywords.
        op: String,
        /// Operand.
        operand: Box<Expr>,
    },
    /// Infix operator.
    Binary {
        /// Left operand.
        left: Box<Expr>,
        /// Operator text, upper-cased for keywords.
        op: String,
        /// Right operand.
        right: Box<Expr>,
    },
    /// `a AND b AND …` or `a OR b OR …`, flattened into one operand list.
    BoolOp {
        /// `AND` or `OR`.
        op: String,
        /// Operands in source order, at least two.
        operands: Vec<Expr>,
    },
    /// `expr IS [NOT] NULL|TRUE|FALSE|UNKNOWN|DISTINCT FROM …`.
    Is {
        /// Tested expression.
        expr: Box<Expr>,
        /// `true` for `IS NOT`.
        negated: bool,
        /// Tested predicate, upper-cased.
        predicate: String,
        /// Right-hand side of `DISTINCT FROM`.
        other: Option<Box<Expr>>,
    },
    /// `expr [NOT] BETWEEN [SYMMETRIC] low AND high`.
    Between {
        /// Tested expression.
        expr: Box<Expr>,
        /// `true` for `NOT BETWEEN`.
        negated: bool,
        /// Lower bound.
        low: Box<Expr>,
        /// Upper bound.
        high: Box<Expr>,
    },
    /// `expr [NOT] IN (list)`.
    InList {
        /// Tested expression.
        expr: Box<Expr>,
        /// `true` for `NOT IN`.
        negated: bool,
        /// Candidate values.
        list: Vec<Expr>,
    },
    /// `expr [NOT] IN (subquery)`.
    InSubquery {
        /// Tested expression.
        expr: Box<Expr>,
        /// `true` for `NOT IN`.
        negated: bool,
        /// Subquery.
        subquery: Box<Query>,
    },
    /// `expr [NOT] LIKE|ILIKE|SIMILAR TO pattern [ESCAPE esc]`.
    Like {
        /// Tested expression.
        expr: Box<Expr>,
        /// Operator keywords, upper-cased, `NOT` included.
        op: String,
        /// Pattern.
        pattern: Box<Expr>,
        /// Escape character.
        escape: Option<Box<Expr>>,
    },
    /// `ANY|ALL|SOME (array or subquery)` on the right of a comparison.
    Quantified {
        /// Quantifier keyword, upper-cased.
        quantifier: String,
        /// Array expression or subquery.
        operand: Box<Expr>,
    },
    /// Function call.
    Function(Box<Function>),
    /// `CAST(expr AS type)` or `expr::type`.
    Cast {
        /// Cast operand.
        expr: Box<Expr>,
        /// Target type.
        data_type: TypeName,
    },
    /// `type 'string'` constant, such as `DATE '2020-01-01'` or `INTERVAL '1 day'`.
    TypedString {
        /// Declared type.
        data_type: TypeName,
        /// The string constant.
        value: Box<Expr>,
    },
    /// `CASE [operand] WHEN … THEN … [ELSE …] END`.
    Case {
        /// Simple-case operand.
        operand: Option<Box<Expr>>,
        /// `(condition, result)` pairs.
        branches: Vec<(Expr, Expr)>,
        /// `ELSE` result.
        else_result: Option<Box<Expr>>,
    },
    /// `EXISTS (subquery)`.
    Exists(Box<Query>),
    /// Scalar subquery.
    Subquery(Box<Query>),
    /// `ARRAY[…]` or nested `[…]` element list.
    Array(Vec<Expr>),
    /// `ARRAY(subquery)`.
    ArraySubquery(Box<Query>),
    /// `ROW(…)` or `(a, b, …)`.
    Row(Vec<Expr>),
    /// Parenthesized expression.
    Nested(Box<Expr>),
    /// `(expr).field` or `(expr).*`.
    FieldAccess {
        /// Composite expression.
        expr: Box<Expr>,
        /// Selected field; `None` for `.*`.
        field: Option<Ident>,
    },
    /// `expr[index]` or `expr[lower:upper]`.
    Subscript {
        /// Subscripted expression.
        expr: Box<Expr>,
        /// Index or lower slice bound.
        lower: Option<Box<Expr>>,
        /// Upper slice bound.
        upper: Option<Box<Expr>>,
    },
    /// `expr AT TIME ZONE zone` (zone absent for `AT LOCAL`).
    AtTimeZone {
        /// Timestamp expression.
        expr: Box<Expr>,
        /// Time zone.
        zone: Option<Box<Expr>>,
    },
    /// `expr COLLATE name`.
    Collate {
        /// Collated expression.
        expr: Box<Expr>,
        /// Collation.
        collation: ObjectName,
    },
    /// `WHERE CURRENT OF cursor`.
    CurrentOf(Ident),
}

/// A function call with its optional clauses.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    /// Function name (`GROUPING SETS` etc. included).
    pub name: ObjectName,
    /// Arguments; `count(*)` yields a single wildcard.
    pub args: Vec<FunctionArg>,
    /// `DISTINCT` aggregate.
    pub distinct: bool,
    /// Aggregate `ORDER BY`.
    pub order_by: Vec<OrderByExpr>,
    /// `WITHIN GROUP (ORDER BY …)`.
    pub within_group: Vec<OrderByExpr>,
    /// `FILTER (WHERE …)`.
    pub filter: Option<Box<Expr>>,
    /// `OVER …`.
    pub over: Option<WindowRef>,
}

/// A function argument, optionally named.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionArg {
    /// `name =>` / `name :=` prefix.
    pub name: Option<Ident>,
    /// Argument value.
    pub value: Expr,
}

/// `OVER name` or `OVER (spec)`.
#[derive(Debug, Clone, PartialEq)]
pub enum WindowRef {
    /// Named window.
    Named(Ident),
    /// Inline specification.
    Spec(WindowSpec),
}
