use serde::Serialize;
use std::fmt;

use super::options::NormalizeOptions;
use crate::parser::ast::LiteralKind;

/// Syntactic position of a literal; decides whether it may be replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LiteralSite {
    /// Any value expression.
    Value,
    /// Element written directly in a `GROUP BY` list.
    GroupByItem,
    /// Key written directly in a statement-level `ORDER BY` list.
    OrderByItem,
    /// Length, precision or array bound of a type name.
    TypeModifier,
    /// Function, procedure or `DO` body.
    RoutineBody,
    /// Argument of a role, user-mapping or subscription option.
    OptionArgument,
    /// Subscription `WITH (…)` parameter.
    StorageParameter,
    /// Row count of `FETCH` / `MOVE`.
    FetchCount,
}

impl fmt::Display for LiteralSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LiteralSite::Value => "value",
            LiteralSite::GroupByItem => "group by item",
            LiteralSite::OrderByItem => "order by item",
            LiteralSite::TypeModifier => "type modifier",
            LiteralSite::RoutineBody => "routine body",
            LiteralSite::OptionArgument => "option argument",
            LiteralSite::StorageParameter => "storage parameter",
            LiteralSite::FetchCount => "fetch count",
        };
        f.write_str(label)
    }
}

/// Outcome of classifying one literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    /// Substitute a placeholder.
    Replace,
    /// Leave the literal text untouched.
    Keep,
}

/// Decide what happens to a literal of `kind` found at `site`.
///
/// Integers directly in `GROUP BY`/`ORDER BY` are column ordinals; any other
/// literal there is an ordinary value. Option arguments are replaced only
/// when they are strings (passwords, connection strings); numeric and `NULL`
/// arguments are settings rather than data.
pub fn classify(site: LiteralSite, kind: LiteralKind, options: &NormalizeOptions) -> Disposition {
    match site {
        LiteralSite::Value => Disposition::Replace,
        LiteralSite::GroupByItem | LiteralSite::OrderByItem => match kind {
            LiteralKind::Integer => Disposition::Keep,
            _ => Disposition::Replace,
        },
        LiteralSite::TypeModifier | LiteralSite::StorageParameter | LiteralSite::FetchCount => {
            Disposition::Keep
        }
        LiteralSite::RoutineBody => {
            if options.keep_routine_bodies {
                Disposition::Keep
            } else {
                Disposition::Replace
            }
        }
        LiteralSite::OptionArgument => match kind {
            LiteralKind::String | LiteralKind::DollarString => Disposition::Replace,
            _ => Disposition::Keep,
        },
    }
}
