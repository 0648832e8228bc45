/// Parallel normalization of independent statements.
pub mod batch;
/// Parse, walk, plan and rewrite; the public entry points.
pub mod driver;
/// Normalizer configuration.
pub mod options;
/// Ordering, overlap removal and index assignment for replacements.
pub mod planner;
/// Single-pass application of planned edits.
pub mod rewriter;
/// Literal sites and the replace-or-keep decision.
pub mod rules;
/// Literal discovery over the syntax tree.
pub mod walker;

pub use driver::{
    normalize, Normalization, Normalizer, PreservedLiteral, StatementReport, Substitution,
};
pub use options::{NormalizeOptions, Numbering};
pub use rules::{Disposition, LiteralSite};
pub use walker::UnsupportedConstruct;
