/// Span-carrying syntax tree produced by the grammar.
pub mod ast;
/// Expression and type-name productions.
pub mod expr;
/// Statement grammar and the script entry point.
pub mod grammar;
/// `PostgreSQL` tokenizer wrapper with byte spans.
pub mod lexer;
/// Identifier and keyword helpers (quoting, reserved words, option names).
pub mod names;

pub use grammar::{parse_script, Script};
