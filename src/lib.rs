//! Replace the literal constants of `PostgreSQL` statements with positional
//! placeholders, so that queries differing only in their values share one
//! normalized text.
#![warn(missing_docs)]

/// Error types shared by the front end and the normalizer.
pub mod error;
/// Literal discovery, placeholder planning and text rewriting.
pub mod normalizer;
/// Text, JSON and Markdown rendering of normalization results.
pub mod output;
/// Span-tracking `PostgreSQL` front end: tokenizer adapter, AST and grammar.
pub mod parser;

pub use error::{Error, ParseError};
pub use normalizer::{normalize, NormalizeOptions, Normalization, Normalizer, Numbering};
