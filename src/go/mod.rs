//! Go source support built on the tree-sitter Go grammar.
//!
//! Parsing yields an owned [`GoSource`]: the file text plus its import
//! declarations in declaration order. Import paths are mutated in memory and
//! a [`Formatter`] turns the result back into bytes.

pub mod errors;
pub mod format;
pub mod parser;
pub mod quote;

pub use errors::{FormatError, GoError};
pub use format::{Formatter, GofmtFormatter, ImportFormatter};
pub use parser::{GoParser, GoSource, ImportSpec};
