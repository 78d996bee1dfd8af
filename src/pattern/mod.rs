//! Import path matching and replacement.
//!
//! A [`MatchSpec`] is compiled once from the caller's match pattern and
//! replacement template and then applied to every import path in the tree.
//! Matching is anchored: a pattern only ever covers whole leading path
//! segments, never an arbitrary substring.

pub mod errors;
pub mod matcher;

pub use errors::PatternError;
pub use matcher::{apply, compile, MatchMode, MatchOptions, MatchResult, MatchSpec};
