//! Source tree traversal.
//!
//! [`classify`] decides what each visited entry is; [`walk`] drives a
//! deterministic depth-first traversal and hands candidate files to a
//! visitor, collecting the outcomes in a [`Report`](crate::report::Report).

pub mod classify;
pub mod errors;
pub mod walker;

pub use classify::{classify, Classification, TraversalEntry, SOURCE_SUFFIX};
pub use errors::WalkError;
pub use walker::walk;
