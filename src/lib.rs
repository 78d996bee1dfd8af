//! go-imports-rename: rewrite Go import paths across a source tree.
//!
//! Given a root directory, a match pattern and a replacement template, every
//! `*.go` file under the root (hidden directories excluded) is parsed with
//! tree-sitter, each import path matching the pattern is replaced, and the
//! file is reformatted and written back in place.
//!
//! # Architecture
//!
//! - [`pattern`] compiles the match pattern into a [`MatchSpec`]. Matches are
//!   anchored to whole leading path segments.
//! - [`walk`] classifies and traverses the tree deterministically.
//! - [`rewrite`] plans a file's rewrite in memory and commits it.
//! - [`atomic`] persists content through a temporary sibling and a rename.
//! - [`go`] wraps the tree-sitter Go grammar and the formatters. Rewritten
//!   files go through `gofmt` when it is on `PATH`.
//!
//! # Safety
//!
//! - A file is either untouched or fully replaced (tempfile + fsync + rename)
//! - Files that do not parse cleanly are reported and never written
//! - Formatted output is re-parsed before it is committed
//! - A file that changed on disk after it was read is not overwritten
//!
//! # Example
//!
//! ```no_run
//! use go_imports_rename::{rename, FileOutcome};
//!
//! let report = rename(".", "old/mod", "new/mod")?;
//! for entry in report.entries() {
//!     if let FileOutcome::Rewritten { changes } = &entry.outcome {
//!         println!("{}: {} import(s)", entry.path.display(), changes.len());
//!     }
//! }
//! # Ok::<(), go_imports_rename::RenameError>(())
//! ```

pub mod atomic;
pub mod error;
pub mod go;
pub mod pattern;
pub mod pool;
pub mod rename;
pub mod report;
pub mod rewrite;
pub mod walk;

// Re-exports
pub use atomic::{atomic_write, write_with, AtomicFile, WriteError};
pub use error::RenameError;
pub use go::{FormatError, Formatter, GoError, GofmtFormatter, ImportFormatter};
pub use pattern::{compile, MatchMode, MatchOptions, MatchResult, MatchSpec, PatternError};
pub use rename::{rename, FormatterChoice, RenameOptions, Renamer};
pub use report::{Counts, FileOutcome, ImportChange, Report, ReportEntry};
pub use rewrite::{RewriteError, RewritePlan, Rewriter};
pub use walk::{classify, walk, Classification, TraversalEntry, WalkError};
