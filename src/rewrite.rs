//! Per-file rewrite: parse, match, reformat, commit.
//!
//! Rewriting is split in two steps. [`Rewriter::plan`] reads and parses the
//! file, applies the match spec to every import and formats the result
//! entirely in memory. [`Rewriter::commit`] then persists a plan through
//! the atomic writer. Nothing on disk changes before the commit's rename.

use crate::atomic::{atomic_write, WriteError};
use crate::go::{FormatError, Formatter, GoError, ImportFormatter};
use crate::pattern::{MatchResult, MatchSpec};
use crate::pool;
use crate::report::{FileOutcome, ImportChange};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};
use xxhash_rust::xxh3::xxh3_64;

#[derive(Error, Debug)]
pub enum RewriteError {
    #[error("parse error")]
    Parse(#[from] GoError),

    #[error("format error")]
    Format(#[from] FormatError),

    #[error("write error")]
    Write(#[from] WriteError),
}

/// A fully formatted replacement for one file, not yet written.
#[derive(Debug, Clone)]
#[must_use = "RewritePlan does nothing until committed"]
pub struct RewritePlan {
    path: PathBuf,
    original: String,
    formatted: String,
    changes: Vec<ImportChange>,
    /// xxh3 of the bytes the plan was built from.
    fingerprint: u64,
}

impl RewritePlan {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn formatted(&self) -> &str {
        &self.formatted
    }

    pub fn changes(&self) -> &[ImportChange] {
        &self.changes
    }
}

/// Rewrites the imports of one file at a time.
pub struct Rewriter {
    formatter: Box<dyn Formatter>,
    dry_run: bool,
}

impl Rewriter {
    /// Rewriter using the built-in [`ImportFormatter`].
    pub fn new() -> Self {
        Self::with_formatter(ImportFormatter)
    }

    pub fn with_formatter(formatter: impl Formatter + 'static) -> Self {
        Self {
            formatter: Box::new(formatter),
            dry_run: false,
        }
    }

    /// Plan and validate rewrites but never write.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Rewrite one file and report what happened.
    pub fn rewrite(&self, path: &Path, spec: &MatchSpec) -> FileOutcome {
        self.rewrite_inspect(path, spec, &mut |_| {})
    }

    /// Like [`Rewriter::rewrite`], calling `inspect` with each plan before
    /// it is committed.
    pub fn rewrite_inspect(
        &self,
        path: &Path,
        spec: &MatchSpec,
        inspect: &mut dyn FnMut(&RewritePlan),
    ) -> FileOutcome {
        debug!(path = %path.display(), "processing");

        let result = self.plan(path, spec).and_then(|plan| {
            let Some(plan) = plan else {
                return Ok(FileOutcome::NoChange);
            };
            inspect(&plan);

            if !self.dry_run {
                self.commit(&plan)?;
                info!(
                    path = %path.display(),
                    imports = plan.changes.len(),
                    "rewrote imports"
                );
            }
            Ok(FileOutcome::Rewritten {
                changes: plan.changes,
            })
        });

        match result {
            Ok(outcome) => outcome,
            Err(err) => {
                let outcome = FileOutcome::failed(&err);
                if let FileOutcome::Failed { error } = &outcome {
                    warn!(path = %path.display(), %error, "leaving file untouched");
                }
                outcome
            }
        }
    }

    /// Build the in-memory rewrite for `path`.
    ///
    /// Returns `None` when no import matches. Every matching import is
    /// rewritten, even when the replacement equals the original path.
    pub fn plan(&self, path: &Path, spec: &MatchSpec) -> Result<Option<RewritePlan>, RewriteError> {
        let bytes = fs::read(path).map_err(|source| GoError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let fingerprint = xxh3_64(&bytes);
        let text = String::from_utf8(bytes).map_err(|_| GoError::NotUtf8 {
            path: path.to_path_buf(),
        })?;

        let mut source = pool::parse(text)?;

        let mut changes = Vec::new();
        for import in source.imports_mut() {
            let MatchResult::Replaced(new_path) = spec.apply(import.path()) else {
                continue;
            };
            debug!(
                path = %path.display(),
                from = import.path(),
                to = %new_path,
                "import matched"
            );
            changes.push(ImportChange {
                from: import.path().to_string(),
                to: new_path.clone(),
                line: import.line() + 1,
            });
            import.set_path(new_path);
        }

        if changes.is_empty() {
            return Ok(None);
        }

        let formatted = self.formatter.format(&source)?;
        let formatted = String::from_utf8(formatted).map_err(|_| FormatError::NotUtf8)?;
        pool::check(&formatted).map_err(FormatError::InvalidOutput)?;

        Ok(Some(RewritePlan {
            path: path.to_path_buf(),
            original: source.text().to_string(),
            formatted,
            changes,
            fingerprint,
        }))
    }

    /// Persist a plan, refusing if the file changed since it was read.
    pub fn commit(&self, plan: &RewritePlan) -> Result<(), WriteError> {
        let current = fs::read(&plan.path).map_err(|source| WriteError::Read {
            path: plan.path.clone(),
            source,
        })?;
        if xxh3_64(&current) != plan.fingerprint {
            return Err(WriteError::ConcurrentModification {
                path: plan.path.clone(),
            });
        }

        atomic_write(&plan.path, plan.formatted.as_bytes())
    }
}

impl Default for Rewriter {
    fn default() -> Self {
        Self::new()
    }
}
