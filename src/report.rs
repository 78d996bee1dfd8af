//! Per-file outcomes and their aggregation over one run.

use serde::Serialize;
use std::error::Error;
use std::fmt;
use std::path::{Path, PathBuf};

/// One import path that was (or would be) rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportChange {
    pub from: String,
    pub to: String,
    /// One-based line of the import spec.
    pub line: usize,
}

/// Result of processing a single candidate file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
#[must_use = "FileOutcome should be recorded or checked"]
pub enum FileOutcome {
    /// The file was not processed.
    Skipped { reason: String },
    /// No import matched; the file was not written.
    NoChange,
    /// At least one import matched and the file was replaced.
    Rewritten { changes: Vec<ImportChange> },
    /// The file could not be processed and was left untouched.
    Failed { error: String },
}

impl FileOutcome {
    /// Build a `Failed` outcome, rendering the error with its source chain.
    pub fn failed(error: &(dyn Error + 'static)) -> Self {
        FileOutcome::Failed {
            error: error_chain(error),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, FileOutcome::Failed { .. })
    }

    pub fn is_rewritten(&self) -> bool {
        matches!(self, FileOutcome::Rewritten { .. })
    }
}

impl fmt::Display for FileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileOutcome::Skipped { reason } => write!(f, "skipped ({reason})"),
            FileOutcome::NoChange => write!(f, "no change"),
            FileOutcome::Rewritten { changes } => {
                write!(f, "rewritten ({} import(s))", changes.len())
            }
            FileOutcome::Failed { error } => write!(f, "failed: {error}"),
        }
    }
}

/// `outer: inner: root cause`
pub fn error_chain(error: &(dyn Error + 'static)) -> String {
    let mut rendered = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}

/// `path` relative to `root`. When `root` is the file itself, its file name.
pub fn relative_to<'a>(root: &Path, path: &'a Path) -> &'a Path {
    match path.strip_prefix(root) {
        Ok(rel) if rel.as_os_str().is_empty() => path.file_name().map_or(path, Path::new),
        Ok(rel) => rel,
        Err(_) => path,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
    pub path: PathBuf,
    #[serde(flatten)]
    pub outcome: FileOutcome,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counts {
    pub skipped: usize,
    pub unchanged: usize,
    pub rewritten: usize,
    pub failed: usize,
}

/// Outcomes of one run in traversal order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    root: PathBuf,
    entries: Vec<ReportEntry>,
}

impl Report {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            entries: Vec::new(),
        }
    }

    pub fn record(&mut self, path: impl Into<PathBuf>, outcome: FileOutcome) {
        self.entries.push(ReportEntry {
            path: path.into(),
            outcome,
        });
    }

    /// Absolute root the run was resolved against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    pub fn outcome_for(&self, path: impl AsRef<Path>) -> Option<&FileOutcome> {
        let path = path.as_ref();
        self.entries
            .iter()
            .find(|entry| entry.path == path)
            .map(|entry| &entry.outcome)
    }

    /// Path relative to the root, for display.
    pub fn relative<'a>(&self, path: &'a Path) -> &'a Path {
        relative_to(&self.root, path)
    }

    pub fn counts(&self) -> Counts {
        let mut counts = Counts::default();
        for entry in &self.entries {
            match entry.outcome {
                FileOutcome::Skipped { .. } => counts.skipped += 1,
                FileOutcome::NoChange => counts.unchanged += 1,
                FileOutcome::Rewritten { .. } => counts.rewritten += 1,
                FileOutcome::Failed { .. } => counts.failed += 1,
            }
        }
        counts
    }

    pub fn has_failures(&self) -> bool {
        self.entries.iter().any(|entry| entry.outcome.is_failed())
    }

    pub fn failures(&self) -> impl Iterator<Item = &ReportEntry> {
        self.entries.iter().filter(|entry| entry.outcome.is_failed())
    }
}
