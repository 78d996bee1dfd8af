use crate::error::RenameError;
use crate::go::GofmtFormatter;
use crate::pattern::{MatchMode, MatchOptions, MatchSpec, PatternError};
use crate::report::Report;
use crate::rewrite::{RewritePlan, Rewriter};
use crate::walk::walk;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Which formatter rewritten files go through.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatterChoice {
    /// `gofmt` from `PATH` when it is installed, the built-in formatter
    /// otherwise.
    #[default]
    Auto,
    /// Splice literals and sort import runs only.
    Builtin,
    /// A specific `gofmt` binary. If it cannot be run, every rewritten file
    /// fails.
    Gofmt(PathBuf),
}

/// Everything that shapes a run besides the root and the two patterns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenameOptions {
    #[serde(flatten)]
    pub matching: MatchOptions,
    pub dry_run: bool,
    pub formatter: FormatterChoice,
}

/// Configured import rename over a source tree.
///
/// ```no_run
/// use go_imports_rename::Renamer;
///
/// let report = Renamer::new("github.com/acme/old", "github.com/acme/new")
///     .literal(true)
///     .run("./src")?;
/// println!("{} file(s) rewritten", report.counts().rewritten);
/// # Ok::<(), go_imports_rename::RenameError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Renamer {
    match_pattern: String,
    replace_pattern: String,
    options: RenameOptions,
}

impl Renamer {
    pub fn new(match_pattern: impl Into<String>, replace_pattern: impl Into<String>) -> Self {
        Self {
            match_pattern: match_pattern.into(),
            replace_pattern: replace_pattern.into(),
            options: RenameOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RenameOptions) -> Self {
        self.options = options;
        self
    }

    pub fn exact(mut self, exact: bool) -> Self {
        self.options.matching.mode = if exact {
            MatchMode::Exact
        } else {
            MatchMode::Prefix
        };
        self
    }

    pub fn literal(mut self, literal: bool) -> Self {
        self.options.matching.literal = literal;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.options.dry_run = dry_run;
        self
    }

    pub fn formatter(mut self, formatter: FormatterChoice) -> Self {
        self.options.formatter = formatter;
        self
    }

    /// Format through this `gofmt` binary instead of looking one up.
    pub fn gofmt(self, program: impl Into<PathBuf>) -> Self {
        self.formatter(FormatterChoice::Gofmt(program.into()))
    }

    pub fn options(&self) -> &RenameOptions {
        &self.options
    }

    /// Compile the match spec without touching the filesystem.
    pub fn compile(&self) -> Result<MatchSpec, PatternError> {
        MatchSpec::with_options(
            &self.match_pattern,
            &self.replace_pattern,
            self.options.matching,
        )
    }

    pub fn run(&self, root: impl AsRef<Path>) -> Result<Report, RenameError> {
        self.run_inspect(root, |_| {})
    }

    /// Run, calling `inspect` with every planned rewrite before it is
    /// committed (or instead of committing, in dry-run mode).
    pub fn run_inspect<F>(&self, root: impl AsRef<Path>, mut inspect: F) -> Result<Report, RenameError>
    where
        F: FnMut(&RewritePlan),
    {
        let spec = self.compile()?;
        let rewriter = self.rewriter();
        let report = walk(root, &spec, |path, spec| {
            rewriter.rewrite_inspect(path, spec, &mut inspect)
        })?;
        Ok(report)
    }

    fn rewriter(&self) -> Rewriter {
        let gofmt = gofmt_program(&self.options.formatter, || which::which("gofmt").ok());
        let rewriter = match gofmt {
            Some(program) => Rewriter::with_formatter(GofmtFormatter::with_program(program)),
            None => Rewriter::new(),
        };
        rewriter.dry_run(self.options.dry_run)
    }
}

/// The `gofmt` binary `choice` resolves to, `None` for the built-in
/// formatter.
fn gofmt_program(
    choice: &FormatterChoice,
    lookup: impl FnOnce() -> Option<PathBuf>,
) -> Option<PathBuf> {
    match choice {
        FormatterChoice::Builtin => None,
        FormatterChoice::Gofmt(program) => Some(program.clone()),
        FormatterChoice::Auto => {
            let found = lookup();
            match &found {
                Some(program) => debug!(gofmt = %program.display(), "formatting with gofmt"),
                None => warn!("gofmt not found on PATH; only import blocks will be reformatted"),
            }
            found
        }
    }
}

/// Rename every matching import path under `root`.
///
/// Fails only when the pattern does not compile or the root cannot be read;
/// per-file failures are reported through [`Report::has_failures`].
pub fn rename(
    root: impl AsRef<Path>,
    match_pattern: &str,
    replace_pattern: &str,
) -> Result<Report, RenameError> {
    Renamer::new(match_pattern, replace_pattern).run(root)
}
