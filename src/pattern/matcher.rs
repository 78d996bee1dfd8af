use crate::pattern::errors::PatternError;
use regex::Regex;
use serde::Serialize;

/// How much of an import path the match pattern has to cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// The pattern matches the path itself or any path below it, split at a
    /// `/` segment boundary. `old/mod` matches `old/mod/x` but not `old/modern`.
    #[default]
    Prefix,
    /// The pattern must match the whole path.
    Exact,
}

/// Options that change how a match pattern is compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MatchOptions {
    pub mode: MatchMode,
    /// Treat the match pattern as a literal string and the replacement as
    /// plain text (no `$1` expansion).
    pub literal: bool,
}

/// Outcome of applying a [`MatchSpec`] to one import path.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "MatchResult should be checked for a replacement"]
pub enum MatchResult {
    Unchanged,
    Replaced(String),
}

impl MatchResult {
    pub fn is_replaced(&self) -> bool {
        matches!(self, MatchResult::Replaced(_))
    }

    pub fn into_replacement(self) -> Option<String> {
        match self {
            MatchResult::Replaced(value) => Some(value),
            MatchResult::Unchanged => None,
        }
    }
}

/// A compiled match pattern plus replacement template.
///
/// # Pattern Syntax
///
/// The match pattern is a [`regex`] expression matched against the whole
/// import path. Capture groups can be referenced from the replacement:
///
/// ```text
/// github.com/(\w+)/legacy    ->  example.org/$1/v2
/// old/mod                    ->  new/mod
/// ^old/mod$                  ->  new/mod          // anchors force an exact match
/// ```
///
/// In [`MatchMode::Prefix`] whatever follows the matched segments (`/x/y`) is
/// carried over to the result unchanged.
#[derive(Debug, Clone)]
pub struct MatchSpec {
    match_pattern: String,
    replace_pattern: String,
    options: MatchOptions,
    regex: Regex,
    /// Capture group holding the unmatched `/...` tail in prefix mode.
    tail_group: Option<usize>,
}

impl MatchSpec {
    /// Compile with default options (regex pattern, prefix mode).
    pub fn compile(match_pattern: &str, replace_pattern: &str) -> Result<Self, PatternError> {
        Self::with_options(match_pattern, replace_pattern, MatchOptions::default())
    }

    pub fn with_options(
        match_pattern: &str,
        replace_pattern: &str,
        options: MatchOptions,
    ) -> Result<Self, PatternError> {
        if match_pattern.is_empty() {
            return Err(PatternError::EmptyPattern);
        }

        let body = if options.literal {
            regex::escape(match_pattern)
        } else {
            // Validate on its own first: a pattern such as `a)|(b` is only
            // rejected before it gets wrapped in a group.
            compile_regex(match_pattern, match_pattern)?;
            match_pattern.to_string()
        };

        let anchored = match options.mode {
            MatchMode::Prefix => format!("^(?:{body})(/.*)?$"),
            MatchMode::Exact => format!("^(?:{body})$"),
        };
        let regex = compile_regex(&anchored, match_pattern)?;

        let tail_group = match options.mode {
            MatchMode::Prefix => Some(regex.captures_len() - 1),
            MatchMode::Exact => None,
        };

        Ok(Self {
            match_pattern: match_pattern.to_string(),
            replace_pattern: replace_pattern.to_string(),
            options,
            regex,
            tail_group,
        })
    }

    pub fn match_pattern(&self) -> &str {
        &self.match_pattern
    }

    pub fn replace_pattern(&self) -> &str {
        &self.replace_pattern
    }

    pub fn options(&self) -> MatchOptions {
        self.options
    }

    /// Apply the spec to an unquoted import path.
    pub fn apply(&self, input: &str) -> MatchResult {
        let Some(caps) = self.regex.captures(input) else {
            return MatchResult::Unchanged;
        };

        let mut replaced = String::with_capacity(self.replace_pattern.len() + input.len());
        if self.options.literal {
            replaced.push_str(&self.replace_pattern);
        } else {
            caps.expand(&self.replace_pattern, &mut replaced);
        }

        if let Some(tail) = self.tail_group.and_then(|group| caps.get(group)) {
            replaced.push_str(tail.as_str());
        }

        MatchResult::Replaced(replaced)
    }
}

/// Compile a match pattern and replacement template with default options.
pub fn compile(match_pattern: &str, replace_pattern: &str) -> Result<MatchSpec, PatternError> {
    MatchSpec::compile(match_pattern, replace_pattern)
}

/// Apply a compiled spec to one import path.
pub fn apply(spec: &MatchSpec, input: &str) -> MatchResult {
    spec.apply(input)
}

fn compile_regex(source: &str, pattern: &str) -> Result<Regex, PatternError> {
    Regex::new(source).map_err(|source| PatternError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}
