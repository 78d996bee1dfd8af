use crate::go::errors::FormatError;
use crate::go::parser::{GoSource, ImportSpec};
use crate::go::quote::quote;
use std::io::Write;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Turns a (possibly mutated) [`GoSource`] back into file bytes.
pub trait Formatter {
    fn format(&self, source: &GoSource) -> Result<Vec<u8>, FormatError>;
}

/// Built-in formatter.
///
/// Splices updated import literals into the original text and re-sorts
/// import runs the way `gofmt` does. Everything outside import specs is
/// emitted unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportFormatter;

impl Formatter for ImportFormatter {
    fn format(&self, source: &GoSource) -> Result<Vec<u8>, FormatError> {
        Ok(format_imports(source).into_bytes())
    }
}

/// Runs [`ImportFormatter`] and pipes the result through an external
/// `gofmt` binary for full canonical formatting.
#[derive(Debug, Clone)]
pub struct GofmtFormatter {
    program: PathBuf,
}

impl GofmtFormatter {
    pub fn new() -> Self {
        Self::with_program("gofmt")
    }

    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl Default for GofmtFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter for GofmtFormatter {
    fn format(&self, source: &GoSource) -> Result<Vec<u8>, FormatError> {
        let input = format_imports(source);
        let spawn_error = |source| FormatError::Spawn {
            program: self.program.clone(),
            source,
        };

        let mut child = Command::new(&self.program)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_error)?;

        // gofmt reads all of stdin before writing, so feeding it up front
        // cannot deadlock. Dropping the handle closes the pipe.
        let fed = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(input.as_bytes()),
            None => Ok(()),
        };
        let output = child.wait_with_output().map_err(spawn_error)?;

        if !output.status.success() {
            return Err(FormatError::Gofmt {
                program: self.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        fed.map_err(spawn_error)?;

        Ok(output.stdout)
    }
}

struct Splice {
    range: Range<usize>,
    text: String,
}

/// Render the source with pending import updates applied.
///
/// Inside an `import ( ... )` block, specs that each sit alone on
/// consecutive lines form a run; runs are sorted by path then alias and
/// exact duplicates are dropped. Blank lines and standalone comments end a
/// run.
pub fn format_imports(source: &GoSource) -> String {
    let text = source.text();
    let imports = source.imports();
    let mut splices = Vec::new();
    let mut sorted = vec![false; imports.len()];

    for run in sortable_runs(text, imports) {
        let first = line_region(text, imports[run.start].span());
        let last = line_region(text, imports[run.end - 1].span());

        let mut lines: Vec<(&ImportSpec, String)> = run
            .clone()
            .map(|i| (&imports[i], render_line(text, &imports[i])))
            .collect();
        lines.sort_by(|a, b| sort_key(a.0).cmp(&sort_key(b.0)));
        lines.dedup_by(|later, kept| {
            if sort_key(later.0) != sort_key(kept.0) {
                return false;
            }
            if let Some(comment) = trailing_comment(text, later.0) {
                append_comment(&mut kept.1, comment);
            }
            true
        });

        splices.push(Splice {
            range: first.start..last.end,
            text: lines.into_iter().map(|(_, line)| line).collect(),
        });
        for i in run {
            sorted[i] = true;
        }
    }

    for (import, _) in imports
        .iter()
        .zip(&sorted)
        .filter(|(import, sorted)| import.is_dirty() && !**sorted)
    {
        splices.push(Splice {
            range: import.literal_span(),
            text: quote(import.path()),
        });
    }

    // Bottom-to-top so earlier offsets stay valid.
    splices.sort_by(|a, b| b.range.start.cmp(&a.range.start));

    let mut out = text.to_string();
    for splice in splices {
        out.replace_range(splice.range, &splice.text);
    }
    out
}

fn sort_key(import: &ImportSpec) -> (&str, &str) {
    (import.path(), import.name().unwrap_or(""))
}

/// Index ranges of runs with at least two specs.
fn sortable_runs(text: &str, imports: &[ImportSpec]) -> Vec<Range<usize>> {
    let mut runs = Vec::new();
    let mut current: Option<Range<usize>> = None;

    for (i, import) in imports.iter().enumerate() {
        let extends = match (&current, import.block()) {
            (Some(run), Some(block)) => {
                let prev = &imports[run.end - 1];
                prev.block() == Some(block)
                    && line_region(text, prev.span()).end
                        == line_region(text, import.span()).start
                    && alone_on_line(text, import)
            }
            _ => false,
        };

        if extends {
            if let Some(run) = current.as_mut() {
                run.end = i + 1;
            }
            continue;
        }

        if let Some(run) = current.take() {
            if run.len() > 1 {
                runs.push(run);
            }
        }
        if import.block().is_some() && alone_on_line(text, import) {
            current = Some(i..i + 1);
        }
    }

    if let Some(run) = current {
        if run.len() > 1 {
            runs.push(run);
        }
    }

    runs
}

/// Byte range of the full lines a span touches, trailing newline included.
fn line_region(text: &str, span: Range<usize>) -> Range<usize> {
    let start = text[..span.start].rfind('\n').map_or(0, |i| i + 1);
    let end = text[span.end..]
        .find('\n')
        .map_or(text.len(), |i| span.end + i + 1);
    start..end
}

fn alone_on_line(text: &str, import: &ImportSpec) -> bool {
    let span = import.span();
    let region = line_region(text, span.clone());
    if !text[..region.end].ends_with('\n') {
        return false;
    }

    let before = &text[region.start..span.start];
    let after = text[span.end..region.end].trim();
    before.trim().is_empty() && (after.is_empty() || after.starts_with("//"))
}

/// `// ...` after a spec that sits alone on its line.
fn trailing_comment<'t>(text: &'t str, import: &ImportSpec) -> Option<&'t str> {
    let region = line_region(text, import.span());
    let after = text[import.span().end..region.end].trim();
    after.starts_with("//").then_some(after)
}

/// Add a dropped duplicate's comment to the end of the surviving line.
fn append_comment(line: &mut String, comment: &str) {
    let body = line.trim_end_matches(['\r', '\n']).len();
    line.insert_str(body, &format!(" {comment}"));
}

fn render_line(text: &str, import: &ImportSpec) -> String {
    let region = line_region(text, import.span());
    let mut line = text[region.clone()].to_string();
    if import.is_dirty() {
        let literal = import.literal_span();
        line.replace_range(
            literal.start - region.start..literal.end - region.start,
            &quote(import.path()),
        );
    }
    line
}
