use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use colored::Colorize;
use go_imports_rename::report::relative_to;
use go_imports_rename::{
    FileOutcome, FormatterChoice, MatchMode, MatchOptions, RenameOptions, Renamer, Report,
    RewritePlan,
};
use serde::Serialize;
use similar::{ChangeTag, TextDiff};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "go-imports-rename")]
#[command(about = "Rewrite Go import paths across a source tree", long_about = None)]
#[command(version)]
struct Cli {
    /// Pattern matched against each import path (regular expression unless --literal)
    from: String,

    /// Replacement; `$1` / `${name}` expand capture groups
    to: String,

    /// Root directory (or single file) to process
    #[arg(default_value = ".")]
    root: PathBuf,

    /// Only rewrite imports whose whole path matches, not subpackages
    #[arg(long)]
    exact: bool,

    /// Treat FROM and TO as plain strings instead of a regex and template
    #[arg(long)]
    literal: bool,

    /// Dry run - show what would be changed without modifying files
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Show unified diff of changes
    #[arg(short, long)]
    diff: bool,

    /// Skip gofmt; only re-sort import blocks of rewritten files.
    /// By default rewritten files go through gofmt when it is on PATH
    #[arg(long)]
    no_gofmt: bool,

    /// gofmt binary to use instead of the one on PATH
    #[arg(long, value_name = "PATH", conflicts_with = "no_gofmt")]
    gofmt_path: Option<PathBuf>,

    /// Print the report as JSON instead of text
    #[arg(long, conflicts_with = "diff")]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Only print failures and the summary
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn options(&self) -> RenameOptions {
        let formatter = match (&self.gofmt_path, self.no_gofmt) {
            (Some(path), _) => FormatterChoice::Gofmt(path.clone()),
            (None, true) => FormatterChoice::Builtin,
            (None, false) => FormatterChoice::Auto,
        };
        RenameOptions {
            matching: MatchOptions {
                mode: if self.exact {
                    MatchMode::Exact
                } else {
                    MatchMode::Prefix
                },
                literal: self.literal,
            },
            dry_run: self.dry_run,
            formatter,
        }
    }
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    from: &'a str,
    to: &'a str,
    options: &'a RenameOptions,
    #[serde(flatten)]
    report: &'a Report,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let options = cli.options();
    let renamer = Renamer::new(&cli.from, &cli.to).with_options(options.clone());

    let report = if cli.diff {
        let root = std::path::absolute(&cli.root).unwrap_or_else(|_| cli.root.clone());
        renamer.run_inspect(&cli.root, |plan| print_diff(&root, plan))
    } else {
        renamer.run(&cli.root)
    }
    .with_context(|| format!("failed to rename imports under {}", cli.root.display()))?;

    if cli.json {
        let output = JsonOutput {
            from: &cli.from,
            to: &cli.to,
            options: &options,
            report: &report,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_report(&report, cli.dry_run, cli.quiet);
    }

    if report.has_failures() {
        std::process::exit(1);
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Unified diff of a planned rewrite, three lines of context per hunk.
fn print_diff(root: &Path, plan: &RewritePlan) {
    let name = relative_to(root, plan.path()).display();
    let diff = TextDiff::from_lines(plan.original(), plan.formatted());

    println!("{}", format!("--- a/{name}").bold());
    println!("{}", format!("+++ b/{name}").bold());
    for hunk in diff.unified_diff().context_radius(3).iter_hunks() {
        println!("{}", hunk.header().to_string().cyan());
        for change in hunk.iter_changes() {
            let styled = match change.tag() {
                ChangeTag::Delete => format!("-{change}").red(),
                ChangeTag::Insert => format!("+{change}").green(),
                ChangeTag::Equal => format!(" {change}").normal(),
            };
            print!("{styled}");
            if change.missing_newline() {
                println!();
            }
        }
    }
}

fn print_report(report: &Report, dry_run: bool, quiet: bool) {
    println!("Root: {}", report.root().display());
    if dry_run {
        println!("{}", "[DRY RUN - no files were modified]".cyan());
    }
    println!();

    for entry in report.entries() {
        let path = report.relative(&entry.path).display();
        match &entry.outcome {
            FileOutcome::Rewritten { changes } => {
                if quiet {
                    continue;
                }
                let verb = if dry_run { "Would rewrite" } else { "Rewrote" };
                println!("{} {} {}", "✓".green(), verb, path);
                for change in changes {
                    println!(
                        "    {}: {} -> {}",
                        change.line,
                        change.from.dimmed(),
                        change.to
                    );
                }
            }
            FileOutcome::NoChange => {}
            FileOutcome::Skipped { reason } => {
                if !quiet {
                    println!("{} {}: Skipped ({})", "⊘".cyan(), path, reason);
                }
            }
            FileOutcome::Failed { error } => {
                eprintln!("{} {}: Failed - {}", "✗".red(), path, error);
            }
        }
    }

    let counts = report.counts();
    println!();
    println!("{}", "Summary:".bold());
    println!("  {} rewritten", format!("{}", counts.rewritten).green());
    println!("  {} unchanged", format!("{}", counts.unchanged).yellow());
    println!("  {} skipped", format!("{}", counts.skipped).cyan());
    println!("  {} failed", format!("{}", counts.failed).red());
}
