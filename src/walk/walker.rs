use crate::pattern::MatchSpec;
use crate::report::{FileOutcome, Report};
use crate::walk::classify::{classify, Classification, TraversalEntry};
use crate::walk::errors::WalkError;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Walk `root` depth-first and call `visit` on every candidate file.
///
/// The root is made absolute once up front; every visited path is built
/// from that fixed root. Entries are sorted by file name so repeated runs
/// over the same tree produce outcomes in the same order. A hidden root is
/// pruned like any hidden directory. Errors below the
/// root are recorded as `Failed` and the walk continues; an error at the
/// root aborts.
pub fn walk<F>(root: impl AsRef<Path>, spec: &MatchSpec, mut visit: F) -> Result<Report, WalkError>
where
    F: FnMut(&Path, &MatchSpec) -> FileOutcome,
{
    let requested = root.as_ref();
    let root = std::path::absolute(requested).map_err(|source| WalkError::Resolve {
        path: requested.to_path_buf(),
        source,
    })?;
    fs::metadata(&root).map_err(|source| WalkError::Root {
        path: root.clone(),
        source,
    })?;

    // Classify the root by the name the caller gave it.
    let root_name = requested
        .file_name()
        .map_or_else(|| ".".to_string(), |name| name.to_string_lossy().into_owned());
    let traversal_entry = |entry: &DirEntry| {
        let mut traversal = TraversalEntry::from_dir_entry(entry);
        if traversal.depth == 0 {
            traversal.base_name.clone_from(&root_name);
        }
        traversal
    };

    debug!(root = %root.display(), "walking source tree");

    let mut report = Report::new(&root);
    let entries = WalkDir::new(&root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            let pruned = classify(&traversal_entry(entry)) == Classification::SkipSubtree;
            if pruned {
                debug!(path = %entry.path().display(), "skipping hidden directory");
            }
            !pruned
        });

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => {
                return Err(WalkError::Traverse {
                    path: root.clone(),
                    source: err,
                });
            }
            Err(err) => {
                let path = err
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| root.clone());
                warn!(path = %path.display(), error = %err, "traversal error");
                report.record(path, FileOutcome::failed(&err));
                continue;
            }
        };

        let entry = traversal_entry(&entry);
        match classify(&entry) {
            Classification::Candidate if entry.is_symlink => {
                debug!(path = %entry.absolute_path.display(), "skipping symlinked source file");
                report.record(
                    entry.absolute_path,
                    FileOutcome::Skipped {
                        reason: "symbolic link".to_string(),
                    },
                );
            }
            Classification::Candidate => {
                let outcome = visit(&entry.absolute_path, spec);
                report.record(entry.absolute_path, outcome);
            }
            Classification::Descend | Classification::SkipSubtree | Classification::Ignore => {}
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::compile;
    use std::path::PathBuf;

    /// Scratch root with a visible name; `tempdir()` names start with `.`.
    fn workspace() -> tempfile::TempDir {
        tempfile::Builder::new().prefix("walk").tempdir().unwrap()
    }

    fn touch(root: &Path, rel: &str) -> PathBuf {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"package p\n").unwrap();
        path
    }

    fn visited(report: &Report) -> Vec<String> {
        report
            .entries()
            .iter()
            .map(|entry| {
                report
                    .relative(&entry.path)
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[test]
    fn visits_candidates_in_sorted_order() {
        let temp_dir = workspace();
        touch(temp_dir.path(), "pkg/b.go");
        touch(temp_dir.path(), "pkg/a.go");
        touch(temp_dir.path(), "main.go");
        touch(temp_dir.path(), "go.mod");
        touch(temp_dir.path(), "pkg/sub/c.go");

        let spec = compile("old", "new").unwrap();
        let report = walk(temp_dir.path(), &spec, |_, _| FileOutcome::NoChange).unwrap();

        assert_eq!(
            visited(&report),
            ["main.go", "pkg/a.go", "pkg/b.go", "pkg/sub/c.go"]
        );
    }

    #[test]
    fn hidden_directories_are_never_visited() {
        let temp_dir = workspace();
        touch(temp_dir.path(), ".git/hook.go");
        touch(temp_dir.path(), "pkg/.cache/x.go");
        touch(temp_dir.path(), "pkg/a.go");

        let spec = compile("old", "new").unwrap();
        let mut seen = Vec::new();
        let report = walk(temp_dir.path(), &spec, |path, _| {
            seen.push(path.to_path_buf());
            FileOutcome::NoChange
        })
        .unwrap();

        assert_eq!(visited(&report), ["pkg/a.go"]);
        assert_eq!(seen.len(), 1);
    }

    #[test]
    fn visited_paths_are_absolute() {
        let temp_dir = workspace();
        touch(temp_dir.path(), "a.go");

        let spec = compile("old", "new").unwrap();
        let report = walk(temp_dir.path(), &spec, |path, _| {
            assert!(path.is_absolute());
            FileOutcome::NoChange
        })
        .unwrap();
        assert!(report.root().is_absolute());
    }

    #[test]
    fn single_file_root_is_visited() {
        let temp_dir = workspace();
        let file = touch(temp_dir.path(), "only.go");

        let spec = compile("old", "new").unwrap();
        let report = walk(&file, &spec, |_, _| FileOutcome::NoChange).unwrap();
        assert_eq!(report.entries().len(), 1);
    }

    #[test]
    fn missing_root_is_fatal() {
        let temp_dir = workspace();
        let spec = compile("old", "new").unwrap();
        let result = walk(temp_dir.path().join("missing"), &spec, |_, _| {
            panic!("nothing should be visited")
        });
        assert!(matches!(result, Err(WalkError::Root { .. })));
    }

    #[test]
    fn hidden_root_is_not_walked() {
        let temp_dir = workspace();
        touch(temp_dir.path(), ".work/a.go");

        let spec = compile("old", "new").unwrap();
        let report = walk(temp_dir.path().join(".work"), &spec, |_, _| {
            panic!("nothing should be visited")
        })
        .unwrap();
        assert!(report.entries().is_empty());
    }

    #[test]
    fn trailing_dot_root_is_walked() {
        let temp_dir = workspace();
        touch(temp_dir.path(), "pkg/a.go");

        let spec = compile("old", "new").unwrap();
        let report = walk(temp_dir.path().join("pkg/."), &spec, |_, _| FileOutcome::NoChange)
            .unwrap();
        assert_eq!(report.counts().unchanged, 1);
    }

    #[test]
    fn error_below_root_is_recorded_and_walk_continues() {
        let temp_dir = workspace();
        touch(temp_dir.path(), "a/x.go");
        touch(temp_dir.path(), "b/y.go");
        touch(temp_dir.path(), "c/z.go");
        let doomed = temp_dir.path().join("b");

        let spec = compile("old", "new").unwrap();
        let mut seen = Vec::new();
        let report = walk(temp_dir.path(), &spec, |path, _| {
            // `b` is listed in the root but not opened yet.
            if path.ends_with("a/x.go") {
                fs::remove_dir_all(&doomed).unwrap();
            }
            seen.push(path.to_path_buf());
            FileOutcome::NoChange
        })
        .unwrap();

        assert!(report.outcome_for(&doomed).unwrap().is_failed());
        assert!(report.outcome_for(temp_dir.path().join("b/y.go")).is_none());
        assert_eq!(
            report.outcome_for(temp_dir.path().join("c/z.go")),
            Some(&FileOutcome::NoChange)
        );
        assert_eq!(seen.len(), 2);
        assert_eq!(visited(&report), ["a/x.go", "b", "c/z.go"]);
    }

    #[test]
    #[cfg(unix)]
    fn symlinked_candidates_are_skipped() {
        use std::os::unix::fs::symlink;

        let temp_dir = workspace();
        let target = touch(temp_dir.path(), "real.go");
        symlink(&target, temp_dir.path().join("link.go")).unwrap();

        let spec = compile("old", "new").unwrap();
        let report = walk(temp_dir.path(), &spec, |_, _| FileOutcome::NoChange).unwrap();

        assert_eq!(
            report.outcome_for(temp_dir.path().join("link.go")),
            Some(&FileOutcome::Skipped {
                reason: "symbolic link".to_string()
            })
        );
        assert_eq!(report.counts().unchanged, 1);
    }
}
