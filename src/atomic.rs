use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WriteError {
    #[error("failed to create temporary file in {dir}")]
    CreateTemp {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to copy permissions onto {path}")]
    Permissions {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to flush {path} to disk")]
    Sync {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to rename temporary file over {target}")]
    Rename {
        target: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to re-read {path} before commit")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{path} changed on disk while it was being rewritten")]
    ConcurrentModification { path: PathBuf },
}

/// A pending replacement of `target`.
///
/// Content goes to a temporary sibling file; [`AtomicFile::commit`] renames
/// it over the target. Dropping an uncommitted `AtomicFile` deletes the
/// temporary file and leaves the target untouched.
#[derive(Debug)]
#[must_use = "AtomicFile does nothing until commit() is called"]
pub struct AtomicFile {
    target: PathBuf,
    temp: NamedTempFile,
}

impl AtomicFile {
    /// Create the temporary file next to `target`.
    ///
    /// The temporary lives in the same directory so the final rename stays on
    /// one filesystem. If `target` exists, its permissions are copied over.
    pub fn create_for(target: impl AsRef<Path>) -> Result<Self, WriteError> {
        let target = target.as_ref().to_path_buf();
        let dir = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let base = target
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        // `.a.go.XXXXXX.tmp` never looks like a Go file to the walker.
        let temp = tempfile::Builder::new()
            .prefix(&format!(".{base}."))
            .suffix(".tmp")
            .tempfile_in(&dir)
            .map_err(|source| WriteError::CreateTemp { dir, source })?;

        if let Ok(metadata) = fs::metadata(&target) {
            temp.as_file()
                .set_permissions(metadata.permissions())
                .map_err(|source| WriteError::Permissions {
                    path: temp.path().to_path_buf(),
                    source,
                })?;
        }

        Ok(Self { target, temp })
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Path of the temporary file.
    pub fn temp_path(&self) -> &Path {
        self.temp.path()
    }

    /// Flush, fsync and close the temporary file, then rename it over the
    /// target. On error the temporary file is removed.
    pub fn commit(mut self) -> Result<(), WriteError> {
        let temp_path = self.temp.path().to_path_buf();

        self.temp
            .flush()
            .map_err(|source| WriteError::Write {
                path: temp_path.clone(),
                source,
            })?;
        self.temp
            .as_file()
            .sync_all()
            .map_err(|source| WriteError::Sync {
                path: temp_path,
                source,
            })?;

        let Self { target, temp } = self;
        // Closes the handle; the path is still deleted on drop until persisted.
        let path = temp.into_temp_path();
        path.persist(&target)
            .map_err(|err| WriteError::Rename {
                target,
                source: err.error,
            })
    }
}

impl Write for AtomicFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.temp.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.temp.flush()
    }
}

/// Replace `target` with content produced by `fill`.
///
/// If `fill` fails the temporary file is dropped and the target is never
/// touched.
pub fn write_with<F>(target: impl AsRef<Path>, fill: F) -> Result<(), WriteError>
where
    F: FnOnce(&mut AtomicFile) -> io::Result<()>,
{
    let mut file = AtomicFile::create_for(target)?;
    fill(&mut file).map_err(|source| WriteError::Write {
        path: file.temp_path().to_path_buf(),
        source,
    })?;
    file.commit()
}

/// Atomic file write: tempfile + fsync + rename.
pub fn atomic_write(target: impl AsRef<Path>, content: &[u8]) -> Result<(), WriteError> {
    write_with(target, |file| file.write_all(content))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dir_entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<_> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_atomic_write_replaces_content() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("a.go");
        fs::write(&file_path, b"original content").unwrap();

        atomic_write(&file_path, b"modified content").unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "modified content");
        assert_eq!(dir_entries(temp_dir.path()), ["a.go"]);
    }

    #[test]
    fn test_failed_fill_leaves_target_untouched() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("a.go");
        fs::write(&file_path, b"original content").unwrap();

        let result = write_with(&file_path, |file| {
            file.write_all(b"partial")?;
            Err(io::Error::other("injected failure"))
        });

        assert!(matches!(result, Err(WriteError::Write { .. })));
        assert_eq!(fs::read_to_string(&file_path).unwrap(), "original content");
        assert_eq!(dir_entries(temp_dir.path()), ["a.go"]);
    }

    #[test]
    fn test_dropped_file_is_cleaned_up() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("a.go");
        fs::write(&file_path, b"original content").unwrap();

        let mut pending = AtomicFile::create_for(&file_path).unwrap();
        pending.write_all(b"never committed").unwrap();
        let temp_path = pending.temp_path().to_path_buf();
        assert!(temp_path.exists());
        assert_eq!(pending.target(), file_path.as_path());
        drop(pending);

        assert!(!temp_path.exists());
        assert_eq!(fs::read_to_string(&file_path).unwrap(), "original content");
    }

    #[test]
    fn test_temp_file_is_a_hidden_sibling() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("a.go");

        let pending = AtomicFile::create_for(&file_path).unwrap();
        let temp_path = pending.temp_path().to_path_buf();
        assert_eq!(temp_path.parent(), Some(temp_dir.path()));

        let name = temp_path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with(".a.go."));
        assert!(name.ends_with(".tmp"));
    }

    #[test]
    fn test_commit_creates_missing_target() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("new.go");

        atomic_write(&file_path, b"package p\n").unwrap();
        assert_eq!(fs::read_to_string(&file_path).unwrap(), "package p\n");
    }

    #[test]
    fn test_missing_directory_is_create_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("missing/a.go");

        let result = atomic_write(&file_path, b"x");
        assert!(matches!(result, Err(WriteError::CreateTemp { .. })));
    }

    #[test]
    #[cfg(unix)]
    fn test_permissions_are_preserved() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("a.go");
        fs::write(&file_path, b"original").unwrap();
        fs::set_permissions(&file_path, fs::Permissions::from_mode(0o640)).unwrap();

        atomic_write(&file_path, b"modified").unwrap();

        let mode = fs::metadata(&file_path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o640);
    }
}
