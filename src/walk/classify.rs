use std::path::PathBuf;
use walkdir::DirEntry;

/// File name suffix of candidate source files.
pub const SOURCE_SUFFIX: &str = ".go";

const HIDDEN_MARKER: char = '.';

/// A filesystem node seen during traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraversalEntry {
    pub absolute_path: PathBuf,
    pub is_directory: bool,
    pub is_symlink: bool,
    /// For the root, the last component of the path as the caller wrote it
    /// (`.` when it has none).
    pub base_name: String,
    /// Zero for the traversal root.
    pub depth: usize,
}

impl TraversalEntry {
    pub fn from_dir_entry(entry: &DirEntry) -> Self {
        Self {
            absolute_path: entry.path().to_path_buf(),
            is_directory: entry.file_type().is_dir(),
            is_symlink: entry.path_is_symlink(),
            base_name: entry.file_name().to_string_lossy().into_owned(),
            depth: entry.depth(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Directory to traverse.
    Descend,
    /// Hidden directory; nothing below it is visited.
    SkipSubtree,
    /// Source file to hand to the rewriter.
    Candidate,
    /// Anything else.
    Ignore,
}

/// Decide what to do with a traversal entry. Looks at nothing but the entry.
pub fn classify(entry: &TraversalEntry) -> Classification {
    if entry.is_directory {
        if is_hidden(&entry.base_name) {
            return Classification::SkipSubtree;
        }
        return Classification::Descend;
    }

    if entry.base_name.ends_with(SOURCE_SUFFIX) {
        Classification::Candidate
    } else {
        Classification::Ignore
    }
}

/// `.git`, `.cache`, ... but not `.` or `..`.
fn is_hidden(name: &str) -> bool {
    name.starts_with(HIDDEN_MARKER) && name.len() > HIDDEN_MARKER.len_utf8() && name != ".."
}
