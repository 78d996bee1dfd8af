use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WalkError {
    #[error("failed to resolve absolute path of {path}")]
    Resolve {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read root {path}")]
    Root {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to traverse root {path}")]
    Traverse {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}
