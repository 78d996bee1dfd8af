use crate::pattern::PatternError;
use crate::walk::WalkError;
use thiserror::Error;

/// Errors that abort a whole run. Per-file problems never show up here;
/// they are recorded in the [`Report`](crate::report::Report) instead.
#[derive(Error, Debug)]
pub enum RenameError {
    #[error(transparent)]
    Pattern(#[from] PatternError),

    #[error(transparent)]
    Walk(#[from] WalkError),
}
