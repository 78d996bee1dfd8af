use thiserror::Error;

#[derive(Error, Debug)]
pub enum PatternError {
    #[error("match pattern is empty")]
    EmptyPattern,

    #[error("invalid match pattern: {pattern}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
