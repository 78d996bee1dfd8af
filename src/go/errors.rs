use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GoError {
    #[error("failed to set tree-sitter language for Go parser")]
    LanguageSet,

    #[error("invalid tree-sitter query: {message}")]
    InvalidQuery { message: String },

    #[error("failed to parse source code")]
    ParseFailed,

    #[error("syntax error at {line}:{column} ({count} error node(s))")]
    Syntax {
        line: usize,
        column: usize,
        count: usize,
    },

    #[error("file is not valid UTF-8: {path}")]
    NotUtf8 { path: PathBuf },

    #[error("malformed import path literal: {literal}")]
    BadLiteral { literal: String },

    #[error("I/O error reading {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum FormatError {
    #[error("formatted output is not valid UTF-8")]
    NotUtf8,

    #[error("formatted output is not valid Go")]
    InvalidOutput(#[source] GoError),

    #[error("failed to run {program}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    Gofmt {
        program: PathBuf,
        status: ExitStatus,
        stderr: String,
    },
}
