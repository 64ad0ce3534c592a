use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("failed to read source: {0}")]
    SourceIo(#[from] std::io::Error),
    #[error("standard library directory was not found at {0}")]
    MissingStdlib(PathBuf),
    #[error("invalid library registry at {path}: {message}")]
    Registry { path: PathBuf, message: String },
    #[error("syntax error: brackets are unbalanced by {} \"]\"", signed(.diff))]
    Unbalanced { diff: i64 },
    #[error("compile error: {0}")]
    CompileError(String),
    #[error("runtime error: {0}")]
    RuntimeError(String),
    #[error("invalid compiled unit: {0}")]
    InvalidUnit(String),
    #[error("unsupported artifact shape: {0}")]
    UnsupportedShape(String),
    #[error("compression alphabet must not be empty")]
    EmptyAlphabet,
    #[error("compression alphabet repeats the letter {0:?}")]
    DuplicateLetter(char),
}

fn signed(diff: &i64) -> String {
    if *diff > 0 {
        format!("+{diff}")
    } else {
        diff.to_string()
    }
}
