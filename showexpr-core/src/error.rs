//! Error types
//!
//! None of these reach a `show!` caller: every label strategy turns its
//! errors into "no labels" and the next strategy runs.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShowError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {message}")]
    Parse { message: String },

    #[error("No source available for '{file}'")]
    SourceUnavailable { file: String },

    #[error("Malformed history record at {}:{line}: {message}", path.display())]
    MalformedHistory {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("A global Show is already installed")]
    AlreadyInstalled,
}

impl ShowError {
    pub fn parse(message: impl ToString) -> Self {
        ShowError::Parse {
            message: message.to_string(),
        }
    }

    pub fn source_unavailable(file: impl Into<String>) -> Self {
        ShowError::SourceUnavailable { file: file.into() }
    }
}

impl From<syn::Error> for ShowError {
    fn from(e: syn::Error) -> Self {
        ShowError::parse(e)
    }
}
