use std::num::ParseIntError;
use std::path::PathBuf;
use std::string::FromUtf8Error;
use thiserror::Error;

/// Failures surfaced while turning ed-style diff text into a `DiffFile`.
///
/// Every variant is terminal for a single parse call; no partial result is produced.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("invalid hunk header {header:?}: {source}")]
    InvalidHeader {
        header: String,
        #[source]
        source: ParseIntError,
    },

    #[error("line number overflow in hunk {header:?}")]
    LineNumberOverflow { header: String },

    #[error("diff contains no hunks")]
    Empty,

    #[error("failed to read diff {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("diff {} is not valid UTF-8: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: FromUtf8Error,
    },
}

pub type Result<T> = std::result::Result<T, ParseError>;
