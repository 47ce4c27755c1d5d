pub mod diff_parser;
pub mod error;
pub mod render;
pub mod stats;

pub use diff_parser::{
    ChangeType, DiffFile, DiffHunk, DiffLine, DiffParser, HunkHeader, HunkOperation, LineCursor,
};
pub use error::ParseError;
pub use stats::DiffStats;
