//! Parser for normal (ed-style) diff output.
//!
//! ```
//! use edscope::{ChangeType, DiffParser};
//!
//! let diff = DiffParser::parse_diff("3c3\n< old line\n---\n> new line\n").unwrap();
//! assert_eq!(diff.hunks[0].lines[1].change_type, ChangeType::Added);
//! ```

pub mod config;
pub mod core;

pub use crate::core::{
    ChangeType, DiffFile, DiffHunk, DiffLine, DiffParser, DiffStats, HunkHeader, HunkOperation,
    ParseError,
};
