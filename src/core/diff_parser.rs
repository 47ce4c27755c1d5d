use crate::core::error::{ParseError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

/// Operator characters that separate the two ranges of a hunk header.
const HEADER_OPERATORS: [char; 3] = ['a', 'c', 'd'];

/// Leading characters that keep a line inside the current hunk group.
/// `-` covers the `---` separator of change hunks and `\` covers
/// `\ No newline at end of file` annotations.
const MARKER_PREFIXES: [char; 4] = ['>', '<', '-', '\\'];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffFile {
    pub file_name: Option<String>,
    pub hunks: Vec<DiffHunk>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffHunk {
    pub header: HunkHeader,
    pub lines: Vec<DiffLine>,
}

/// 1-based start lines declared by a hunk header such as `5,7c5,6`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HunkHeader {
    pub previous_start_line: usize,
    pub current_start_line: usize,
    pub operation: Option<HunkOperation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HunkOperation {
    Add,
    Change,
    Delete,
}

impl HunkOperation {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'a' => Some(Self::Add),
            'c' => Some(Self::Change),
            'd' => Some(Self::Delete),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Self::Add => 'a',
            Self::Change => 'c',
            Self::Delete => 'd',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffLine {
    pub text: String,
    pub line_number: usize,
    pub change_type: ChangeType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeType {
    Removed,
    Added,
}

impl DiffHunk {
    pub fn added_count(&self) -> usize {
        self.count(ChangeType::Added)
    }

    pub fn removed_count(&self) -> usize {
        self.count(ChangeType::Removed)
    }

    fn count(&self, change_type: ChangeType) -> usize {
        self.lines
            .iter()
            .filter(|line| line.change_type == change_type)
            .count()
    }
}

/// Per-hunk numbering state threaded through `DiffParser::classify_lines`.
///
/// Offsets count how many removed/added lines have been seen since the hunk
/// header or the last `---` separator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineCursor {
    pub previous_offset: usize,
    pub current_offset: usize,
}

impl LineCursor {
    /// Consume one raw line of a hunk group, returning the next cursor and the
    /// classified line, if the raw line produces one.
    ///
    /// Returns `None` when the line number does not fit in a `usize`.
    pub fn step(self, header: &HunkHeader, raw: &str) -> Option<(Self, Option<DiffLine>)> {
        let mut chars = raw.chars();
        let marker = chars.next();
        let text = chars.as_str().to_string();

        match marker {
            Some('<') => {
                let line = DiffLine {
                    text,
                    line_number: header
                        .previous_start_line
                        .checked_add(self.previous_offset)?,
                    change_type: ChangeType::Removed,
                };
                let next = Self {
                    previous_offset: self.previous_offset + 1,
                    ..self
                };
                Some((next, Some(line)))
            }
            Some('>') => {
                let line = DiffLine {
                    text,
                    line_number: header
                        .current_start_line
                        .checked_add(self.current_offset)?,
                    change_type: ChangeType::Added,
                };
                let next = Self {
                    current_offset: self.current_offset + 1,
                    ..self
                };
                Some((next, Some(line)))
            }
            Some('\\') => Some((self, None)),
            // Header and `---` separator lines restart numbering.
            _ => Some((Self::default(), None)),
        }
    }
}

pub struct DiffParser;

impl DiffParser {
    /// Parse normal (ed-style) diff text such as `3c3\n< old\n---\n> new\n`.
    ///
    /// The returned `DiffFile` has no `file_name`; use `parse_diff_file` when
    /// the diff comes from disk.
    pub fn parse_diff(diff_content: &str) -> Result<DiffFile> {
        let lines: Vec<&str> = diff_content.lines().collect();
        Self::parse_lines(&lines).inspect_err(|err| warn!("Failed to parse diff: {}", err))
    }

    /// Read a diff from disk, decode it as UTF-8 and parse it, recording the
    /// path as the result's `file_name`.
    pub fn parse_diff_file(path: impl AsRef<Path>) -> Result<DiffFile> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| ParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let text = String::from_utf8(bytes).map_err(|source| ParseError::Decode {
            path: path.to_path_buf(),
            source,
        })?;

        let mut file = Self::parse_diff(&text)?;
        file.file_name = Some(path.display().to_string());
        Ok(file)
    }

    pub fn parse_lines(lines: &[&str]) -> Result<DiffFile> {
        let mut hunks = Vec::new();

        for group in Self::segment_lines(lines) {
            match group.first() {
                Some(header_line) if !header_line.is_empty() => {
                    hunks.push(Self::parse_hunk(header_line, &group)?);
                }
                _ => debug!("Skipping degenerate hunk group of {} lines", group.len()),
            }
        }

        Self::assemble(hunks)
    }

    /// Split raw lines into groups of one header line followed by its
    /// marker lines. The trailing buffer is always flushed, so the last group
    /// may be empty.
    pub fn segment_lines<'a>(lines: &[&'a str]) -> Vec<Vec<&'a str>> {
        let mut groups = Vec::new();
        let mut buffer: Vec<&'a str> = Vec::new();

        for &line in lines {
            if !Self::is_marker_line(line) && !buffer.is_empty() {
                groups.push(std::mem::take(&mut buffer));
            }
            buffer.push(line);
        }
        groups.push(buffer);

        groups
    }

    fn is_marker_line(line: &str) -> bool {
        line.starts_with(MARKER_PREFIXES)
    }

    /// Parse a header line (`3c3`, `5a6,7`, `8,9d7`) into its start lines.
    ///
    /// A header that does not split into exactly two ranges yields zero for
    /// both start lines.
    pub fn parse_hunk_header(header: &str) -> Result<HunkHeader> {
        let ranges: Vec<&str> = header.split(HEADER_OPERATORS).collect();
        if ranges.len() != 2 {
            return Ok(HunkHeader::default());
        }

        Ok(HunkHeader {
            previous_start_line: Self::parse_range_start(header, ranges[0])?,
            current_start_line: Self::parse_range_start(header, ranges[1])?,
            operation: header.chars().find_map(HunkOperation::from_char),
        })
    }

    fn parse_range_start(header: &str, range: &str) -> Result<usize> {
        let start = range.split(',').next().unwrap_or_default();
        if start.is_empty() {
            return Ok(0);
        }

        start.parse().map_err(|source| ParseError::InvalidHeader {
            header: header.to_string(),
            source,
        })
    }

    /// Classify the marker lines of one hunk group, numbering removed lines
    /// from the previous start line and added lines from the current one.
    ///
    /// The first line of `group` is the header and names the hunk in errors.
    pub fn classify_lines(group: &[&str], header: &HunkHeader) -> Result<Vec<DiffLine>> {
        let (_, lines) = group.iter().try_fold(
            (LineCursor::default(), Vec::new()),
            |(cursor, mut lines), raw| {
                let (next, line) =
                    cursor
                        .step(header, raw)
                        .ok_or_else(|| ParseError::LineNumberOverflow {
                            header: group.first().copied().unwrap_or_default().to_string(),
                        })?;
                lines.extend(line);
                Ok::<_, ParseError>((next, lines))
            },
        )?;
        Ok(lines)
    }

    fn parse_hunk(header_line: &str, group: &[&str]) -> Result<DiffHunk> {
        let header = Self::parse_hunk_header(header_line)?;
        let hunk = DiffHunk {
            header,
            lines: Self::classify_lines(group, &header)?,
        };
        debug!(
            "Parsed hunk {:?}: {} removed, {} added",
            header_line,
            hunk.removed_count(),
            hunk.added_count()
        );

        Ok(hunk)
    }

    pub fn assemble(hunks: Vec<DiffHunk>) -> Result<DiffFile> {
        if hunks.is_empty() {
            return Err(ParseError::Empty);
        }

        Ok(DiffFile {
            file_name: None,
            hunks,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn removed(text: &str, line_number: usize) -> DiffLine {
        DiffLine {
            text: text.to_string(),
            line_number,
            change_type: ChangeType::Removed,
        }
    }

    fn added(text: &str, line_number: usize) -> DiffLine {
        DiffLine {
            text: text.to_string(),
            line_number,
            change_type: ChangeType::Added,
        }
    }

    #[test]
    fn test_parse_empty_input_fails() {
        assert!(matches!(DiffParser::parse_diff(""), Err(ParseError::Empty)));
        assert!(matches!(DiffParser::parse_diff("\n\n"), Err(ParseError::Empty)));
    }

    #[test]
    fn test_parse_change_hunk() {
        let diff = DiffParser::parse_diff("3c3\n< old line\n---\n> new line\n").unwrap();

        assert_eq!(diff.file_name, None);
        assert_eq!(diff.hunks.len(), 1);
        let hunk = &diff.hunks[0];
        assert_eq!(hunk.header.previous_start_line, 3);
        assert_eq!(hunk.header.current_start_line, 3);
        assert_eq!(hunk.header.operation, Some(HunkOperation::Change));
        assert_eq!(
            hunk.lines,
            vec![removed(" old line", 3), added(" new line", 3)]
        );
    }

    #[test]
    fn test_parse_delete_hunk() {
        let diff = DiffParser::parse_diff("3d2\n< a\n< b\n").unwrap();

        assert_eq!(diff.hunks[0].lines, vec![removed("a", 3), removed("b", 4)]);
    }

    #[test]
    fn test_separator_resets_numbering() {
        let diff = DiffParser::parse_diff("2c2\n< x\n< y\n---\n> p\n> q\n").unwrap();

        assert_eq!(
            diff.hunks[0].lines,
            vec![removed("x", 2), removed("y", 3), added("p", 2), added("q", 3)]
        );
    }

    #[test]
    fn test_append_header_uses_declared_ranges() {
        let diff = DiffParser::parse_diff("2a3,4\n> new1\n> new2\n").unwrap();

        let hunk = &diff.hunks[0];
        assert_eq!(hunk.header.previous_start_line, 2);
        assert_eq!(hunk.header.current_start_line, 3);
        assert_eq!(hunk.header.operation, Some(HunkOperation::Add));
        assert_eq!(hunk.lines, vec![added("new1", 3), added("new2", 4)]);
    }

    #[test]
    fn test_hunk_order_is_preserved() {
        let diff = DiffParser::parse_diff("1d0\n< first\n5a5\n> fifth\n").unwrap();

        assert_eq!(diff.hunks.len(), 2);
        assert_eq!(diff.hunks[0].header.previous_start_line, 1);
        assert_eq!(diff.hunks[0].lines, vec![removed("first", 1)]);
        assert_eq!(diff.hunks[1].header.previous_start_line, 5);
        assert_eq!(diff.hunks[1].lines, vec![added("fifth", 5)]);
    }

    #[test]
    fn test_non_numeric_header_fails_whole_parse() {
        let result = DiffParser::parse_diff("1d0\n< ok\nxc3\n< a\n---\n> b\n");

        match result {
            Err(ParseError::InvalidHeader { header, .. }) => assert_eq!(header, "xc3"),
            other => panic!("expected InvalidHeader, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_hunk_header_ranges() {
        let header = DiffParser::parse_hunk_header("5,7c10,12").unwrap();
        assert_eq!(header.previous_start_line, 5);
        assert_eq!(header.current_start_line, 10);

        let header = DiffParser::parse_hunk_header("8,9d7").unwrap();
        assert_eq!(header.previous_start_line, 8);
        assert_eq!(header.current_start_line, 7);
        assert_eq!(header.operation, Some(HunkOperation::Delete));
    }

    #[test]
    fn test_negative_range_is_invalid_header() {
        let result = DiffParser::parse_hunk_header("3c-1");
        assert!(matches!(result, Err(ParseError::InvalidHeader { .. })));
    }

    #[test]
    fn test_header_without_operator_defaults_to_zero() {
        let header = DiffParser::parse_hunk_header("12").unwrap();
        assert_eq!(header, HunkHeader::default());

        let header = DiffParser::parse_hunk_header("1c2c3").unwrap();
        assert_eq!(header.previous_start_line, 0);
        assert_eq!(header.current_start_line, 0);
        assert_eq!(header.operation, None);
    }

    #[test]
    fn test_segment_lines_keeps_separator_in_hunk() {
        let lines = ["1c1", "< a", "---", "> b", "4d3", "< c"];
        let groups = DiffParser::segment_lines(&lines);

        assert_eq!(
            groups,
            vec![vec!["1c1", "< a", "---", "> b"], vec!["4d3", "< c"]]
        );
    }

    #[test]
    fn test_segment_lines_flushes_empty_buffer() {
        let groups = DiffParser::segment_lines(&[]);
        assert_eq!(groups, vec![Vec::<&str>::new()]);
    }

    #[test]
    fn test_line_cursor_resets_on_separator() {
        let header = HunkHeader {
            previous_start_line: 4,
            current_start_line: 9,
            operation: Some(HunkOperation::Change),
        };
        let (cursor, _) = LineCursor::default().step(&header, "<x").unwrap();
        let (cursor, _) = cursor.step(&header, ">y").unwrap();
        assert_eq!(
            cursor,
            LineCursor {
                previous_offset: 1,
                current_offset: 1
            }
        );

        let (cursor, line) = cursor.step(&header, "---").unwrap();
        assert_eq!(line, None);
        assert_eq!(cursor, LineCursor::default());
    }

    #[test]
    fn test_line_number_overflow_fails_cleanly() {
        let result = DiffParser::parse_diff("18446744073709551615d1\n< a\n< b\n");

        match result {
            Err(ParseError::LineNumberOverflow { header }) => {
                assert_eq!(header, "18446744073709551615d1")
            }
            other => panic!("expected LineNumberOverflow, got {:?}", other),
        }
    }

    #[test]
    fn test_max_start_line_with_single_line_parses() {
        let diff = DiffParser::parse_diff("18446744073709551615d1\n< a\n").unwrap();
        assert_eq!(diff.hunks[0].lines, vec![removed(" a", usize::MAX)]);
    }

    #[test]
    fn test_line_cursor_reports_overflow() {
        let header = HunkHeader {
            previous_start_line: usize::MAX,
            current_start_line: 1,
            operation: Some(HunkOperation::Delete),
        };
        let (cursor, _) = LineCursor::default().step(&header, "<a").unwrap();
        assert_eq!(cursor.step(&header, "<b"), None);
    }

    #[test]
    fn test_no_newline_annotation_is_ignored() {
        let diff = DiffParser::parse_diff(
            "1c1\n< a\n\\ No newline at end of file\n---\n> b\n\\ No newline at end of file\n",
        )
        .unwrap();

        assert_eq!(diff.hunks.len(), 1);
        assert_eq!(diff.hunks[0].lines, vec![removed(" a", 1), added(" b", 1)]);
    }

    #[test]
    fn test_marker_strip_is_char_aware() {
        let diff = DiffParser::parse_diff("1a2\n>é\n").unwrap();
        assert_eq!(diff.hunks[0].lines, vec![added("é", 2)]);
    }

    #[test]
    fn test_hunk_counts() {
        let diff = DiffParser::parse_diff("2c2\n< x\n< y\n---\n> p\n").unwrap();
        assert_eq!(diff.hunks[0].removed_count(), 2);
        assert_eq!(diff.hunks[0].added_count(), 1);
    }
}
