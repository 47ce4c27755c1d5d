use crate::core::diff_parser::{ChangeType, DiffFile, DiffHunk, DiffLine, HunkOperation};

/// Re-emit a parsed diff as normal (ed-style) diff text.
///
/// Header ranges are recomputed from each hunk's start lines and line counts.
pub fn to_normal_diff(diff: &DiffFile) -> String {
    let mut output = String::new();

    for hunk in &diff.hunks {
        output.push_str(&format_header(hunk));
        output.push('\n');

        for line in lines_of(hunk, ChangeType::Removed) {
            output.push_str(&format!("<{}\n", line.text));
        }
        if hunk.removed_count() > 0 && hunk.added_count() > 0 {
            output.push_str("---\n");
        }
        for line in lines_of(hunk, ChangeType::Added) {
            output.push_str(&format!(">{}\n", line.text));
        }
    }

    output
}

pub fn to_markdown(diff: &DiffFile) -> String {
    let mut output = String::new();
    let stats = diff.stats();

    output.push_str(&format!(
        "# Diff: {}\n\n",
        diff.file_name.as_deref().unwrap_or("<stdin>")
    ));
    output.push_str(&format!("**{}**\n\n", stats.summary()));

    for (index, hunk) in diff.hunks.iter().enumerate() {
        output.push_str(&format!("## Hunk {}: `{}`\n\n", index + 1, format_header(hunk)));
        output.push_str("```diff\n");
        for line in &hunk.lines {
            let prefix = match line.change_type {
                ChangeType::Removed => '-',
                ChangeType::Added => '+',
            };
            output.push_str(&format!("{} {:>5} |{}\n", prefix, line.line_number, line.text));
        }
        output.push_str("```\n\n");
    }

    output
}

pub fn format_header(hunk: &DiffHunk) -> String {
    let header = &hunk.header;
    let removed = hunk.removed_count();
    let added = hunk.added_count();

    let operation = match (removed, added) {
        (0, 0) => header.operation.unwrap_or(HunkOperation::Change),
        (_, 0) => HunkOperation::Delete,
        (0, _) => HunkOperation::Add,
        _ => HunkOperation::Change,
    };

    let (previous, current) = match operation {
        HunkOperation::Add => (
            header.previous_start_line.to_string(),
            format_range(header.current_start_line, added),
        ),
        HunkOperation::Delete => (
            format_range(header.previous_start_line, removed),
            header.current_start_line.to_string(),
        ),
        HunkOperation::Change => (
            format_range(header.previous_start_line, removed),
            format_range(header.current_start_line, added),
        ),
    };

    format!("{}{}{}", previous, operation.as_char(), current)
}

fn format_range(start: usize, count: usize) -> String {
    if count > 1 {
        format!("{},{}", start, start.saturating_add(count - 1))
    } else {
        start.to_string()
    }
}

fn lines_of(hunk: &DiffHunk, change_type: ChangeType) -> impl Iterator<Item = &DiffLine> {
    hunk.lines
        .iter()
        .filter(move |line| line.change_type == change_type)
}
