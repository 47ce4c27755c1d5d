use crate::core::diff_parser::DiffFile;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DiffStats {
    pub hunks: usize,
    pub added: usize,
    pub removed: usize,
}

impl DiffStats {
    pub fn changed(&self) -> usize {
        self.added + self.removed
    }

    pub fn summary(&self) -> String {
        format!(
            "{} hunk{}, {} insertion{}(+), {} deletion{}(-)",
            self.hunks,
            plural(self.hunks),
            self.added,
            plural(self.added),
            self.removed,
            plural(self.removed)
        )
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

impl DiffFile {
    pub fn stats(&self) -> DiffStats {
        self.hunks.iter().fold(
            DiffStats {
                hunks: self.hunks.len(),
                ..DiffStats::default()
            },
            |stats, hunk| DiffStats {
                added: stats.added + hunk.added_count(),
                removed: stats.removed + hunk.removed_count(),
                ..stats
            },
        )
    }
}
