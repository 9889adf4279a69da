use anyhow::Result;
use serde::Serialize;

use crate::domain::git::Vcs;

/// One record of `git status --porcelain -z`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusEntry {
    #[serde(rename = "status")]
    pub code: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_path: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Added,
    Removed,
    Modified,
    Untracked,
    Renamed,
    Other,
}

impl StatusEntry {
    pub fn new(code: &str, path: &str) -> Self {
        Self { code: code.to_string(), path: path.to_string(), original_path: None }
    }

    /// Keyed on the index column first, so `MM` and `AM` keep their
    /// staged meaning.
    pub fn kind(&self) -> StatusKind {
        if self.code == "??" {
            return StatusKind::Untracked;
        }
        match self.code.chars().next() {
            Some('A') => StatusKind::Added,
            Some('D') => StatusKind::Removed,
            Some('M') => StatusKind::Modified,
            Some('R') => StatusKind::Renamed,
            _ => StatusKind::Other,
        }
    }

    /// Single-character marker shown in the report.
    pub fn marker(&self) -> char {
        self.code.chars().next().unwrap_or(' ')
    }

    /// Where the file lived in history: the pre-rename path when there is one.
    pub fn history_path(&self) -> &str {
        self.original_path.as_deref().unwrap_or(&self.path)
    }
}

pub fn read_status(vcs: &dyn Vcs) -> Result<Vec<StatusEntry>> {
    Ok(parse_status(&vcs.status()?))
}

/// Parses NUL-separated porcelain records. Paths arrive verbatim (no C
/// quoting); a rename or copy carries its source path in the next record.
pub fn parse_status(output: &str) -> Vec<StatusEntry> {
    let mut records = output.split('\0').filter(|r| !r.is_empty());
    let mut entries = Vec::new();
    while let Some(record) = records.next() {
        let (Some(code), Some(path)) = (record.get(..2), record.get(3..)) else {
            continue;
        };
        let code = code.trim();
        if code.is_empty() || path.is_empty() {
            continue;
        }
        let mut entry = StatusEntry::new(code, path);
        if code.contains(|c| c == 'R' || c == 'C') {
            entry.original_path = records.next().map(str::to_string);
        }
        entries.push(entry);
    }
    entries
}
