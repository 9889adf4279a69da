use anyhow::Result;
use tracing::debug;

use crate::domain::git::{LogQuery, Vcs};
use crate::domain::log_line::{parse_decorated, CommitRef};
use crate::error::FixupError;

/// Commits that belong to `branch` alone, newest first.
///
/// Walks the newest `depth` commits and stops at the first decorated one
/// whose refs do not include `branch` (or a remote copy of it): that is
/// where `branch` forked off. An unparsable line also ends the walk.
pub fn scan_branch(vcs: &dyn Vcs, branch: &str, remotes: &[String], depth: usize) -> Result<Vec<CommitRef>> {
    let log = vcs.log(&LogQuery::recent(depth))?;
    let mut commits = Vec::new();
    for line in log.lines() {
        let Some(commit) = parse_decorated(line) else {
            debug!(line, "stopping scan at unparsable log line");
            break;
        };
        if commit.decorations.marks_boundary(branch, remotes) {
            debug!(hash = %commit.hash, "branch boundary");
            break;
        }
        commits.push(CommitRef::from(commit));
    }
    Ok(commits)
}

/// Span of history owned by the current branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchRange {
    /// Parent of the oldest branch commit; `None` when that commit is a root.
    pub base: Option<String>,
    pub tip: String,
}

impl BranchRange {
    pub fn from_commits(vcs: &dyn Vcs, branch: &str, commits: &[CommitRef]) -> Result<Self> {
        let (Some(newest), Some(oldest)) = (commits.first(), commits.last()) else {
            return Err(FixupError::EmptyBranch { branch: branch.to_string() }.into());
        };
        let parent = format!("{}~1", oldest.hash);
        let base = vcs.rev_exists(&parent)?.then_some(parent);
        Ok(Self { base, tip: newest.hash.clone() })
    }

    pub fn revspec(&self) -> String {
        match &self.base {
            Some(base) => format!("{base}..{}", self.tip),
            None => self.tip.clone(),
        }
    }
}
