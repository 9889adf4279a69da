use anyhow::Result;
use serde::{Serialize, Serializer};
use std::fmt;
use tracing::debug;

use crate::domain::git::{LogQuery, Vcs};
use crate::domain::history::BranchRange;
use crate::domain::log_line::{parse_commit, CommitRef};
use crate::domain::status::StatusEntry;

pub const NO_HASH: &str = "no-hash";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BucketKey {
    Commit(String),
    /// Files the branch never committed.
    NoHash,
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BucketKey::Commit(hash) => f.write_str(hash),
            BucketKey::NoHash => f.write_str(NO_HASH),
        }
    }
}

impl Serialize for BucketKey {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bucket {
    #[serde(rename = "hash")]
    pub key: BucketKey,
    pub message: String,
    pub files: Vec<StatusEntry>,
}

impl Bucket {
    pub fn is_sentinel(&self) -> bool {
        self.key == BucketKey::NoHash
    }
}

/// Buckets in the order their key was first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Buckets(Vec<Bucket>);

impl Buckets {
    pub fn insert(&mut self, owner: Option<CommitRef>, entry: StatusEntry) {
        let (key, message) = match owner {
            Some(c) => (BucketKey::Commit(c.hash), c.message),
            None => (BucketKey::NoHash, String::new()),
        };
        match self.0.iter_mut().find(|b| b.key == key) {
            Some(bucket) => bucket.files.push(entry),
            None => self.0.push(Bucket { key, message, files: vec![entry] }),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &BucketKey) -> Option<&Bucket> {
        self.0.iter().find(|b| &b.key == key)
    }

    pub fn commits(&self) -> impl Iterator<Item = &Bucket> {
        self.0.iter().filter(|b| !b.is_sentinel())
    }

    pub fn sentinel(&self) -> Option<&Bucket> {
        self.get(&BucketKey::NoHash)
    }

    /// Commit buckets in insertion order, then the sentinel.
    pub fn in_report_order(&self) -> impl Iterator<Item = &Bucket> {
        self.commits().chain(self.sentinel())
    }

    pub fn file_count(&self) -> usize {
        self.0.iter().map(|b| b.files.len()).sum()
    }
}

/// Most recent commit in `range` that touched the entry's file.
pub fn owning_commit(vcs: &dyn Vcs, range: &BranchRange, entry: &StatusEntry) -> Result<Option<CommitRef>> {
    let log = vcs.log(&LogQuery::file_in_range(&range.revspec(), entry.history_path()))?;
    Ok(log.lines().find_map(parse_commit))
}

pub fn group_by_commit(vcs: &dyn Vcs, range: &BranchRange, entries: Vec<StatusEntry>) -> Result<Buckets> {
    let mut buckets = Buckets::default();
    for entry in entries {
        let owner = owning_commit(vcs, range, &entry)?;
        debug!(path = %entry.path, owner = ?owner.as_ref().map(|c| &c.hash), "resolved");
        buckets.insert(owner, entry);
    }
    debug!(files = buckets.file_count(), "grouped");
    Ok(buckets)
}
