use anyhow::Result;
use colored::Colorize;
use std::io::{BufRead, Write};
use tracing::{info, warn};

use crate::domain::git::Vcs;
use crate::domain::resolve::Buckets;
use crate::domain::status::StatusEntry;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct FixupOutcome {
    pub committed: Vec<String>,
    pub failed: Vec<String>,
    pub ignored: Vec<StatusEntry>,
}

/// Asks once; only `y`/`Y` proceeds. End of input counts as no.
pub fn confirm(input: &mut impl BufRead, out: &mut impl Write) -> Result<bool> {
    write!(out, "\nProceed to fixup? (y/n) ")?;
    out.flush()?;
    let mut answer = String::new();
    if input.read_line(&mut answer)? == 0 {
        return Ok(false);
    }
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

/// One fixup commit per commit bucket, in report order.
///
/// A bucket whose staging or commit fails is unstaged with `git reset` and
/// recorded; the remaining buckets still run.
pub fn execute(vcs: &dyn Vcs, buckets: &Buckets) -> Result<FixupOutcome> {
    let mut outcome = FixupOutcome::default();

    for bucket in buckets.commits() {
        let hash = bucket.key.to_string();
        let paths: Vec<&str> = bucket.files.iter().map(|f| f.path.as_str()).collect();

        let done = vcs.stage(&paths)? && vcs.commit_fixup(&hash)?;
        if done {
            info!(%hash, files = paths.len(), "created fixup commit");
            outcome.committed.push(hash);
        } else {
            warn!(%hash, "fixup failed, unstaging");
            vcs.unstage_all()?;
            outcome.failed.push(hash);
        }
    }

    if let Some(sentinel) = buckets.sentinel() {
        outcome.ignored = sentinel.files.clone();
    }
    Ok(outcome)
}

pub fn render_outcome(outcome: &FixupOutcome) -> String {
    let mut out = Vec::new();
    if !outcome.committed.is_empty() {
        out.push(format!("\n{} {} fixup commit(s) created.", "OK    >".green(), outcome.committed.len()));
    }
    if !outcome.failed.is_empty() {
        out.push(format!(
            "\n{} There was an error when running git fixup in the following commits:",
            "ERROR >".red()
        ));
        for hash in &outcome.failed {
            out.push(format!("{} {hash}", "      >".red()));
        }
    }
    if !outcome.ignored.is_empty() {
        out.push(format!(
            "\n{} The following files were ignored for not being committed in this branch yet:",
            "INFO  >".cyan()
        ));
        for f in &outcome.ignored {
            out.push(format!("{} {}", "      >".cyan(), f.path));
        }
    }
    out.join("\n")
}
