use anyhow::{Context, Result};
use std::io::{self, IsTerminal};
use tracing::{debug, info};

use crate::cli::Cli;
use crate::domain::git::{GitCli, Vcs};
use crate::domain::history::{scan_branch, BranchRange};
use crate::domain::resolve::{group_by_commit, Buckets};
use crate::domain::status::read_status;
use crate::presentation::report::{render_json, render_report, ReportView};

pub mod fixup;

/// Facts read once at startup and handed to every step.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub branch: String,
    pub range: BranchRange,
}

impl RunContext {
    pub fn load(vcs: &dyn Vcs, depth: usize) -> Result<Self> {
        let branch = vcs.current_branch()?;
        let remotes = vcs.remotes()?;
        let commits = scan_branch(vcs, &branch, &remotes, depth)?;
        debug!(%branch, ?remotes, commits = commits.len(), "scanned branch history");
        let range = BranchRange::from_commits(vcs, &branch, &commits)?;
        Ok(Self { branch, range })
    }
}

/// Status, then resolution: the read-only half of a run.
pub fn collect(vcs: &dyn Vcs, ctx: &RunContext) -> Result<Buckets> {
    let entries = read_status(vcs).context("failed to read working tree status")?;
    info!(files = entries.len(), range = %ctx.range.revspec(), "grouping changes");
    group_by_commit(vcs, &ctx.range, entries)
}

pub fn run(cli: Cli) -> Result<()> {
    if !io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    let vcs = GitCli::open(&cli.path)?;
    let ctx = RunContext::load(&vcs, cli.limit)?;
    let buckets = collect(&vcs, &ctx)?;

    let view = ReportView { branch: &ctx.branch, range: ctx.range.revspec(), buckets: &buckets };
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&render_json(&view))?);
        return Ok(());
    }
    println!("{}", render_report(&view));

    if !cli.fixup || buckets.is_empty() {
        return Ok(());
    }
    let stdin = io::stdin();
    if !fixup::confirm(&mut stdin.lock(), &mut io::stdout())? {
        println!("Aborted, nothing was committed.");
        return Ok(());
    }
    let outcome = fixup::execute(&vcs, &buckets)?;
    let summary = fixup::render_outcome(&outcome);
    if !summary.is_empty() {
        println!("{summary}");
    }
    Ok(())
}
