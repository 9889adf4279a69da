use anyhow::{Context, Result};
use git2::{ErrorCode, Repository};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tracing::{debug, warn};

use crate::error::FixupError;

/// `%h -%d %s (%cr) <%an>` with a unit separator (`%x1f`) on each side of
/// the subject. Parsed by `domain::log_line`.
pub const LOG_FORMAT: &str = "format:%h -%d%x1f %s%x1f (%cr) <%an>";

/// One `git log` request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogQuery {
    pub max_count: Option<usize>,
    pub revspec: Option<String>,
    pub follow: bool,
    pub path: Option<String>,
}

impl LogQuery {
    pub fn recent(max_count: usize) -> Self {
        Self { max_count: Some(max_count), ..Self::default() }
    }

    pub fn file_in_range(revspec: &str, path: &str) -> Self {
        Self {
            revspec: Some(revspec.to_string()),
            follow: true,
            path: Some(path.to_string()),
            ..Self::default()
        }
    }

    fn args(&self) -> Vec<String> {
        let mut args = vec![
            "log".to_string(),
            "--no-color".to_string(),
            format!("--pretty={LOG_FORMAT}"),
        ];
        if let Some(n) = self.max_count {
            args.push(format!("-{n}"));
        }
        if let Some(rev) = &self.revspec {
            args.push(rev.clone());
        }
        if self.follow {
            args.push("--follow".to_string());
        }
        if let Some(path) = &self.path {
            args.push("--".to_string());
            args.push(path.clone());
        }
        args
    }
}

/// Everything the tool asks of the repository.
///
/// Queries return git's raw text; parsing stays in the domain modules so it
/// can be fed canned output in tests. Write operations report git's exit
/// status as a bool, because a failing fixup is recoverable.
pub trait Vcs {
    fn current_branch(&self) -> Result<String>;
    fn remotes(&self) -> Result<Vec<String>>;
    fn rev_exists(&self, rev: &str) -> Result<bool>;
    fn status(&self) -> Result<String>;
    fn log(&self, query: &LogQuery) -> Result<String>;
    fn stage(&self, paths: &[&str]) -> Result<bool>;
    fn commit_fixup(&self, hash: &str) -> Result<bool>;
    fn unstage_all(&self) -> Result<()>;
}

/// `git` on the command line, plus libgit2 for cheap lookups.
pub struct GitCli {
    repo: Repository,
    workdir: PathBuf,
}

impl GitCli {
    pub fn open(path: &str) -> Result<Self> {
        let repo = Repository::discover(path)
            .map_err(|_| FixupError::NotARepository { path: path.to_string() })
            .with_context(|| format!("cannot open repo at {path}"))?;
        let workdir = repo
            .workdir()
            .map(Path::to_path_buf)
            .ok_or(FixupError::BareRepository)?;
        debug!(workdir = %workdir.display(), "opened repository");
        Ok(Self { repo, workdir })
    }

    fn output(&self, args: &[&str]) -> Result<Output> {
        let command = format!("git {}", args.join(" "));
        debug!(%command, "running");
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .output()
            .map_err(|source| FixupError::Spawn { command: command.clone(), source })?;
        if !output.status.success() {
            debug!(%command, status = %output.status, "git exited with failure");
        }
        Ok(output)
    }

    /// Runs a read-only query; a non-zero exit is fatal.
    fn query(&self, args: &[&str]) -> Result<String> {
        let output = self.output(args)?;
        if !output.status.success() {
            return Err(FixupError::GitCommand {
                command: format!("git {}", args.join(" ")),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Runs a write command; a non-zero exit is reported, not raised.
    fn attempt(&self, args: &[&str]) -> Result<bool> {
        let output = self.output(args)?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.trim().is_empty() {
            debug!("{}", stdout.trim_end());
        }
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(command = %format!("git {}", args.join(" ")), "{}", stderr.trim());
        }
        Ok(output.status.success())
    }
}

impl Vcs for GitCli {
    fn current_branch(&self) -> Result<String> {
        if self.repo.head_detached()? {
            return Err(FixupError::DetachedHead.into());
        }
        let head = match self.repo.head() {
            Ok(head) => head,
            Err(e) if e.code() == ErrorCode::UnbornBranch => return Err(FixupError::NoCommits.into()),
            Err(e) => return Err(FixupError::Git(e).into()),
        };
        head.shorthand()
            .map(str::to_string)
            .context("branch name is not valid UTF-8")
    }

    fn remotes(&self) -> Result<Vec<String>> {
        let remotes = self.repo.remotes()?;
        Ok(remotes.iter().flatten().map(str::to_string).collect())
    }

    fn rev_exists(&self, rev: &str) -> Result<bool> {
        Ok(self.repo.revparse_single(rev).is_ok())
    }

    fn status(&self) -> Result<String> {
        self.query(&["status", "--porcelain", "-z"])
    }

    fn log(&self, query: &LogQuery) -> Result<String> {
        let args = query.args();
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        self.query(&args)
    }

    fn stage(&self, paths: &[&str]) -> Result<bool> {
        let mut args = vec!["add", "--"];
        args.extend_from_slice(paths);
        self.attempt(&args)
    }

    fn commit_fixup(&self, hash: &str) -> Result<bool> {
        self.attempt(&["commit", "--fixup", hash])
    }

    fn unstage_all(&self) -> Result<()> {
        self.attempt(&["reset", "--quiet"])?;
        Ok(())
    }
}
