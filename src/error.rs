use std::process::ExitStatus;

/// Failures that stop a run before (or while) talking to git.
///
/// Per-bucket fixup failures are not listed here: they are recovered and
/// reported at the end of the run.
#[derive(Debug, thiserror::Error)]
pub enum FixupError {
    #[error("not a git repository (or any parent): {path}")]
    NotARepository { path: String },

    #[error("bare repositories have no working tree to fix up")]
    BareRepository,

    #[error("HEAD is detached; check out a branch first")]
    DetachedHead,

    #[error("the current branch has no commits yet")]
    NoCommits,

    #[error("branch `{branch}` has no commits of its own")]
    EmptyBranch { branch: String },

    #[error("`{command}` failed ({status}): {stderr}")]
    GitCommand {
        command: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("failed to run `{command}`")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Git(#[from] git2::Error),
}
