//! Build identifier resolution.
//!
//! Order of attempts:
//! 1. locate the repository root
//! 2. semantic version (`<tag>.<n>-g<short>`) or `git describe <flags>`,
//!    whichever the options select
//! 3. the branch ref file named by `.git/HEAD`
//! 4. `git rev-parse HEAD`
//!
//! Step 2 failures are absorbed or returned according to
//! `fallback_to_commit_sha`. Step 3 failures are always absorbed. Step 4 is
//! the last resort and its failure is always returned.

use crate::backend::{BlockingBackend, GitBackend, TokioBackend};
use crate::options::{BuildIdOptions, Strategy};
use crate::refs::{self, HEAD_FILE};
use crate::{locate, BuildIdError};
use std::path::Path;

/// Length of the abbreviated hash in semantic-version identifiers
pub const SHORT_SHA_LEN: usize = 8;

/// What to do with a failed step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    /// Discard the error and continue with the next step
    Absorb,
    /// Stop and hand the error to the caller
    Propagate,
}

impl Fallback {
    pub fn from_flag(fallback_to_commit_sha: bool) -> Self {
        if fallback_to_commit_sha {
            Self::Absorb
        } else {
            Self::Propagate
        }
    }

    /// `Ok(Some(id))` ends resolution, `Ok(None)` moves on, `Err` stops.
    pub fn settle(self, outcome: crate::Result<String>) -> crate::Result<Option<String>> {
        match outcome {
            Ok(id) => Ok(Some(id)),
            Err(_) if self == Self::Absorb => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Resolve a build identifier, blocking the current thread.
///
/// Usable without an async runtime, e.g. from build scripts.
pub fn resolve_build_id(options: &BuildIdOptions) -> crate::Result<String> {
    futures::executor::block_on(resolve_with(&BlockingBackend, options))
}

/// Resolve a build identifier on the tokio runtime.
pub async fn resolve_build_id_async(options: &BuildIdOptions) -> crate::Result<String> {
    resolve_with(&TokioBackend, options).await
}

/// Run the full resolution against any backend.
pub async fn resolve_with<B: GitBackend>(
    backend: &B,
    options: &BuildIdOptions,
) -> crate::Result<String> {
    let start = match &options.directory {
        Some(directory) => directory.clone(),
        None => std::env::current_dir().map_err(BuildIdError::CurrentDir)?,
    };
    let root = locate::locate_with(backend, &start).await;

    let strategy = options.strategy();
    tracing::debug!(root = %root.display(), ?strategy, "resolving build id");

    let primary = match strategy {
        Strategy::SemanticVersion => Some(semantic_version(backend, &root).await),
        Strategy::Describe(flags) => Some(describe(backend, &root, &flags).await),
        Strategy::CommitSha => None,
    };
    if let Some(outcome) = primary {
        let policy = Fallback::from_flag(options.fallback_to_commit_sha);
        if let Some(id) = policy.settle(outcome)? {
            return Ok(id);
        }
    }

    if let Some(id) = Fallback::Absorb.settle(commit_from_ref_files(backend, &root).await)? {
        tracing::debug!("build id read from ref files");
        return Ok(id);
    }

    commit_sha(backend, &root).await
}

/// `<nearest tag>.<first-parent commits since tag>-g<8 char sha>`
async fn semantic_version<B: GitBackend>(backend: &B, root: &Path) -> crate::Result<String> {
    let tag = non_empty(backend, root, &["describe", "--tags", "--abbrev=0"]).await?;

    let range = format!("{tag}..HEAD");
    let count_args = ["rev-list", "--count", "--first-parent", range.as_str()];
    let raw_count = non_empty(backend, root, &count_args).await?;
    let count: u64 = raw_count
        .parse()
        .map_err(|_| BuildIdError::GitOutputInvalid {
            command: count_args.join(" "),
            output: raw_count.clone(),
        })?;

    let short_arg = format!("--short={SHORT_SHA_LEN}");
    let short = non_empty(backend, root, &["rev-parse", short_arg.as_str(), "HEAD"]).await?;

    Ok(format!("{tag}.{count}-g{short}"))
}

async fn describe<B: GitBackend>(backend: &B, root: &Path, flags: &[&str]) -> crate::Result<String> {
    let mut args = Vec::with_capacity(flags.len() + 1);
    args.push("describe");
    args.extend_from_slice(flags);
    non_empty(backend, root, &args).await
}

/// Follow `.git/HEAD` to the ref file it names and read the commit from it.
///
/// Only loose refs are found this way; packed refs and detached heads fall
/// through to `rev-parse`.
async fn commit_from_ref_files<B: GitBackend>(backend: &B, root: &Path) -> crate::Result<String> {
    let head = backend.read_git_file(root, HEAD_FILE).await?;
    let pointer = refs::head_ref(&head)
        .ok_or_else(|| BuildIdError::EmptyMetadata(refs::git_file_path(root, HEAD_FILE)))?;

    let commit = backend.read_git_file(root, pointer).await?;
    if commit.is_empty() {
        return Err(BuildIdError::EmptyMetadata(refs::git_file_path(root, pointer)));
    }
    Ok(commit)
}

async fn commit_sha<B: GitBackend>(backend: &B, root: &Path) -> crate::Result<String> {
    non_empty(backend, root, &["rev-parse", "HEAD"]).await
}

async fn non_empty<B: GitBackend>(backend: &B, root: &Path, args: &[&str]) -> crate::Result<String> {
    let output = backend.run_git(root, args).await?;
    if output.is_empty() {
        return Err(BuildIdError::GitOutputEmpty {
            command: args.join(" "),
        });
    }
    Ok(output)
}
