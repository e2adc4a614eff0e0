//! git invocations pinned to a specific repository.
//!
//! Every command is prefixed with `--git-dir` and `--work-tree` so it targets
//! `repo_root` regardless of the process working directory.

use crate::process::{self, ProcessOutput};
use crate::BuildIdError;
use std::ffi::OsString;
use std::path::Path;

/// Name of git's metadata directory inside a working tree
pub const GIT_DIR_NAME: &str = ".git";

const GIT_PROGRAM: &str = "git";

/// Build the full argument vector for a git invocation against `repo_root`.
pub fn git_args(repo_root: &Path, args: &[&str]) -> Vec<OsString> {
    let mut git_dir = OsString::from("--git-dir=");
    git_dir.push(repo_root.join(GIT_DIR_NAME));
    let mut work_tree = OsString::from("--work-tree=");
    work_tree.push(repo_root);

    let mut full = Vec::with_capacity(args.len() + 2);
    full.push(git_dir);
    full.push(work_tree);
    full.extend(args.iter().map(OsString::from));
    full
}

/// Run git in `repo_root` and return trimmed stdout.
///
/// Any stderr output fails the call, even when git exits zero.
pub fn run_git(repo_root: &Path, args: &[&str]) -> crate::Result<String> {
    tracing::trace!(root = %repo_root.display(), ?args, "running git");
    interpret(process::run(GIT_PROGRAM, git_args(repo_root, args)))
}

/// Suspending form of [`run_git`].
pub async fn run_git_async(repo_root: &Path, args: &[&str]) -> crate::Result<String> {
    tracing::trace!(root = %repo_root.display(), ?args, "running git");
    interpret(process::run_async(GIT_PROGRAM, git_args(repo_root, args)).await)
}

fn interpret(result: crate::Result<ProcessOutput>) -> crate::Result<String> {
    match result {
        Ok(output) => {
            let stderr = output.stderr.trim();
            if !stderr.is_empty() {
                return Err(BuildIdError::GitCommand(stderr.to_string()));
            }
            Ok(output.stdout.trim().to_string())
        }
        Err(BuildIdError::ProcessExit { code, stderr, .. }) => {
            let stderr = stderr.trim();
            if stderr.is_empty() {
                Err(BuildIdError::GitCommand(match code {
                    Some(code) => format!("exited with status {}", code),
                    None => "terminated by signal".to_string(),
                }))
            } else {
                Err(BuildIdError::GitCommand(stderr.to_string()))
            }
        }
        Err(other) => Err(other),
    }
}
