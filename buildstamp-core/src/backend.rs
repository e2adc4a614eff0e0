//! Capabilities the resolver needs from the outside world.
//!
//! Resolution is written once against [`GitBackend`]. [`TokioBackend`]
//! suspends on subprocess and file I/O; [`BlockingBackend`] performs the same
//! work synchronously, so its futures complete on first poll.

use crate::{git, locate, refs};
use std::future::Future;
use std::path::Path;

/// Command executor and metadata file reader pair
pub trait GitBackend: Sync {
    /// Run git against `repo_root` and return trimmed stdout
    fn run_git(
        &self,
        repo_root: &Path,
        args: &[&str],
    ) -> impl Future<Output = crate::Result<String>> + Send;

    /// Read `<repo_root>/.git/<relative>` and return trimmed contents
    fn read_git_file(
        &self,
        repo_root: &Path,
        relative: &str,
    ) -> impl Future<Output = crate::Result<String>> + Send;

    /// Whether `path` exists and can be opened for reading
    fn is_readable(&self, path: &Path) -> impl Future<Output = bool> + Send;
}

/// Synchronous syscalls; drive with a trivial executor.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockingBackend;

impl GitBackend for BlockingBackend {
    async fn run_git(&self, repo_root: &Path, args: &[&str]) -> crate::Result<String> {
        git::run_git(repo_root, args)
    }

    async fn read_git_file(&self, repo_root: &Path, relative: &str) -> crate::Result<String> {
        refs::read_git_file(repo_root, relative)
    }

    async fn is_readable(&self, path: &Path) -> bool {
        locate::is_readable(path)
    }
}

/// tokio process and filesystem primitives; requires a tokio runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioBackend;

impl GitBackend for TokioBackend {
    async fn run_git(&self, repo_root: &Path, args: &[&str]) -> crate::Result<String> {
        git::run_git_async(repo_root, args).await
    }

    async fn read_git_file(&self, repo_root: &Path, relative: &str) -> crate::Result<String> {
        refs::read_git_file_async(repo_root, relative).await
    }

    async fn is_readable(&self, path: &Path) -> bool {
        locate::is_readable_async(path).await
    }
}
