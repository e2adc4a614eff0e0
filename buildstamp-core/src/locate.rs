//! Repository root discovery by walking parent directories.

use crate::backend::{BlockingBackend, GitBackend, TokioBackend};
use crate::git::GIT_DIR_NAME;
use std::path::{Path, PathBuf};

/// Upper bound on candidates tested; ordinary trees never come close.
pub const MAX_ANCESTOR_DEPTH: usize = 999;

/// Find the closest directory at or above `start` holding a readable `.git`.
///
/// Returns `start` (made absolute) when nothing is found before the
/// filesystem root or [`MAX_ANCESTOR_DEPTH`]. Never fails: a wrong guess
/// surfaces later as a git error with better context.
pub fn locate_repo_root(start: &Path) -> PathBuf {
    futures::executor::block_on(locate_with(&BlockingBackend, start))
}

/// Suspending form of [`locate_repo_root`].
pub async fn locate_repo_root_async(start: &Path) -> PathBuf {
    locate_with(&TokioBackend, start).await
}

pub(crate) async fn locate_with<B: GitBackend>(backend: &B, start: &Path) -> PathBuf {
    let start = std::path::absolute(start).unwrap_or_else(|_| start.to_path_buf());

    for candidate in start.ancestors().take(MAX_ANCESTOR_DEPTH) {
        if backend.is_readable(&candidate.join(GIT_DIR_NAME)).await {
            tracing::debug!(root = %candidate.display(), "located repository root");
            return candidate.to_path_buf();
        }
    }

    tracing::debug!(
        start = %start.display(),
        "no repository found above start directory, using it as root"
    );
    start
}

/// Existence plus read permission; contents are not validated.
///
/// `.git` is usually a directory but is a plain `gitdir:` file in linked
/// worktrees and submodules.
pub fn is_readable(path: &Path) -> bool {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_dir() => std::fs::read_dir(path).is_ok(),
        Ok(_) => std::fs::File::open(path).is_ok(),
        Err(_) => false,
    }
}

/// Suspending form of [`is_readable`].
pub async fn is_readable_async(path: &Path) -> bool {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_dir() => tokio::fs::read_dir(path).await.is_ok(),
        Ok(_) => tokio::fs::File::open(path).await.is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Filesystem stand-in that only knows which `.git` paths are readable
    #[derive(Default)]
    struct FakeTree {
        readable: HashSet<PathBuf>,
        probed: Mutex<Vec<PathBuf>>,
    }

    impl GitBackend for FakeTree {
        async fn run_git(&self, _repo_root: &Path, args: &[&str]) -> crate::Result<String> {
            Err(crate::BuildIdError::GitCommand(format!("unexpected: {}", args.join(" "))))
        }

        async fn read_git_file(&self, _repo_root: &Path, relative: &str) -> crate::Result<String> {
            Err(crate::BuildIdError::GitCommand(format!("unexpected read: {relative}")))
        }

        async fn is_readable(&self, path: &Path) -> bool {
            self.probed.lock().unwrap().push(path.to_path_buf());
            self.readable.contains(path)
        }
    }

    fn deep_path(depth: usize) -> PathBuf {
        let mut path = std::path::absolute("/").unwrap();
        for i in 0..depth {
            path.push(format!("level{i}"));
        }
        path
    }

    fn nested(root: &Path, depth: usize) -> PathBuf {
        let mut dir = root.to_path_buf();
        for i in 0..depth {
            dir.push(format!("level{i}"));
        }
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_locate_at_root() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir(tmp.path().join(".git")).unwrap();
        assert_eq!(locate_repo_root(tmp.path()), tmp.path());
    }

    #[test]
    fn test_locate_walks_up_ten_levels() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir(tmp.path().join(".git")).unwrap();
        let deep = nested(tmp.path(), 10);
        assert_eq!(locate_repo_root(&deep), tmp.path());
    }

    #[test]
    fn test_locate_prefers_closest() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir(tmp.path().join(".git")).unwrap();
        let inner = nested(tmp.path(), 2);
        std::fs::create_dir(inner.join(".git")).unwrap();
        let deeper = nested(&inner, 3);
        assert_eq!(locate_repo_root(&deeper), inner);
    }

    #[test]
    fn test_locate_accepts_gitlink_file() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(".git"), "gitdir: ../elsewhere/.git\n").unwrap();
        let deep = nested(tmp.path(), 1);
        assert_eq!(locate_repo_root(&deep), tmp.path());
    }

    #[test]
    fn test_locate_not_found_walks_to_root_and_returns_start() {
        let tree = FakeTree::default();
        let start = deep_path(6);
        let found = futures::executor::block_on(locate_with(&tree, &start));
        assert_eq!(found, start);

        // Every ancestor, filesystem root included, was checked once.
        let probed = tree.probed.lock().unwrap();
        assert_eq!(probed.len(), 7);
        assert_eq!(probed.last().unwrap(), &deep_path(0).join(".git"));
    }

    #[test]
    fn test_locate_stops_at_depth_bound() {
        let tree = FakeTree::default();
        let start = deep_path(MAX_ANCESTOR_DEPTH + 5);
        let found = futures::executor::block_on(locate_with(&tree, &start));
        assert_eq!(found, start);
        assert_eq!(tree.probed.lock().unwrap().len(), MAX_ANCESTOR_DEPTH);
    }

    #[test]
    fn test_locate_fake_tree_finds_ancestor() {
        let mut tree = FakeTree::default();
        tree.readable.insert(deep_path(2).join(".git"));
        let found = futures::executor::block_on(locate_with(&tree, &deep_path(10)));
        assert_eq!(found, deep_path(2));
        assert_eq!(tree.probed.lock().unwrap().len(), 9);
    }

    #[tokio::test]
    async fn test_locate_async_matches_blocking() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir(tmp.path().join(".git")).unwrap();
        let deep = nested(tmp.path(), 4);
        assert_eq!(
            locate_repo_root_async(&deep).await,
            locate_repo_root(&deep)
        );
    }

    #[test]
    fn test_is_readable() {
        let tmp = TempDir::new().unwrap();
        assert!(is_readable(tmp.path()));
        assert!(!is_readable(&tmp.path().join("missing")));
    }
}
