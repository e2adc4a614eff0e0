//! Direct reads of git metadata files, bypassing the git executable.

use crate::git::GIT_DIR_NAME;
use crate::BuildIdError;
use std::path::{Path, PathBuf};

const SYMREF_MARKER: &str = "ref:";

/// Name of the metadata file holding the current checkout
pub const HEAD_FILE: &str = "HEAD";

/// Absolute path of `relative` inside the repository's metadata directory
pub fn git_file_path(repo_root: &Path, relative: &str) -> PathBuf {
    repo_root.join(GIT_DIR_NAME).join(relative)
}

/// Read `<repo_root>/.git/<relative>` and return its trimmed contents.
pub fn read_git_file(repo_root: &Path, relative: &str) -> crate::Result<String> {
    let path = git_file_path(repo_root, relative);
    tracing::trace!(path = %path.display(), "reading git metadata file");
    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(contents.trim().to_string()),
        Err(source) => Err(BuildIdError::FileAccess { path, source }),
    }
}

/// Suspending form of [`read_git_file`].
pub async fn read_git_file_async(repo_root: &Path, relative: &str) -> crate::Result<String> {
    let path = git_file_path(repo_root, relative);
    tracing::trace!(path = %path.display(), "reading git metadata file");
    match tokio::fs::read_to_string(&path).await {
        Ok(contents) => Ok(contents.trim().to_string()),
        Err(source) => Err(BuildIdError::FileAccess { path, source }),
    }
}

/// Extract the ref pointer from the contents of `HEAD`.
///
/// The pointer is whatever follows `ref:` up to the end of that line. Without
/// a marker the first line is taken as is, which for a detached HEAD is the
/// commit hash itself.
pub fn head_ref(head: &str) -> Option<&str> {
    let start = head
        .find(SYMREF_MARKER)
        .map(|idx| idx + SYMREF_MARKER.len())
        .unwrap_or(0);
    let rest = &head[start..];
    let end = rest.find('\n').unwrap_or(rest.len());
    let pointer = rest[..end].trim();
    if pointer.is_empty() {
        None
    } else {
        Some(pointer)
    }
}

/// Metadata files whose modification changes the build identifier.
///
/// Always includes `HEAD`; adds the branch ref file when HEAD is symbolic and
/// that file exists (packed refs have no loose file to watch).
pub fn rerun_paths(repo_root: &Path) -> Vec<PathBuf> {
    let mut paths = vec![git_file_path(repo_root, HEAD_FILE)];
    if let Ok(head) = read_git_file(repo_root, HEAD_FILE) {
        if head.contains(SYMREF_MARKER) {
            if let Some(pointer) = head_ref(&head) {
                let ref_path = git_file_path(repo_root, pointer);
                if ref_path.is_file() {
                    paths.push(ref_path);
                }
            }
        }
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fake_repo(head: &str) -> TempDir {
        let dir = TempDir::new().unwrap();
        let git_dir = dir.path().join(".git");
        std::fs::create_dir_all(git_dir.join("refs/heads")).unwrap();
        std::fs::write(git_dir.join("HEAD"), head).unwrap();
        dir
    }

    #[test]
    fn test_head_ref_symbolic() {
        assert_eq!(head_ref("ref: refs/heads/main\n"), Some("refs/heads/main"));
    }

    #[test]
    fn test_head_ref_detached() {
        let sha = "3f786850e387550fdab836ed7e6dc881de23001b";
        assert_eq!(head_ref(&format!("{sha}\n")), Some(sha));
    }

    #[test]
    fn test_head_ref_only_first_line_after_marker() {
        assert_eq!(
            head_ref("ref:   refs/heads/feature/x  \nrefs/heads/other\n"),
            Some("refs/heads/feature/x")
        );
    }

    #[test]
    fn test_head_ref_empty() {
        assert_eq!(head_ref(""), None);
        assert_eq!(head_ref("ref:\n"), None);
        assert_eq!(head_ref("ref:   "), None);
    }

    #[test]
    fn test_read_git_file_trims() {
        let repo = fake_repo("ref: refs/heads/main\n");
        assert_eq!(
            read_git_file(repo.path(), "HEAD").unwrap(),
            "ref: refs/heads/main"
        );
    }

    #[test]
    fn test_read_git_file_missing() {
        let repo = fake_repo("ref: refs/heads/main\n");
        let err = read_git_file(repo.path(), "refs/heads/main").unwrap_err();
        match err {
            BuildIdError::FileAccess { path, .. } => {
                assert!(path.ends_with("refs/heads/main"));
            }
            other => panic!("expected FileAccess, got {other:?}"),
        }
    }

    #[test]
    fn test_read_git_file_rejects_invalid_utf8() {
        let repo = fake_repo("ref: refs/heads/main\n");
        std::fs::write(repo.path().join(".git/refs/heads/main"), [0xffu8, 0xfe, 0x00]).unwrap();
        let err = read_git_file(repo.path(), "refs/heads/main").unwrap_err();
        assert!(matches!(err, BuildIdError::FileAccess { .. }));
    }

    #[tokio::test]
    async fn test_read_git_file_async_matches_blocking() {
        let repo = fake_repo("ref: refs/heads/main\n");
        let blocking = read_git_file(repo.path(), "HEAD").unwrap();
        let suspending = read_git_file_async(repo.path(), "HEAD").await.unwrap();
        assert_eq!(blocking, suspending);
    }

    #[test]
    fn test_rerun_paths_includes_branch_ref() {
        let repo = fake_repo("ref: refs/heads/main\n");
        std::fs::write(repo.path().join(".git/refs/heads/main"), "abc\n").unwrap();
        let paths = rerun_paths(repo.path());
        assert_eq!(paths.len(), 2);
        assert!(paths[0].ends_with(".git/HEAD"));
        assert!(paths[1].ends_with(".git/refs/heads/main"));
    }

    #[test]
    fn test_rerun_paths_detached() {
        let repo = fake_repo("3f786850e387550fdab836ed7e6dc881de23001b\n");
        assert_eq!(rerun_paths(repo.path()).len(), 1);
    }
}
