//! buildstamp - reproducible build identifiers from git state
//!
//! Locates the enclosing git repository and derives an identifier from it:
//! the commit hash, a `git describe` string, or a semantic-version string
//! built from the nearest tag. Every instance built from the same commit
//! gets the same identifier.
//!
//! Blocking and async entry points share one implementation:
//! [`resolve_build_id`] and [`resolve_build_id_async`].

pub mod backend;
pub mod config;
pub mod error;
pub mod git;
pub mod locate;
pub mod options;
pub mod process;
pub mod refs;
pub mod resolve;

pub use backend::{BlockingBackend, GitBackend, TokioBackend};
pub use config::Config;
pub use error::BuildIdError;
pub use locate::{locate_repo_root, locate_repo_root_async, MAX_ANCESTOR_DEPTH};
pub use options::{BuildIdOptions, Strategy};
pub use refs::rerun_paths;
pub use resolve::{resolve_build_id, resolve_build_id_async, resolve_with, Fallback};

/// Result type alias for buildstamp operations
pub type Result<T> = std::result::Result<T, BuildIdError>;
