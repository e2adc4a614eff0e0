//! Per-call resolution options

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How a build identifier should be derived
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildIdOptions {
    /// Where to start looking for the repository (process cwd when unset)
    #[serde(default)]
    pub directory: Option<PathBuf>,
    /// Extra arguments for `git describe`
    #[serde(default)]
    pub describe_flags: Vec<String>,
    /// Derive `<tag>.<commits since tag>-g<short sha>`; wins over `describe_flags`
    #[serde(default)]
    pub use_semantic_versioning: bool,
    /// Fall back to the commit hash when the chosen strategy fails
    #[serde(default = "default_fallback")]
    pub fallback_to_commit_sha: bool,
}

fn default_fallback() -> bool {
    true
}

impl Default for BuildIdOptions {
    fn default() -> Self {
        Self {
            directory: None,
            describe_flags: Vec::new(),
            use_semantic_versioning: false,
            fallback_to_commit_sha: default_fallback(),
        }
    }
}

/// Primary strategy selected by a set of options
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy<'a> {
    SemanticVersion,
    Describe(Vec<&'a str>),
    CommitSha,
}

impl BuildIdOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = Some(directory.into());
        self
    }

    pub fn describe_flags<I, S>(mut self, flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.describe_flags = flags.into_iter().map(Into::into).collect();
        self
    }

    pub fn semantic_versioning(mut self, enabled: bool) -> Self {
        self.use_semantic_versioning = enabled;
        self
    }

    pub fn fallback_to_commit_sha(mut self, enabled: bool) -> Self {
        self.fallback_to_commit_sha = enabled;
        self
    }

    /// Pick the primary strategy. Blank describe flags are ignored; a list
    /// with nothing but blanks means no describe step at all.
    pub fn strategy(&self) -> Strategy<'_> {
        if self.use_semantic_versioning {
            return Strategy::SemanticVersion;
        }

        let flags: Vec<&str> = self
            .describe_flags
            .iter()
            .map(String::as_str)
            .filter(|flag| !flag.trim().is_empty())
            .collect();

        if flags.is_empty() {
            Strategy::CommitSha
        } else {
            Strategy::Describe(flags)
        }
    }
}
