//! Configuration for buildstamp

use crate::{BuildIdError, BuildIdOptions};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration as TOML
pub const DEFAULT_CONFIG: &str = r#"# buildstamp configuration

[build_id]
# Directory to start the repository search from (defaults to the cwd)
# directory = "."
# Arguments passed to `git describe`, e.g. ["--tags", "--long"]
describe_flags = []
# Produce <tag>.<commits since tag>-g<short sha>; overrides describe_flags
use_semantic_versioning = false
# Use the commit hash when the strategy above fails
fallback_to_commit_sha = true
"#;

/// buildstamp configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub build_id: BuildIdOptions,
}

impl Config {
    /// Load config from a TOML file
    pub fn load(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml(&content)?;

        // Relative directories are relative to the config file, not the cwd.
        if let (Some(dir), Some(parent)) = (&config.build_id.directory, path.parent()) {
            if dir.is_relative() {
                config.build_id.directory = Some(parent.join(dir));
            }
        }
        Ok(config)
    }

    /// Parse config from TOML string
    pub fn from_toml(content: &str) -> crate::Result<Self> {
        toml::from_str(content).map_err(|e| BuildIdError::ConfigParse(e.to_string()))
    }

    /// Write the default config to `path`, refusing to overwrite.
    pub fn write_default(path: &Path) -> crate::Result<()> {
        if path.exists() {
            return Err(BuildIdError::ConfigExists(path.to_path_buf()));
        }
        std::fs::write(path, DEFAULT_CONFIG)?;
        Ok(())
    }
}
