//! Error types for buildstamp operations

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum BuildIdError {
    /// git ran but reported failure, either on stderr or through its exit code
    #[error("git command failed: {0}")]
    GitCommand(String),

    #[error("git {command} returned empty output")]
    GitOutputEmpty { command: String },

    #[error("git {command} returned unexpected output: {output:?}")]
    GitOutputInvalid { command: String, output: String },

    #[error("Failed to read {}: {source}", .path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No usable content in {}", .0.display())]
    EmptyMetadata(PathBuf),

    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {}: {stderr}", exit_code_label(.code))]
    ProcessExit {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Cannot determine current directory: {0}")]
    CurrentDir(#[source] std::io::Error),

    #[error("Config already exists at {}", .0.display())]
    ConfigExists(PathBuf),

    #[error("Config parse error: {0}")]
    ConfigParse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn exit_code_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "no status (terminated by signal)".to_string(),
    }
}
