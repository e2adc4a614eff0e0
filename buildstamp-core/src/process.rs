//! Child process execution with captured output.
//!
//! A run that exits zero is `Ok` even when it wrote to stderr; callers decide
//! whether stderr text counts as failure. Spawn failures and non-zero exits
//! are reported as distinct error variants.

use crate::BuildIdError;
use std::ffi::OsStr;
use std::process::{Output, Stdio};

/// Captured streams of a finished process, decoded lossily as UTF-8
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Run `program` to completion, blocking the current thread.
pub fn run<I, S>(program: &str, args: I) -> crate::Result<ProcessOutput>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let output = std::process::Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .map_err(|source| BuildIdError::Spawn {
            program: program.to_string(),
            source,
        })?;

    finish(program, output)
}

/// Run `program` to completion on the tokio runtime.
pub async fn run_async<I, S>(program: &str, args: I) -> crate::Result<ProcessOutput>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let output = tokio::process::Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|source| BuildIdError::Spawn {
            program: program.to_string(),
            source,
        })?;

    finish(program, output)
}

fn finish(program: &str, output: Output) -> crate::Result<ProcessOutput> {
    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    if !output.status.success() {
        return Err(BuildIdError::ProcessExit {
            program: program.to_string(),
            code: output.status.code(),
            stderr,
        });
    }

    Ok(ProcessOutput { stdout, stderr })
}
