//! Child process execution with a deadline.
//!
//! The dispatch path is synchronous, so each call builds a small
//! current-thread Tokio runtime, spawns the child and waits for it with a
//! timeout. The child is killed if the deadline passes.

use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

/// Failure modes of an external process.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("invalid runner command line: {0}")]
    InvalidCommand(String),

    #[error("failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{program}' exited with {status}: {output}")]
    Failed {
        program: String,
        status: String,
        /// Combined stdout + stderr, trimmed.
        output: String,
    },

    #[error("'{program}' timed out after {} s", .timeout.as_secs())]
    Timeout { program: String, timeout: Duration },
}

impl ScriptError {
    /// Text the process produced before failing, if any.
    pub fn output(&self) -> &str {
        match self {
            ScriptError::Failed { output, .. } => output,
            _ => "",
        }
    }
}

/// Run `program args...` and return trimmed stdout.
pub fn run_command(program: &str, args: &[String], timeout: Duration) -> Result<String, ScriptError> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|source| ScriptError::Spawn {
            program: program.to_string(),
            source,
        })?;

    rt.block_on(async {
        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ScriptError::Spawn {
                program: program.to_string(),
                source,
            })?;

        let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(res) => res.map_err(|source| ScriptError::Spawn {
                program: program.to_string(),
                source,
            })?,
            Err(_) => {
                return Err(ScriptError::Timeout {
                    program: program.to_string(),
                    timeout,
                });
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if output.status.success() {
            Ok(stdout)
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let combined = format!("{stdout}\n{}", stderr.trim());
            Err(ScriptError::Failed {
                program: program.to_string(),
                status: output.status.to_string(),
                output: combined.trim().to_string(),
            })
        }
    })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Vec<String> {
        vec!["-c".to_string(), script.to_string()]
    }

    #[test]
    fn captures_trimmed_stdout() {
        let out = run_command("sh", &sh("echo '  hi  '"), Duration::from_secs(5)).unwrap();
        assert_eq!(out, "hi");
    }

    #[test]
    fn failure_keeps_combined_output() {
        let err = run_command("sh", &sh("echo out; echo err >&2; exit 3"), Duration::from_secs(5))
            .unwrap_err();
        assert!(matches!(err, ScriptError::Failed { .. }));
        assert!(err.output().contains("out"));
        assert!(err.output().contains("err"));
    }

    #[test]
    fn missing_program_is_spawn_error() {
        let err = run_command("definitely-not-a-program-xyz", &[], Duration::from_secs(5))
            .unwrap_err();
        assert!(matches!(err, ScriptError::Spawn { .. }));
    }

    #[test]
    fn deadline_kills_child() {
        let err = run_command("sh", &sh("sleep 5"), Duration::from_millis(100)).unwrap_err();
        assert!(matches!(err, ScriptError::Timeout { .. }));
    }
}
