//! Subprocess execution with explicit argument arrays.
//!
//! Commands are never passed through a shell; arguments reach the child
//! process verbatim, commit messages included.

use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;
use tracing::debug;

/// Errors from running an external command.
#[derive(Error, Debug)]
pub enum ExecutionError {
    /// The command could not be started at all.
    #[error("failed to launch `{command}`: {source}")]
    Launch {
        /// Rendered command line.
        command: String,
        /// Underlying spawn error.
        #[source]
        source: std::io::Error,
    },

    /// The command ran but exited nonzero when success was demanded.
    #[error("command `{command}` exited with status {exit_code}")]
    CommandFailed {
        /// Rendered command line.
        command: String,
        /// Nonzero exit code (-1 when terminated by a signal).
        exit_code: i32,
        /// Combined output, when it was captured.
        output: Option<String>,
    },
}

/// Outcome of a single external command invocation.
#[derive(Debug, Clone)]
pub struct RunResult {
    /// Process exit code (-1 when terminated by a signal).
    pub exit_code: i32,
    /// Combined stdout and stderr, present only when capture was requested.
    pub output: Option<String>,
}

impl RunResult {
    /// Whether the command exited zero.
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Captured output with surrounding whitespace removed, empty when absent.
    pub fn trimmed_output(&self) -> &str {
        self.output.as_deref().map(str::trim).unwrap_or("")
    }
}

/// Runs external commands from a fixed working directory.
pub struct CommandRunner {
    cwd: PathBuf,
}

impl CommandRunner {
    /// Creates a runner that executes commands in `cwd`.
    pub fn new<P: AsRef<Path>>(cwd: P) -> Self {
        Self {
            cwd: cwd.as_ref().to_path_buf(),
        }
    }

    /// Runs a command with the parent's standard streams.
    ///
    /// A nonzero exit is not an error here; callers inspect the returned
    /// [`RunResult`]. Only a failure to start the process errors.
    pub fn run(&self, program: &str, args: &[&str]) -> Result<RunResult, ExecutionError> {
        self.execute(program, args, false)
    }

    /// Runs a command and captures its combined stdout and stderr.
    pub fn run_captured(&self, program: &str, args: &[&str]) -> Result<RunResult, ExecutionError> {
        self.execute(program, args, true)
    }

    /// Runs a command and fails unless it exits zero.
    pub fn run_checked(&self, program: &str, args: &[&str]) -> Result<RunResult, ExecutionError> {
        let result = self.execute(program, args, false)?;
        if !result.success() {
            return Err(ExecutionError::CommandFailed {
                command: render_command(program, args),
                exit_code: result.exit_code,
                output: result.output,
            });
        }
        Ok(result)
    }

    fn execute(
        &self,
        program: &str,
        args: &[&str],
        capture: bool,
    ) -> Result<RunResult, ExecutionError> {
        debug!(
            command = %render_command(program, args),
            cwd = %self.cwd.display(),
            capture,
            "Running command"
        );

        let mut command = Command::new(program);
        command.args(args).current_dir(&self.cwd);

        if capture {
            let output = command.output().map_err(|source| ExecutionError::Launch {
                command: render_command(program, args),
                source,
            })?;

            // Approximates merged streams: stdout first, then stderr.
            let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
            combined.push_str(&String::from_utf8_lossy(&output.stderr));

            Ok(RunResult {
                exit_code: output.status.code().unwrap_or(-1),
                output: Some(combined),
            })
        } else {
            let status = command.status().map_err(|source| ExecutionError::Launch {
                command: render_command(program, args),
                source,
            })?;

            Ok(RunResult {
                exit_code: status.code().unwrap_or(-1),
                output: None,
            })
        }
    }
}

/// Renders a program and its arguments for diagnostics.
fn render_command(program: &str, args: &[&str]) -> String {
    if args.is_empty() {
        program.to_string()
    } else {
        format!("{} {}", program, args.join(" "))
    }
}
