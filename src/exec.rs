//! Process execution seam between orchestration logic and the host system
//!
//! Every external command (interpreter probes, package installs, the
//! application itself) goes through [`CommandRunner`] so the decision logic
//! stays testable without spawning real processes.

use std::path::PathBuf;
use std::process::{Command, Stdio};
use thiserror::Error;

/// How a spawned command's streams are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StdioMode {
    /// Forward the parent's stdin/stdout/stderr (operator-facing commands)
    Inherit,
    /// Capture output quietly (availability probes)
    Capture,
}

/// A fully-described command invocation
#[derive(Debug, Clone)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    /// Working directory for the child; inherits the parent's when None
    pub cwd: Option<PathBuf>,
    /// Extra environment variables for the child
    pub env: Vec<(String, String)>,
    pub stdio: StdioMode,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            cwd: None,
            env: Vec::new(),
            stdio: StdioMode::Capture,
        }
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn stdio(mut self, mode: StdioMode) -> Self {
        self.stdio = mode;
        self
    }

    /// Rendered form for logs and error messages
    pub fn display(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }
}

/// Result of a finished command
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl RunOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("Failed to spawn '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

/// Capability to run external commands
pub trait CommandRunner {
    fn run(&mut self, spec: CommandSpec) -> Result<RunOutcome, ExecError>;
}

/// Runner backed by [`std::process::Command`]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&mut self, spec: CommandSpec) -> Result<RunOutcome, ExecError> {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args);
        if let Some(dir) = &spec.cwd {
            cmd.current_dir(dir);
        }
        for (key, value) in &spec.env {
            cmd.env(key, value);
        }

        tracing::debug!("Executing command: {}", spec.display());

        match spec.stdio {
            StdioMode::Inherit => {
                let status = cmd
                    .stdin(Stdio::inherit())
                    .stdout(Stdio::inherit())
                    .stderr(Stdio::inherit())
                    .status()
                    .map_err(|e| ExecError::Spawn {
                        command: spec.display(),
                        source: e,
                    })?;

                Ok(RunOutcome {
                    // A signal death has no code; -1 keeps it distinguishable
                    exit_code: status.code().unwrap_or(-1),
                    stdout: String::new(),
                    stderr: String::new(),
                })
            }
            StdioMode::Capture => {
                let output = cmd.output().map_err(|e| ExecError::Spawn {
                    command: spec.display(),
                    source: e,
                })?;

                Ok(RunOutcome {
                    exit_code: output.status.code().unwrap_or(-1),
                    stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                    stderr: String::from_utf8_lossy(&output.stderr).to_string(),
                })
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_spec_builder() {
        let spec = CommandSpec::new("python3", ["-m", "venv", ".venv"])
            .current_dir("/tmp")
            .env("QT_MAC_WANTS_LAYER", "1")
            .stdio(StdioMode::Inherit);

        assert_eq!(spec.program, "python3");
        assert_eq!(spec.args, vec!["-m", "venv", ".venv"]);
        assert_eq!(spec.cwd.as_deref(), Some(std::path::Path::new("/tmp")));
        assert_eq!(spec.env.len(), 1);
        assert_eq!(spec.stdio, StdioMode::Inherit);
        assert_eq!(spec.display(), "python3 -m venv .venv");
    }

    #[test]
    fn test_system_runner_captures_output() {
        let mut runner = SystemRunner;
        let outcome = runner
            .run(CommandSpec::new("sh", ["-c", "echo probe-ok"]))
            .unwrap();

        assert!(outcome.success());
        assert_eq!(outcome.stdout.trim(), "probe-ok");
    }

    #[test]
    fn test_system_runner_reports_exit_code() {
        let mut runner = SystemRunner;
        let outcome = runner
            .run(CommandSpec::new("sh", ["-c", "exit 3"]))
            .unwrap();

        assert!(!outcome.success());
        assert_eq!(outcome.exit_code, 3);
    }

    #[test]
    fn test_system_runner_spawn_failure() {
        let mut runner = SystemRunner;
        let result = runner.run(CommandSpec::new(
            "definitely-not-a-real-binary-5a1b",
            Vec::<String>::new(),
        ));

        assert!(matches!(result, Err(ExecError::Spawn { .. })));
    }
}
