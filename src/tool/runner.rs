// file: src/tool/runner.rs
// version: 1.0.0
// guid: 9e6f2a17-c3b8-4d05-a1e4-7b2c8f0d3a69

//! Command execution seam between the deployer and child processes

use crate::error::DeployError;
use crate::Result;
use std::fmt;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, error};

/// A program plus its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandLine {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " '{}'", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Captured result of a finished child process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// `None` when the process was killed by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Successful, empty output
    pub fn ok() -> Self {
        Self {
            exit_code: Some(0),
            ..Default::default()
        }
    }

    /// Failed output with the given exit code and stderr
    pub fn failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code: Some(exit_code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Stderr if present, otherwise stdout
    pub fn diagnostic(&self) -> &str {
        if self.stderr.trim().is_empty() {
            self.stdout.trim()
        } else {
            self.stderr.trim()
        }
    }

    /// Turn a non-zero exit into a [`DeployError::ProcessError`]
    pub fn into_result(self, command: &CommandLine) -> Result<Self> {
        if self.success() {
            Ok(self)
        } else {
            Err(DeployError::ProcessError {
                command: command.to_string(),
                exit_code: self.exit_code,
                stderr: self.diagnostic().to_string(),
            })
        }
    }
}

/// Trait for running external commands
#[async_trait::async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run a command to completion, capturing its output.
    ///
    /// A non-zero exit is reported through [`CommandOutput`], not as an error;
    /// errors mean the process could not be run or timed out.
    async fn run(&self, command: &CommandLine, timeout: Duration) -> Result<CommandOutput>;
}

/// Runs commands as child processes
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    working_directory: Option<PathBuf>,
}

impl ProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every child process from `dir`
    pub fn with_working_directory(dir: impl Into<PathBuf>) -> Self {
        Self {
            working_directory: Some(dir.into()),
        }
    }
}

#[async_trait::async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, command: &CommandLine, timeout: Duration) -> Result<CommandOutput> {
        debug!("Executing: {}", command);

        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(ref wd) = self.working_directory {
            cmd.current_dir(wd);
        }

        let child = cmd.spawn().map_err(|e| DeployError::ProcessError {
            command: command.to_string(),
            exit_code: None,
            stderr: format!("Failed to spawn command: {}", e),
        })?;

        let output = tokio::time::timeout(timeout, child.wait_with_output())
            .await
            .map_err(|_| {
                DeployError::timeout(format!(
                    "`{}` did not finish within {} seconds",
                    command,
                    timeout.as_secs()
                ))
            })?
            .map_err(|e| DeployError::ProcessError {
                command: command.to_string(),
                exit_code: None,
                stderr: format!("Failed to wait for command: {}", e),
            })?;

        let result = CommandOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        if !result.success() {
            error!("Command failed with exit code {:?}", result.exit_code);
            if !result.stdout.trim().is_empty() {
                error!("STDOUT: {}", result.stdout.trim());
            }
            if !result.stderr.trim().is_empty() {
                error!("STDERR: {}", result.stderr.trim());
            }
        }

        Ok(result)
    }
}

/// Runner that records every command and answers from canned responses
#[cfg(test)]
#[derive(Default)]
pub(crate) struct RecordingRunner {
    calls: std::sync::Mutex<Vec<CommandLine>>,
    responses: Vec<(String, CommandOutput)>,
}

#[cfg(test)]
impl RecordingRunner {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Answer with `output` for any command whose rendering contains `pattern`
    pub(crate) fn respond(mut self, pattern: &str, output: CommandOutput) -> Self {
        self.responses.push((pattern.to_string(), output));
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.to_string())
            .collect()
    }
}

#[cfg(test)]
#[async_trait::async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(&self, command: &CommandLine, _timeout: Duration) -> Result<CommandOutput> {
        self.calls.lock().unwrap().push(command.clone());
        let rendered = command.to_string();
        Ok(self
            .responses
            .iter()
            .find(|(pattern, _)| rendered.contains(pattern.as_str()))
            .map(|(_, output)| output.clone())
            .unwrap_or_else(CommandOutput::ok))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line_display_quotes_spaces() {
        let cmd = CommandLine::new("mpremote", ["fs", "cp", "my file.py", ":main.py"]);
        assert_eq!(cmd.to_string(), "mpremote fs cp 'my file.py' :main.py");
    }

    #[test]
    fn test_into_result_prefers_stderr() {
        let cmd = CommandLine::new("mpremote", ["reset"]);
        let out = CommandOutput {
            exit_code: Some(1),
            stdout: "noise".to_string(),
            stderr: "no device found\n".to_string(),
        };
        match out.into_result(&cmd) {
            Err(DeployError::ProcessError {
                exit_code, stderr, ..
            }) => {
                assert_eq!(exit_code, Some(1));
                assert_eq!(stderr, "no device found");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_process_runner_captures_output() {
        let runner = ProcessRunner::new();
        let cmd = CommandLine::new("sh", ["-c", "echo out; echo err >&2; exit 3"]);
        let out = runner.run(&cmd, Duration::from_secs(10)).await.unwrap();
        assert_eq!(out.exit_code, Some(3));
        assert_eq!(out.stdout.trim(), "out");
        assert_eq!(out.stderr.trim(), "err");
        assert!(!out.success());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_process_runner_timeout() {
        let runner = ProcessRunner::new();
        let cmd = CommandLine::new("sleep", ["5"]);
        let result = runner.run(&cmd, Duration::from_millis(100)).await;
        assert!(matches!(result, Err(DeployError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_process_runner_missing_program() {
        let runner = ProcessRunner::new();
        let cmd = CommandLine::new("mpy-deploy-no-such-program-12345", Vec::<String>::new());
        let result = runner.run(&cmd, Duration::from_secs(1)).await;
        assert!(matches!(
            result,
            Err(DeployError::ProcessError { exit_code: None, .. })
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_process_runner_working_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("marker.txt"), "here").unwrap();
        let runner = ProcessRunner::with_working_directory(dir.path());
        let cmd = CommandLine::new("cat", ["marker.txt"]);
        let out = runner.run(&cmd, Duration::from_secs(10)).await.unwrap();
        assert_eq!(out.stdout, "here");
    }

    #[tokio::test]
    async fn test_recording_runner_canned_failure() {
        let runner = RecordingRunner::new().respond("reset", CommandOutput::failed(1, "boom"));
        let ok = runner
            .run(&CommandLine::new("mpremote", ["fs", "ls"]), Duration::from_secs(1))
            .await
            .unwrap();
        let bad = runner
            .run(&CommandLine::new("mpremote", ["reset"]), Duration::from_secs(1))
            .await
            .unwrap();
        assert!(ok.success());
        assert!(!bad.success());
        assert_eq!(runner.calls(), vec!["mpremote fs ls", "mpremote reset"]);
    }
}
