// file: src/tool/mpremote.rs
// version: 1.0.0
// guid: 1c7d4e92-b0a5-4f38-8e6d-2a9f5b3c7e10

//! Command lines for the mpremote device-management tool

use super::runner::{CommandLine, CommandOutput};
use crate::error::DeployError;
use crate::Result;
use std::path::{Path, PathBuf};

/// Builds device commands for one tool binary and one serial port
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceTool {
    program: String,
    port: String,
}

impl DeviceTool {
    pub fn new(program: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            port: port.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn port(&self) -> &str {
        &self.port
    }

    fn command<'a>(&self, tail: impl IntoIterator<Item = &'a str>) -> CommandLine {
        let mut args = vec!["connect".to_string(), self.port.clone()];
        args.extend(tail.into_iter().map(str::to_string));
        CommandLine::new(self.program.clone(), args)
    }

    /// `connect <port> fs mkdir :<remote>`
    pub fn mkdir(&self, remote: &str) -> CommandLine {
        let target = remote_arg(remote);
        self.command(["fs", "mkdir", target.as_str()])
    }

    /// `connect <port> fs cp <local> :<remote>`
    pub fn copy(&self, local: &Path, remote: &str) -> CommandLine {
        let source = local.to_string_lossy();
        let target = remote_arg(remote);
        self.command(["fs", "cp", &*source, target.as_str()])
    }

    /// `connect <port> reset`
    pub fn reset(&self) -> CommandLine {
        self.command(["reset"])
    }

    /// Locate the tool binary on PATH
    pub fn locate(&self) -> Result<PathBuf> {
        which::which(&self.program).map_err(|_| {
            DeployError::file_not_found(format!(
                "{} not found on PATH (install it with `pip install mpremote`)",
                self.program
            ))
        })
    }
}

/// Whether a failed mkdir only reports that the directory is already there
pub fn is_already_exists(output: &CommandOutput) -> bool {
    [&output.stdout, &output.stderr].iter().any(|text| {
        text.contains("EEXIST") || text.contains("File exists") || text.contains("Errno 17")
    })
}

fn remote_arg(remote: &str) -> String {
    format!(":{}", remote.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mkdir_command() {
        let tool = DeviceTool::new("mpremote", "/dev/ttyACM0");
        assert_eq!(
            tool.mkdir("lib").to_string(),
            "mpremote connect /dev/ttyACM0 fs mkdir :lib"
        );
    }

    #[test]
    fn test_copy_command() {
        let tool = DeviceTool::new("mpremote", "COM3");
        let cmd = tool.copy(Path::new("animations/fire.py"), "animations/fire.py");
        assert_eq!(
            cmd.args,
            vec![
                "connect",
                "COM3",
                "fs",
                "cp",
                "animations/fire.py",
                ":animations/fire.py"
            ]
        );
    }

    #[test]
    fn test_reset_command() {
        let tool = DeviceTool::new("/opt/bin/mpremote", "/dev/ttyUSB0");
        let cmd = tool.reset();
        assert_eq!(cmd.program, "/opt/bin/mpremote");
        assert_eq!(cmd.args, vec!["connect", "/dev/ttyUSB0", "reset"]);
    }

    #[test]
    fn test_remote_arg_strips_leading_slash() {
        assert_eq!(remote_arg("/main.py"), ":main.py");
    }

    #[test]
    fn test_already_exists_detection() {
        let exists = CommandOutput::failed(1, "mkdir :lib\nmpremote: mkdir: lib: File exists.\n");
        assert!(is_already_exists(&exists));

        let errno = CommandOutput {
            exit_code: Some(1),
            stdout: "OSError: [Errno 17] EEXIST".to_string(),
            stderr: String::new(),
        };
        assert!(is_already_exists(&errno));

        let other = CommandOutput::failed(1, "could not enter raw repl");
        assert!(!is_already_exists(&other));
    }

    #[test]
    fn test_locate_missing_tool() {
        let tool = DeviceTool::new("mpremote-definitely-not-installed-42", "/dev/null");
        assert!(matches!(tool.locate(), Err(DeployError::FileNotFound(_))));
    }
}
