use std::io::Write;
use std::process::{Command, ExitStatus, Stdio};

use tracing::debug;

use super::ProcessError;

const DEFAULT_SHELL: &str = "/bin/sh";

/// Runs operating-system commands for the `shell` command.
#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    shell: String,
}

impl Default for ProcessExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessExecutor {
    /// Runs commands through `/bin/sh`, whatever the login shell is.
    pub fn new() -> Self {
        Self::with_shell(DEFAULT_SHELL)
    }

    pub fn with_shell(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
        }
    }

    /// Runs `command_line` through the shell with inherited stdio and
    /// reports a non-zero exit status on `out`.
    pub fn run(&self, command_line: &str, out: &mut dyn Write) -> Result<ExitStatus, ProcessError> {
        debug!(shell = %self.shell, command = command_line, "spawning");
        std::io::stdout().flush().ok();

        let mut child = Command::new(&self.shell)
            .arg("-c")
            .arg(command_line)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| ProcessError::Spawn {
                command: command_line.to_string(),
                source,
            })?;

        let status = child.wait().map_err(|source| ProcessError::Wait {
            command: command_line.to_string(),
            source,
        })?;

        if !status.success() {
            writeln!(out, "Process exited with status: {}", status).ok();
        }
        Ok(status)
    }
}
