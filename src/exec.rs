use crate::error::{ReleaseError, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

/// Runs shell commands from the project root
#[derive(Debug, Clone)]
pub struct CommandRunner {
    root: PathBuf,
}

impl CommandRunner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        CommandRunner { root: root.into() }
    }

    /// Run a command in the project root and capture its stdout.
    ///
    /// Any non-zero exit code is an error carrying both output streams.
    pub fn run(&self, command: &str) -> Result<String> {
        self.run_in(&self.root, command)
    }

    /// Run a command in `dir` and capture its stdout
    pub fn run_in(&self, dir: &Path, command: &str) -> Result<String> {
        debug!("Executing: {} (in {})", command, dir.display());

        let output = shell(command)
            .current_dir(dir)
            .output()
            .map_err(|e| ReleaseError::command(command, e.to_string()))?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ReleaseError::command(
                command,
                format!(
                    "exit code {}\nStdout: {}\nStderr: {}",
                    output.status.code().unwrap_or(-1),
                    stdout,
                    stderr
                ),
            ));
        }

        Ok(stdout)
    }

    /// Run a command with the terminal's stdio, so its output is visible
    /// and it can prompt the user
    pub fn run_proxied(&self, command: &str) -> Result<()> {
        debug!("Executing (proxied): {}", command);

        let status = shell(command)
            .current_dir(&self.root)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| ReleaseError::command(command, e.to_string()))?;

        if !status.success() {
            return Err(ReleaseError::command(
                command,
                format!("exit code {}", status.code().unwrap_or(-1)),
            ));
        }

        Ok(())
    }
}

fn shell(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}
