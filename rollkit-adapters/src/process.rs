//! Subprocess plumbing shared by the tool adapters.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use rollkit_core::error::{Error, Result};
use tokio::process::{Child, Command};
use tracing::debug;

/// Locates `tool`, preferring the workspace's `node_modules/.bin`.
pub fn locate(tool: &str, root: &Path) -> Result<PathBuf> {
    let local = root.join("node_modules").join(".bin").join(tool);
    if local.is_file() {
        return Ok(local);
    }
    which::which(tool).map_err(|_| Error::ToolNotFound {
        tool: tool.to_string(),
    })
}

/// Captured result of a piped run.
#[derive(Debug, Clone)]
pub struct Captured {
    pub code: Option<i32>,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// A tool invocation on behalf of one package (or the workspace).
pub struct ToolCommand {
    tool: String,
    context: String,
    command: Command,
}

impl ToolCommand {
    pub fn new(tool: &str, root: &Path, context: impl Into<String>) -> Result<Self> {
        let program = locate(tool, root)?;
        let mut command = Command::new(program);
        command.current_dir(root).kill_on_drop(true);
        Ok(Self {
            tool: tool.to_string(),
            context: context.into(),
            command,
        })
    }

    pub fn arg(mut self, arg: impl AsRef<std::ffi::OsStr>) -> Self {
        self.command.arg(arg);
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<std::ffi::OsStr>,
    {
        self.command.args(args);
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.command.env(key, value);
        self
    }

    pub fn current_dir(mut self, dir: &Path) -> Self {
        self.command.current_dir(dir);
        self
    }

    fn failed(&self, code: Option<i32>, stderr: String) -> Error {
        Error::ToolFailed {
            tool: self.tool.clone(),
            package: self.context.clone(),
            code,
            stderr,
        }
    }

    /// Runs with inherited stdio and fails on a non-zero exit.
    pub async fn status(mut self) -> Result<()> {
        debug!(tool = %self.tool, context = %self.context, "running");
        let status = self
            .command
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await?;
        if status.success() {
            Ok(())
        } else {
            Err(self.failed(status.code(), String::new()))
        }
    }

    /// Runs with piped output without judging the exit status.
    pub async fn capture(mut self) -> Result<Captured> {
        debug!(tool = %self.tool, context = %self.context, "running (piped)");
        let output = self
            .command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;
        Ok(Captured {
            code: output.status.code(),
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }

    /// Runs with piped output and fails on a non-zero exit, carrying stderr.
    pub async fn output(self) -> Result<Captured> {
        let tool = self.tool.clone();
        let context = self.context.clone();
        let captured = self.capture().await?;
        if captured.success {
            Ok(captured)
        } else {
            Err(Error::ToolFailed {
                tool,
                package: context,
                code: captured.code,
                stderr: captured.stderr,
            })
        }
    }

    /// Spawns with inherited stdio for long-running tools.
    pub fn spawn(mut self) -> Result<Child> {
        debug!(tool = %self.tool, context = %self.context, "spawning");
        Ok(self
            .command
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()?)
    }
}
