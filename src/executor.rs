//! Shell command execution inside a generated project.

use std::path::{Path, PathBuf};
use std::process::{self, Stdio};

use log::{info, warn};

use crate::error::{Error, Result};
use crate::platform::Platform;

/// Resolves a project directory, falling back to the current directory when empty.
pub fn resolve_project_path<P: AsRef<Path>>(project_path: P) -> Result<PathBuf> {
    let project_path = project_path.as_ref();
    if project_path.as_os_str().is_empty() {
        return Ok(std::env::current_dir()?);
    }
    Ok(project_path.to_path_buf())
}

/// A shell command queued for an [`Executor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    cmd: String,
    skip_on_error: bool,
    enabled: bool,
}

impl Command {
    pub fn new(cmd: impl Into<String>, skip_on_error: bool) -> Self {
        Self {
            cmd: cmd.into(),
            skip_on_error,
            enabled: true,
        }
    }

    /// A command whose failure does not stop the remaining ones.
    pub fn default_command(cmd: impl Into<String>) -> Self {
        Self::new(cmd, true)
    }

    /// A command that only runs when `enabled` is true.
    pub fn conditional(cmd: impl Into<String>, enabled: bool, skip_on_error: bool) -> Self {
        Self {
            cmd: cmd.into(),
            skip_on_error,
            enabled,
        }
    }

    pub fn cmd(&self) -> &str {
        &self.cmd
    }

    pub fn skip_on_error(&self) -> bool {
        self.skip_on_error
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }
}

/// Runs commands through the platform shell with the project as working directory.
#[derive(Debug, Clone)]
pub struct Executor {
    project_path: PathBuf,
    platform: Platform,
    envs: Vec<(String, String)>,
}

impl Executor {
    pub fn new<P: AsRef<Path>>(project_path: P, platform: Platform) -> Result<Self> {
        Ok(Self {
            project_path: resolve_project_path(project_path)?,
            platform,
            envs: Vec::new(),
        })
    }

    /// Sets an environment variable for every command this executor runs.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    pub fn project_path(&self) -> &Path {
        &self.project_path
    }

    /// Runs a single command and returns its standard output.
    ///
    /// # Errors
    /// * `Error::IoError` if the shell cannot be spawned
    /// * `Error::CommandFailed` if the command exits with a non-zero status
    pub fn exec(&self, command: &str) -> Result<String> {
        let (shell, flag) = self.platform.shell();
        let output = process::Command::new(shell)
            .arg(flag)
            .arg(command)
            .current_dir(&self.project_path)
            .envs(self.envs.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::null())
            .output()?;

        if !output.status.success() {
            return Err(Error::CommandFailed {
                command: command.to_string(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Runs enabled commands in order, stopping at the first failure of a command
    /// that does not allow skipping.
    pub fn run_all(&self, commands: &[Command]) -> Result<()> {
        for command in commands.iter().filter(|c| c.enabled) {
            info!("{}", command.cmd);
            match self.exec(&command.cmd) {
                Ok(_) => {}
                Err(e) if command.skip_on_error => {
                    warn!("Ignoring failed command '{}': {}", command.cmd, e);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}
