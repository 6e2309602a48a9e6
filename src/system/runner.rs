//! Subprocess execution
//!
//! All external tools (git, gh, php, composer, npm, winget, reg, setx) run
//! through `CommandRunner`. The runner carries the refreshed session PATH:
//! once the stack step registers newly installed binary directories, every
//! later spawn sees them without restarting the shell.

use crate::ProvisionError;
use std::ffi::OsStr;
use std::path::Path;
use std::process::Output;
use tracing::debug;

/// Spawns external processes with the current session search path applied
#[derive(Debug, Clone, Default)]
pub struct CommandRunner {
    search_path: Option<String>,
}

impl CommandRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// The refreshed session PATH, if the stack step has set one
    pub fn search_path(&self) -> Option<&str> {
        self.search_path.as_deref()
    }

    /// Session PATH as seen by spawned processes right now
    pub fn session_path(&self) -> String {
        self.search_path
            .clone()
            .unwrap_or_else(|| std::env::var("PATH").unwrap_or_default())
    }

    /// Replace the session PATH applied to every later spawn
    pub fn set_search_path(&mut self, value: String) {
        self.search_path = Some(value);
    }

    fn command(&self, program: &str) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new(program);
        if let Some(path) = &self.search_path {
            cmd.env("PATH", path);
        }
        cmd
    }

    /// Run to completion, capturing output
    pub async fn output<I, S>(&self, program: &str, args: I) -> Result<Output, ProvisionError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        debug!("Running: {}", program);
        self.command(program)
            .args(args)
            .output()
            .await
            .map_err(|e| ProvisionError::command(format!("{program}: {e}")))
    }

    /// Run to completion, treating a non-zero exit as an error
    pub async fn run_checked<I, S>(&self, program: &str, args: I) -> Result<(), ProvisionError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let output = self.output(program, args).await?;
        check_status(program, &output)
    }

    /// Like `run_checked`, but with the working directory set
    pub async fn run_checked_in<I, S>(
        &self,
        dir: &Path,
        program: &str,
        args: I,
    ) -> Result<(), ProvisionError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        debug!("Running in {}: {}", dir.display(), program);
        let output = self
            .command(program)
            .args(args)
            .current_dir(dir)
            .output()
            .await
            .map_err(|e| ProvisionError::command(format!("{program}: {e}")))?;
        check_status(program, &output)
    }

    /// Run with inherited stdio, blocking until the child exits.
    /// Used for the interactive `gh auth login` flow.
    pub async fn run_interactive<I, S>(&self, program: &str, args: I) -> Result<(), ProvisionError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let status = self
            .command(program)
            .args(args)
            .status()
            .await
            .map_err(|e| ProvisionError::command(format!("{program}: {e}")))?;
        if !status.success() {
            return Err(ProvisionError::command(format!(
                "{program} exited with status {}",
                status.code().unwrap_or(-1)
            )));
        }
        Ok(())
    }

    /// Whether an executable is resolvable on the current search path
    pub async fn exists(&self, program: &str) -> bool {
        self.output("where", [program])
            .await
            .is_ok_and(|o| o.status.success())
    }
}

fn check_status(program: &str, output: &Output) -> Result<(), ProvisionError> {
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ProvisionError::command(format!(
            "{program} exited with status {}: {}",
            output.status.code().unwrap_or(-1),
            stderr.trim()
        )));
    }
    Ok(())
}
