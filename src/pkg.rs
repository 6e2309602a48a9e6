//! OS package manager integration
//!
//! Tools missing from the machine are installed through winget or
//! Chocolatey, whichever resolves first.

use crate::ProvisionError;
use crate::config::PackageRef;
use crate::system::CommandRunner;
use tracing::{debug, info};

/// Detected package manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    Winget,
    Choco,
}

impl PackageManager {
    /// Detect the system's package manager
    pub async fn detect(runner: &CommandRunner) -> Option<Self> {
        // Check in order of preference
        if runner.exists("winget").await {
            return Some(Self::Winget);
        }
        if runner.exists("choco").await {
            return Some(Self::Choco);
        }
        None
    }

    /// Package id for this manager
    pub fn id<'a>(&self, package: &'a PackageRef) -> &'a str {
        match self {
            Self::Winget => &package.winget,
            Self::Choco => &package.choco,
        }
    }

    fn install_command(&self, id: &str) -> (&'static str, Vec<String>) {
        match self {
            Self::Winget => (
                "winget",
                ["install", "--id", id, "--exact", "--silent",
                    "--accept-package-agreements", "--accept-source-agreements"]
                    .map(String::from)
                    .to_vec(),
            ),
            Self::Choco => ("choco", ["install", id, "-y"].map(String::from).to_vec()),
        }
    }

    /// Install one package, treating a non-zero exit as fatal
    pub async fn install(
        &self,
        runner: &CommandRunner,
        package: &PackageRef,
    ) -> Result<(), ProvisionError> {
        let id = self.id(package);
        info!("Installing {} using {:?}", id, self);
        let (cmd, args) = self.install_command(id);
        runner.run_checked(cmd, args).await
    }
}

/// Make sure `tool` resolves on the search path, installing it on demand.
/// Returns true when an install happened.
pub async fn ensure_installed(
    runner: &CommandRunner,
    tool: &str,
    package: &PackageRef,
) -> Result<bool, ProvisionError> {
    if runner.exists(tool).await {
        debug!("{} already installed", tool);
        return Ok(false);
    }
    let pm = PackageManager::detect(runner).await.ok_or_else(|| {
        ProvisionError::Precondition(
            "no supported package manager found (winget or choco required)".to_string(),
        )
    })?;
    pm.install(runner, package).await?;
    if !runner.exists(tool).await {
        return Err(ProvisionError::Precondition(format!(
            "{tool} still not resolvable after install; open a new shell and re-run"
        )));
    }
    Ok(true)
}
