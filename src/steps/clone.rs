//! Repository clone step
//!
//! Clones the application repository into the target directory. A previous
//! successful clone is detected by its `.git` directory and skipped so a
//! partially failed run can be repeated safely.

use crate::ProvisionError;
use crate::config::ProvisionConfig;
use crate::pkg;
use crate::system::CommandRunner;
use std::path::PathBuf;
use tracing::info;

pub async fn run(
    config: &ProvisionConfig,
    runner: &CommandRunner,
    name: &str,
) -> Result<PathBuf, ProvisionError> {
    if pkg::ensure_installed(runner, "git", &config.packages.git).await? {
        info!("Installed git");
    }

    let target = std::env::current_dir()?.join(name);
    if target.join(".git").exists() {
        info!("Repository already cloned at {}, skipping", target.display());
        return Ok(target);
    }
    if target.exists() {
        return Err(ProvisionError::Precondition(format!(
            "{} exists but is not a git checkout",
            target.display()
        )));
    }

    info!("Cloning {} into {}", config.repo_url, target.display());
    runner
        .run_checked("git", ["clone", config.repo_url.as_str(), name])
        .await?;
    Ok(target)
}
