//! Node.js step

use crate::ProvisionError;
use crate::config::PackageSet;
use crate::pkg;
use crate::system::CommandRunner;
use tracing::info;

/// Make sure node and npm are available, installing the LTS release if not
pub async fn run(runner: &CommandRunner, packages: &PackageSet) -> Result<(), ProvisionError> {
    if pkg::ensure_installed(runner, "npm", &packages.node).await? {
        info!("Installed Node.js");
    }
    Ok(())
}
