//! Preflight step

use crate::ProvisionError;
use crate::system::{CommandRunner, elevation};
use tracing::debug;

/// Abort unless the process runs from an elevated shell
pub async fn run(runner: &CommandRunner) -> Result<(), ProvisionError> {
    if !elevation::is_elevated(runner).await {
        return Err(ProvisionError::Precondition(
            "administrator rights required; re-run from an elevated shell".to_string(),
        ));
    }
    debug!("Elevation check passed");
    Ok(())
}
