//! Dependency install step
//!
//! Runs the Composer and npm installs inside the cloned repository, plus
//! the optional form-builder asset publish when enabled in configuration.

use crate::ProvisionError;
use crate::config::ProvisionConfig;
use crate::system::CommandRunner;
use std::path::Path;
use tracing::info;

pub async fn run(
    config: &ProvisionConfig,
    runner: &CommandRunner,
    app_dir: &Path,
) -> Result<(), ProvisionError> {
    info!("Installing Composer dependencies");
    runner
        .run_checked_in(app_dir, "composer", ["install", "--no-interaction"])
        .await?;

    info!("Installing npm dependencies");
    runner.run_checked_in(app_dir, "npm", ["install"]).await?;

    if config.publish_form_builder {
        info!("Publishing form-builder assets");
        runner
            .run_checked_in(
                app_dir,
                "php",
                ["artisan", "vendor:publish", "--tag=form-builder"],
            )
            .await?;
    }
    Ok(())
}
