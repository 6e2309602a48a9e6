//! Environment file step
//!
//! Copies `.env.example` to `.env` when the latter is absent, then forces
//! `SESSION_SECURE_COOKIE=false` so the site works over plain http on
//! `<name>.local`. Only that one line is touched; an existing `.env` is
//! never overwritten by the template.

use crate::ProvisionError;
use crate::textfile::LineFile;
use std::path::Path;
use tokio::fs;
use tracing::{debug, info};

/// Key rewritten after materialization
pub const SECURE_COOKIE_KEY: &str = "SESSION_SECURE_COOKIE";

pub async fn run(app_dir: &Path) -> Result<(), ProvisionError> {
    let target = app_dir.join(".env");
    let template = app_dir.join(".env.example");

    if target.exists() {
        info!(".env already exists, leaving it in place");
    } else {
        if !template.exists() {
            return Err(ProvisionError::Precondition(format!(
                "{} not found in the cloned repository",
                template.display()
            )));
        }
        fs::copy(&template, &target).await?;
        info!("Created .env from .env.example");
    }

    let mut env = LineFile::open(&target).await?;
    if env.set_key(SECURE_COOKIE_KEY, "false") {
        debug!("{} forced to false", SECURE_COOKIE_KEY);
    }
    if env.is_dirty() {
        env.save().await?;
    }
    Ok(())
}
