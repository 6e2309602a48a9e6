//! Composer step
//!
//! Installs Composer when missing and regenerates the machine-scoped
//! auth.json from the resolved credential pair. The auth file is written
//! wholesale each run, never merged with existing content.

use crate::ProvisionError;
use crate::config::{PackageSet, ProvisionConfig};
use crate::github::Credentials;
use crate::pkg;
use crate::system::{CommandRunner, SystemPaths};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tokio::fs;
use tracing::info;

/// Composer auth.json document
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ComposerAuth {
    #[serde(rename = "http-basic", default)]
    pub http_basic: BTreeMap<String, HttpBasic>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HttpBasic {
    pub username: String,
    pub password: String,
}

pub async fn run(
    config: &ProvisionConfig,
    paths: &SystemPaths,
    runner: &CommandRunner,
    credentials: &Credentials,
) -> Result<(), ProvisionError> {
    ensure(runner, &config.packages).await?;
    write_auth(config, paths, credentials).await
}

/// Install Composer through the package manager when missing
pub async fn ensure(runner: &CommandRunner, packages: &PackageSet) -> Result<(), ProvisionError> {
    if pkg::ensure_installed(runner, "composer", &packages.composer).await? {
        info!("Installed Composer");
    }
    Ok(())
}

/// Regenerate auth.json from the current credential pair
pub async fn write_auth(
    config: &ProvisionConfig,
    paths: &SystemPaths,
    credentials: &Credentials,
) -> Result<(), ProvisionError> {
    let mut auth = ComposerAuth::default();
    auth.http_basic.insert(
        config.composer_auth_host.clone(),
        HttpBasic {
            username: credentials.username.clone(),
            password: credentials.token.clone(),
        },
    );

    let path = paths.composer_auth();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    let mut json = serde_json::to_string_pretty(&auth)?;
    json.push('\n');
    fs::write(&path, json).await?;
    info!("Wrote Composer credentials to {}", path.display());
    Ok(())
}
