//! Runtime stack step
//!
//! Detects XAMPP at its configured root and installs it when missing, puts
//! the PHP, Apache, and MySQL binary directories on the machine PATH,
//! verifies the PHP version against the configured allow-list, and enables
//! the php.ini extensions the application needs.

use crate::ProvisionError;
use crate::config::ProvisionConfig;
use crate::pkg::PackageManager;
use crate::system::{CommandRunner, MachineEnv, SystemPaths, search_path};
use crate::textfile::LineFile;
use std::path::Path;
use tracing::{debug, info};

pub async fn run(
    config: &ProvisionConfig,
    paths: &SystemPaths,
    runner: &mut CommandRunner,
    machine: &dyn MachineEnv,
) -> Result<(), ProvisionError> {
    if paths.stack_root().exists() {
        info!("XAMPP already installed at {}", paths.stack_root().display());
    } else {
        info!(
            "XAMPP not found at {}, installing",
            paths.stack_root().display()
        );
        let pm = PackageManager::detect(runner).await.ok_or_else(|| {
            ProvisionError::Precondition(
                "no supported package manager found (winget or choco required)".to_string(),
            )
        })?;
        pm.install(runner, &config.packages.xampp).await?;
        if !paths.stack_root().exists() {
            return Err(ProvisionError::Precondition(format!(
                "{} still missing after install",
                paths.stack_root().display()
            )));
        }
    }

    // Later steps resolve php/composer/npm through the refreshed session path
    for dir in [paths.php_dir(), paths.apache_bin(), paths.mysql_bin()] {
        let session = runner.session_path();
        let refreshed = search_path::register(machine, &session, &dir).await?;
        runner.set_search_path(refreshed);
    }

    let version = check_php_version(config, runner).await?;
    info!("PHP {} accepted", version);

    let enabled = enable_extensions(&paths.php_ini(), &config.php_extensions).await?;
    if !enabled.is_empty() {
        info!("Enabled php.ini extensions: {}", enabled.join(", "));
    }

    Ok(())
}

/// Run `php -v` and match the reported version against the allow-list
pub async fn check_php_version(
    config: &ProvisionConfig,
    runner: &CommandRunner,
) -> Result<String, ProvisionError> {
    let output = runner.output("php", ["-v"]).await?;
    if !output.status.success() {
        return Err(ProvisionError::Precondition(
            "php -v failed; the PHP binary directory may not be on the PATH yet".to_string(),
        ));
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    let version = parse_php_version(&stdout).ok_or_else(|| {
        ProvisionError::Precondition("could not parse the php -v output".to_string())
    })?;
    if config
        .php_versions
        .iter()
        .any(|prefix| version.starts_with(prefix.as_str()))
    {
        Ok(version)
    } else {
        Err(ProvisionError::Precondition(format!(
            "PHP {version} is not supported (accepted prefixes: {})",
            config.php_versions.join(", ")
        )))
    }
}

/// Extract the version number from the first line of `php -v` output
pub fn parse_php_version(output: &str) -> Option<String> {
    let first = output.lines().next()?;
    let rest = first.strip_prefix("PHP ")?;
    rest.split_whitespace().next().map(String::from)
}

/// Uncomment `;extension=<name>` lines for the listed extensions.
/// Returns the extensions that were newly enabled.
pub async fn enable_extensions(
    php_ini: &Path,
    extensions: &[String],
) -> Result<Vec<String>, ProvisionError> {
    let mut ini = LineFile::open(php_ini).await?;
    let mut enabled = Vec::new();
    for ext in extensions {
        let directive = format!("extension={ext}");
        if ini.uncomment(';', &directive) {
            enabled.push(ext.clone());
        } else {
            debug!("extension {} already enabled or not shipped", ext);
        }
    }
    if ini.is_dirty() {
        ini.save().await?;
    }
    Ok(enabled)
}
