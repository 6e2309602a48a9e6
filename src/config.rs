//! Tool configuration
//!
//! Built-in defaults cover the standard setup; an optional `devstack.yaml`
//! next to the invocation overrides individual fields. The accepted PHP
//! versions and the form-builder publish step live here because the two
//! historical setup script variants disagreed on them.

use crate::ProvisionError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Default config file looked up next to the invocation
pub const DEFAULT_CONFIG_FILE: &str = "devstack.yaml";

/// Package identifiers for one tool under each supported package manager
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageRef {
    pub winget: String,
    pub choco: String,
}

impl PackageRef {
    fn new(winget: &str, choco: &str) -> Self {
        Self {
            winget: winget.to_string(),
            choco: choco.to_string(),
        }
    }
}

/// Installable tools and their package ids
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageSet {
    pub xampp: PackageRef,
    pub node: PackageRef,
    pub git: PackageRef,
    pub gh: PackageRef,
    pub composer: PackageRef,
}

impl Default for PackageSet {
    fn default() -> Self {
        Self {
            xampp: PackageRef::new("ApacheFriends.Xampp.8.2", "xampp-82"),
            node: PackageRef::new("OpenJS.NodeJS.LTS", "nodejs-lts"),
            git: PackageRef::new("Git.Git", "git"),
            gh: PackageRef::new("GitHub.cli", "gh"),
            composer: PackageRef::new("Composer.Composer", "composer"),
        }
    }
}

/// Full provisioning configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvisionConfig {
    /// Application repository cloned into the target directory
    pub repo_url: String,

    /// Accepted PHP version prefixes, matched against `php -v`
    pub php_versions: Vec<String>,

    /// php.ini extensions uncommented after install
    pub php_extensions: Vec<String>,

    /// npm scope routed to the private registry
    pub npm_scope: String,

    /// Private npm registry URL
    pub npm_registry: String,

    /// Host keyed in the Composer auth file
    pub composer_auth_host: String,

    /// XAMPP install root
    pub stack_root: PathBuf,

    /// Run-as user forced in the Apache config
    pub apache_run_user: String,

    /// Run-as group forced in the Apache config
    pub apache_run_group: String,

    /// Run the form-builder asset publish after dependency install
    pub publish_form_builder: bool,

    pub packages: PackageSet,
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            repo_url: "https://github.com/sheetsapp/sheets.git".to_string(),
            php_versions: vec!["8.1.".to_string(), "8.2.".to_string()],
            php_extensions: vec!["curl".to_string(), "intl".to_string(), "zip".to_string()],
            npm_scope: "@sheets".to_string(),
            npm_registry: "https://npm.pkg.github.com/".to_string(),
            composer_auth_host: "repo.packagist.com".to_string(),
            stack_root: PathBuf::from(r"C:\xampp"),
            apache_run_user: "daemon".to_string(),
            apache_run_group: "daemon".to_string(),
            publish_form_builder: false,
            packages: PackageSet::default(),
        }
    }
}

impl ProvisionConfig {
    /// Parse a config from YAML text; missing fields keep their defaults
    pub fn from_yaml(text: &str) -> Result<Self, ProvisionError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Load configuration.
    ///
    /// An explicitly given path must exist. Without one, `devstack.yaml`
    /// in the current directory is used when present, otherwise the
    /// built-in defaults.
    pub async fn load(path: Option<&Path>) -> Result<Self, ProvisionError> {
        match path {
            Some(path) => {
                let text = fs::read_to_string(path).await?;
                info!("Loaded configuration from {}", path.display());
                Self::from_yaml(&text)
            }
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    let text = fs::read_to_string(default).await?;
                    info!("Loaded configuration from {}", default.display());
                    Self::from_yaml(&text)
                } else {
                    debug!("No config file found, using built-in defaults");
                    Ok(Self::default())
                }
            }
        }
    }
}
