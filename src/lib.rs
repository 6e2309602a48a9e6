//! devstack-init library
//!
//! Provisions a local PHP/Apache/MySQL development environment for the
//! application: installs the runtime stack and supporting tools, wires up
//! package-registry authentication, clones the repository, and registers
//! the site under `<name>.local`.
//!
//! # Design Principles
//!
//! - **Sequential and fail-fast**: steps run in a fixed order and the first
//!   failure stops the run, naming the failed step
//! - **Idempotent mutations**: config file edits append only when the entry
//!   is absent, so a partially failed run can simply be repeated
//! - **Testable seams**: OS access goes through injected handles
//!   (`SystemPaths`, `MachineEnv`, `GhCli`) rather than ambient calls

pub mod config;
pub mod github;
pub mod pkg;
pub mod steps;
pub mod system;
pub mod textfile;

mod error;

pub use error::ProvisionError;

use crate::config::ProvisionConfig;
use crate::github::{Credentials, GhCli, GhCommandCli};
use crate::system::{CommandRunner, MachineEnv, RegistryEnv, SystemPaths};
use std::path::PathBuf;
use tracing::info;

/// Provisioning steps in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Elevation check
    Preflight,
    /// GitHub username/token resolution
    Credentials,
    /// XAMPP install, PATH registration, PHP version check
    Stack,
    /// Node.js install
    Node,
    /// Composer install and auth.json
    Composer,
    /// Private registry entries in .npmrc
    NpmRegistry,
    /// Application repository clone
    Clone,
    /// Apache virtual host registration
    Vhost,
    /// Loopback hosts-file entry
    Hosts,
    /// .env materialization
    EnvFile,
    /// composer install / npm install in the clone
    Dependencies,
}

impl Step {
    /// All steps in execution order
    pub const ALL: [Step; 11] = [
        Step::Preflight,
        Step::Credentials,
        Step::Stack,
        Step::Node,
        Step::Composer,
        Step::NpmRegistry,
        Step::Clone,
        Step::Vhost,
        Step::Hosts,
        Step::EnvFile,
        Step::Dependencies,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Step::Preflight => "preflight",
            Step::Credentials => "credentials",
            Step::Stack => "stack",
            Step::Node => "node",
            Step::Composer => "composer",
            Step::NpmRegistry => "npm-registry",
            Step::Clone => "clone",
            Step::Vhost => "vhost",
            Step::Hosts => "hosts",
            Step::EnvFile => "env-file",
            Step::Dependencies => "dependencies",
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Validate the installation target: one filesystem path segment that is
/// also a usable DNS label
pub fn validate_target_name(name: &str) -> Result<(), ProvisionError> {
    let valid = !name.is_empty()
        && name.len() <= 63
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        && !name.starts_with('-')
        && !name.ends_with('-');
    if valid {
        Ok(())
    } else {
        Err(ProvisionError::InvalidData(format!(
            "invalid target name '{name}': use letters, digits, and inner hyphens (max 63 chars)"
        )))
    }
}

/// Runs the provisioning workflow, carrying state between steps
pub struct Provisioner {
    name: String,
    username: Option<String>,
    token: Option<String>,
    config: ProvisionConfig,
    paths: SystemPaths,
    runner: CommandRunner,
    machine_env: Box<dyn MachineEnv>,
    gh: Box<dyn GhCli>,
    credentials: Option<Credentials>,
    app_dir: Option<PathBuf>,
}

impl Provisioner {
    /// Build a provisioner against the real system
    pub fn new(
        name: String,
        username: Option<String>,
        token: Option<String>,
        config: ProvisionConfig,
    ) -> Self {
        let paths = SystemPaths::new(&config.stack_root);
        let runner = CommandRunner::new();
        let gh = GhCommandCli::new(runner.clone(), config.packages.gh.clone());
        Self {
            name,
            username,
            token,
            config,
            paths,
            runner,
            machine_env: Box::new(RegistryEnv::new()),
            gh: Box::new(gh),
            credentials: None,
            app_dir: None,
        }
    }

    /// Directory of the cloned application, once the clone step has run
    pub fn app_dir(&self) -> Option<&PathBuf> {
        self.app_dir.as_ref()
    }

    fn require_app_dir(&self) -> Result<PathBuf, ProvisionError> {
        self.app_dir
            .clone()
            .ok_or_else(|| ProvisionError::Precondition("clone step has not run".to_string()))
    }

    /// Run every step in order, stopping at the first failure
    pub async fn run(&mut self) -> Result<(), ProvisionError> {
        validate_target_name(&self.name)?;

        for step in Step::ALL {
            info!("Starting step: {}", step);
            self.run_step(step)
                .await
                .map_err(|e| ProvisionError::step(step.name(), e.to_string()))?;
            info!("Completed step: {}", step);
        }

        info!("Provisioning of '{}' complete", self.name);
        Ok(())
    }

    async fn run_step(&mut self, step: Step) -> Result<(), ProvisionError> {
        match step {
            Step::Preflight => steps::preflight::run(&self.runner).await,
            Step::Credentials => {
                let credentials = github::resolve_credentials(
                    self.username.as_deref(),
                    self.token.as_deref(),
                    self.gh.as_ref(),
                )
                .await?;
                self.credentials = Some(credentials);
                Ok(())
            }
            Step::Stack => {
                steps::stack::run(
                    &self.config,
                    &self.paths,
                    &mut self.runner,
                    self.machine_env.as_ref(),
                )
                .await
            }
            Step::Node => steps::node::run(&self.runner, &self.config.packages).await,
            Step::Composer => {
                let credentials = self.credentials()?;
                steps::composer::run(&self.config, &self.paths, &self.runner, &credentials).await
            }
            Step::NpmRegistry => {
                let credentials = self.credentials()?;
                steps::npm_registry::run(&self.config, &self.paths, &credentials.token).await
            }
            Step::Clone => {
                let app_dir = steps::clone::run(&self.config, &self.runner, &self.name).await?;
                self.app_dir = Some(app_dir);
                Ok(())
            }
            Step::Vhost => {
                let app_dir = self.require_app_dir()?;
                steps::vhost::run(&self.config, &self.paths, &self.name, &app_dir).await
            }
            Step::Hosts => steps::hosts::run(&self.paths, &self.name).await,
            Step::EnvFile => {
                let app_dir = self.require_app_dir()?;
                steps::env_file::run(&app_dir).await
            }
            Step::Dependencies => {
                let app_dir = self.require_app_dir()?;
                steps::dependencies::run(&self.config, &self.runner, &app_dir).await
            }
        }
    }

    fn credentials(&self) -> Result<Credentials, ProvisionError> {
        self.credentials.clone().ok_or_else(|| {
            ProvisionError::Auth("credentials step has not run".to_string())
        })
    }
}
