//! GitHub credential resolution
//!
//! Private Composer and npm packages need a username/token pair. An explicit
//! pair passed on the command line is used verbatim. Otherwise the GitHub
//! CLI is installed on demand, logged in interactively when its token lacks
//! the required scopes, and queried for the current login and token.

use crate::ProvisionError;
use crate::config::PackageRef;
use crate::pkg;
use crate::system::CommandRunner;
use async_trait::async_trait;
use tracing::{debug, info};

/// Scopes the resolved token must carry
pub const REQUIRED_SCOPES: [&str; 2] = ["repo", "read:packages"];

/// Username/token pair held in memory for the run
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub token: String,
}

/// Seam around the `gh` CLI so resolution logic is testable
#[async_trait]
pub trait GhCli: Send + Sync {
    /// Install the CLI if it is not resolvable
    async fn ensure_installed(&self) -> Result<(), ProvisionError>;

    /// Whether the current token carries every listed scope
    async fn has_scopes(&self, scopes: &[&str]) -> Result<bool, ProvisionError>;

    /// Interactive login flow, blocking until the child exits
    async fn login(&self, scopes: &[&str]) -> Result<(), ProvisionError>;

    /// Login name of the authenticated user
    async fn current_login(&self) -> Result<String, ProvisionError>;

    /// Token of the authenticated user
    async fn current_token(&self) -> Result<String, ProvisionError>;
}

/// Resolve credentials from explicit input or the GitHub CLI.
///
/// With both values supplied non-empty the CLI is never invoked.
pub async fn resolve_credentials(
    username: Option<&str>,
    token: Option<&str>,
    gh: &dyn GhCli,
) -> Result<Credentials, ProvisionError> {
    if let (Some(username), Some(token)) = (username, token) {
        if !username.is_empty() && !token.is_empty() {
            debug!("Using explicit credentials for {}", username);
            return Ok(Credentials {
                username: username.to_string(),
                token: token.to_string(),
            });
        }
    }

    gh.ensure_installed().await?;
    if !gh.has_scopes(&REQUIRED_SCOPES).await? {
        info!(
            "GitHub CLI token missing required scopes {:?}, starting login",
            REQUIRED_SCOPES
        );
        gh.login(&REQUIRED_SCOPES).await?;
    }

    let username = gh.current_login().await?;
    let token = gh.current_token().await?;
    if username.is_empty() || token.is_empty() {
        return Err(ProvisionError::Auth(
            "GitHub CLI returned an empty login or token".to_string(),
        ));
    }
    info!("Resolved credentials for {}", username);
    Ok(Credentials { username, token })
}

/// `GhCli` backed by the real `gh` executable
pub struct GhCommandCli {
    runner: CommandRunner,
    package: PackageRef,
}

impl GhCommandCli {
    pub fn new(runner: CommandRunner, package: PackageRef) -> Self {
        Self { runner, package }
    }
}

#[async_trait]
impl GhCli for GhCommandCli {
    async fn ensure_installed(&self) -> Result<(), ProvisionError> {
        pkg::ensure_installed(&self.runner, "gh", &self.package)
            .await
            .map(|_| ())
    }

    async fn has_scopes(&self, scopes: &[&str]) -> Result<bool, ProvisionError> {
        let output = self.runner.output("gh", ["auth", "status"]).await?;
        if !output.status.success() {
            return Ok(false);
        }
        // gh prints auth details on stderr in older releases
        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(status_has_scopes(&text, scopes))
    }

    async fn login(&self, scopes: &[&str]) -> Result<(), ProvisionError> {
        let scope_list = scopes.join(",");
        let args = [
            "auth",
            "login",
            "--hostname",
            "github.com",
            "--scopes",
            scope_list.as_str(),
        ];
        self.runner
            .run_interactive("gh", args)
            .await
            .map_err(|e| ProvisionError::Auth(format!("gh auth login failed: {e}")))
    }

    async fn current_login(&self) -> Result<String, ProvisionError> {
        let output = self.runner.output("gh", ["api", "user", "--jq", ".login"]).await?;
        if !output.status.success() {
            return Err(ProvisionError::Auth(
                "gh api user failed; is the CLI logged in?".to_string(),
            ));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    async fn current_token(&self) -> Result<String, ProvisionError> {
        let output = self.runner.output("gh", ["auth", "token"]).await?;
        if !output.status.success() {
            return Err(ProvisionError::Auth(
                "gh auth token failed; is the CLI logged in?".to_string(),
            ));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// Whether a `gh auth status` report lists every required scope
pub fn status_has_scopes(status_output: &str, scopes: &[&str]) -> bool {
    let Some(line) = status_output
        .lines()
        .find(|line| line.contains("Token scopes:"))
    else {
        return false;
    };
    scopes.iter().all(|scope| line.contains(scope))
}
