//! npm registry step
//!
//! Routes the application scope to the private registry and stores the
//! auth token, both as idempotent line appends on the per-user `.npmrc`.
//! Entries that already exist with different content are left untouched
//! and reported as warnings.

use crate::ProvisionError;
use crate::config::ProvisionConfig;
use crate::system::SystemPaths;
use crate::textfile::LineFile;
use tracing::{debug, info, warn};

pub async fn run(
    config: &ProvisionConfig,
    paths: &SystemPaths,
    token: &str,
) -> Result<(), ProvisionError> {
    let mut npmrc = LineFile::open(paths.npmrc()).await?;

    let registry_line = format!("{}:registry={}", config.npm_scope, config.npm_registry);
    let registry_pattern = format!("{}:registry", config.npm_scope);
    append_entry(&mut npmrc, &registry_pattern, &registry_line);

    let host = registry_host(&config.npm_registry);
    let token_line = format!("//{host}:_authToken={token}");
    let token_pattern = format!("//{host}:_authToken");
    append_entry(&mut npmrc, &token_pattern, &token_line);

    if npmrc.is_dirty() {
        npmrc.save().await?;
        info!("Updated {}", paths.npmrc().display());
    }
    Ok(())
}

fn append_entry(npmrc: &mut LineFile, pattern: &str, line: &str) {
    if !npmrc.append_if_absent(pattern, line) {
        if npmrc.contains_line(line) {
            debug!("{} already present", pattern);
        } else {
            warn!(
                "{} entry already exists with different content, leaving it untouched",
                pattern
            );
        }
    }
}

/// Registry URL reduced to the `host/path/` form used by `.npmrc` token keys
pub fn registry_host(url: &str) -> String {
    let stripped = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    if stripped.ends_with('/') {
        stripped.to_string()
    } else {
        format!("{stripped}/")
    }
}
