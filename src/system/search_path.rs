//! Machine search-path registration
//!
//! Binary directories for PHP, Apache, and MySQL are appended to the
//! machine-wide PATH so installed tools stay resolvable in future shells.
//! After persisting, the session view is refreshed by merging the session
//! and machine values with order-preserving dedup; the command runner then
//! applies the merged value to every later spawn.

use crate::ProvisionError;
use crate::system::CommandRunner;
use async_trait::async_trait;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

/// Separator used by the machine PATH value
pub const PATH_SEPARATOR: char = ';';

const ENVIRONMENT_KEY: &str = r"HKLM\SYSTEM\CurrentControlSet\Control\Session Manager\Environment";

/// Whether the PATH value already mentions the directory.
/// Plain substring match, not path-normalized.
pub fn contains_dir(value: &str, dir: &str) -> bool {
    value.contains(dir)
}

/// Append a directory to a PATH value with the separator
pub fn push_dir(value: &str, dir: &str) -> String {
    if value.is_empty() {
        dir.to_string()
    } else if value.ends_with(PATH_SEPARATOR) {
        format!("{value}{dir}")
    } else {
        format!("{value}{PATH_SEPARATOR}{dir}")
    }
}

/// Merge session and machine PATH values, keeping first occurrences
pub fn merge_session(session: &str, machine: &str) -> String {
    let mut seen = HashSet::new();
    let mut merged = Vec::new();
    for entry in session
        .split(PATH_SEPARATOR)
        .chain(machine.split(PATH_SEPARATOR))
    {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        if seen.insert(entry.to_string()) {
            merged.push(entry);
        }
    }
    merged.join(&PATH_SEPARATOR.to_string())
}

/// Read/write access to the machine-wide PATH variable
#[async_trait]
pub trait MachineEnv: Send + Sync {
    async fn read_path(&self) -> Result<String, ProvisionError>;
    async fn write_path(&self, value: &str) -> Result<(), ProvisionError>;
}

/// Machine environment backed by the Windows registry (`reg` / `setx`)
#[derive(Debug, Default)]
pub struct RegistryEnv {
    runner: CommandRunner,
}

impl RegistryEnv {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MachineEnv for RegistryEnv {
    async fn read_path(&self) -> Result<String, ProvisionError> {
        let output = self
            .runner
            .output("reg", ["query", ENVIRONMENT_KEY, "/v", "Path"])
            .await?;
        if !output.status.success() {
            return Err(ProvisionError::command(
                "reg query for the machine Path value failed".to_string(),
            ));
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_reg_value(&stdout).ok_or_else(|| {
            ProvisionError::InvalidData("could not parse reg query output for Path".to_string())
        })
    }

    async fn write_path(&self, value: &str) -> Result<(), ProvisionError> {
        self.runner.run_checked("setx", ["/M", "Path", value]).await
    }
}

/// Extract the value column from `reg query ... /v Path` output
pub fn parse_reg_value(output: &str) -> Option<String> {
    for line in output.lines() {
        let trimmed = line.trim();
        if !trimmed.starts_with("Path") {
            continue;
        }
        for kind in ["REG_EXPAND_SZ", "REG_SZ"] {
            if let Some(idx) = trimmed.find(kind) {
                return Some(trimmed[idx + kind.len()..].trim().to_string());
            }
        }
    }
    None
}

/// Register a directory on the machine PATH and return the refreshed
/// session value
pub async fn register(
    machine: &dyn MachineEnv,
    session: &str,
    dir: &Path,
) -> Result<String, ProvisionError> {
    let dir = dir.display().to_string();
    let mut machine_value = machine.read_path().await?;
    if contains_dir(&machine_value, &dir) {
        debug!("{} already on the machine PATH", dir);
    } else {
        machine_value = push_dir(&machine_value, &dir);
        machine.write_path(&machine_value).await?;
        info!("Added {} to the machine PATH", dir);
    }
    Ok(merge_session(session, &machine_value))
}
