//! Hosts file step
//!
//! Adds a loopback entry so `<name>.local` resolves to the local Apache.
//! An existing line mentioning the hostname is never rewritten.

use crate::ProvisionError;
use crate::system::SystemPaths;
use crate::textfile::LineFile;
use tracing::{info, warn};

pub async fn run(paths: &SystemPaths, name: &str) -> Result<(), ProvisionError> {
    let hostname = format!("{name}.local");
    let entry = format!("127.0.0.1 {hostname}");

    let mut hosts = LineFile::open(paths.hosts()).await?;
    if hosts.append_if_absent(&hostname, &entry) {
        hosts.save().await?;
        info!("Added {} to the hosts file", entry);
    } else if hosts.contains_line(&entry) {
        info!("Hosts entry for {} already present", hostname);
    } else {
        warn!(
            "Hosts file already mentions {} with a different entry, leaving it untouched",
            hostname
        );
    }
    Ok(())
}
