//! Elevation probe
//!
//! `net session` succeeds only from an elevated shell, which makes it a
//! cheap administrator check without touching any Win32 API.

use crate::system::CommandRunner;

/// Whether the current process runs with administrator rights
pub async fn is_elevated(runner: &CommandRunner) -> bool {
    runner
        .output("net", ["session"])
        .await
        .is_ok_and(|o| o.status.success())
}
