//! Provisioning steps
//!
//! Each module handles one step of the workflow. Steps are executed in a
//! fixed order by the `Provisioner`; the first failure stops the run.

pub mod clone;
pub mod composer;
pub mod dependencies;
pub mod env_file;
pub mod hosts;
pub mod node;
pub mod npm_registry;
pub mod preflight;
pub mod stack;
pub mod vhost;

use crate::config::ProvisionConfig;
use crate::system::{CommandRunner, SystemPaths, elevation};

/// Read-only probe of the local toolchain, printed as a report.
/// Returns false when anything required is missing.
pub async fn check(
    config: &ProvisionConfig,
    paths: &SystemPaths,
    runner: &CommandRunner,
) -> bool {
    let mut ok = true;

    let elevated = elevation::is_elevated(runner).await;
    report("elevated", elevated);
    ok &= elevated;

    let stack_present = paths.stack_root().exists();
    report("xampp", stack_present);
    ok &= stack_present;

    for tool in ["git", "gh", "composer", "node", "npm"] {
        let found = runner.exists(tool).await;
        report(tool, found);
        ok &= found;
    }

    if runner.exists("php").await {
        match stack::check_php_version(config, runner).await {
            Ok(version) => println!("{:12} ok ({version})", "php"),
            Err(e) => {
                println!("{:12} unsupported ({e})", "php");
                ok = false;
            }
        }
    } else {
        report("php", false);
        ok = false;
    }

    ok
}

fn report(name: &str, ok: bool) {
    println!("{:12} {}", name, if ok { "ok" } else { "missing" });
}
