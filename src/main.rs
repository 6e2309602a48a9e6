//! devstack-init - local PHP development environment provisioner
//!
//! Installs and configures the XAMPP stack, Composer, Node.js, and the
//! GitHub CLI, then clones the application and registers it as a local
//! Apache virtual host.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use devstack_init::Provisioner;
use devstack_init::config::ProvisionConfig;
use devstack_init::steps;
use devstack_init::system::{CommandRunner, SystemPaths};

#[derive(Parser)]
#[command(name = "devstack-init")]
#[command(author, version, about = "Local PHP development environment provisioner", long_about = None)]
struct Cli {
    /// Installation target: clone directory and virtual-host name
    #[arg(default_value = "sheets")]
    name: String,

    /// GitHub username (resolved via the gh CLI when omitted)
    #[arg(long)]
    username: Option<String>,

    /// GitHub token (resolved via the gh CLI when omitted)
    #[arg(long)]
    token: Option<String>,

    /// Config file overriding the built-in defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe the local toolchain without changing anything
    Check,
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = ProvisionConfig::load(cli.config.as_deref())
        .await
        .context("failed to load configuration")?;

    match cli.command {
        Some(Commands::Check) => {
            let paths = SystemPaths::new(&config.stack_root);
            let runner = CommandRunner::new();
            if !steps::check(&config, &paths, &runner).await {
                std::process::exit(1);
            }
        }
        None => {
            info!("Provisioning environment '{}'", cli.name);
            let mut provisioner =
                Provisioner::new(cli.name.clone(), cli.username, cli.token, config);
            provisioner.run().await?;
            println!("Environment '{}' is ready.", cli.name);
        }
    }

    Ok(())
}
