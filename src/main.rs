//! fluxgraph - list the Kubernetes objects reconciled by a Flux automation
//!
//! Starts from the kinds a Kustomization or HelmRelease declares and follows
//! controller ownership (Deployment → ReplicaSet → Pod, ...) to show
//! everything the automation ultimately produced.

use anyhow::Result;
use clap::{Parser, Subcommand};
use fluxgraph::cli::{
    AutomationArgs, ConfigSubcommand, ObjectsArgs, display_version, handle_config_command,
    handle_kinds_command, handle_objects_command, init_logging,
};
use fluxgraph::config::ConfigLoader;

/// List the Kubernetes objects reconciled by a Flux Kustomization or HelmRelease
#[derive(Parser, Debug)]
#[command(name = "fluxgraph")]
#[command(about = "List the Kubernetes objects reconciled by a Flux automation", long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(long, short = 'd', global = true)]
    debug: bool,

    /// Kubeconfig context to use instead of the current one
    #[arg(long, global = true)]
    context: Option<String>,

    #[command(subcommand)]
    command: Command,
}

/// Main commands
#[derive(Subcommand, Debug)]
enum Command {
    /// Show every object an automation reconciled, including controller-created children
    Objects(ObjectsArgs),
    /// Show the kinds an automation declares
    Kinds(AutomationArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Print log file location to stderr so it doesn't mix with table output
    if let Some(log_path) = init_logging(args.debug) {
        eprintln!(
            "Debug logging enabled. Logs written to: {}",
            log_path.display()
        );
    }

    let context = args.context.as_deref();
    match args.command {
        Command::Config { subcommand } => handle_config_command(subcommand),
        Command::Version => {
            display_version();
            Ok(())
        }
        Command::Objects(objects) => {
            let config = load_config();
            handle_objects_command(objects, &config, context).await
        }
        Command::Kinds(automation) => {
            let config = load_config();
            handle_kinds_command(automation, &config, context).await
        }
    }
}

fn load_config() -> fluxgraph::config::Config {
    ConfigLoader::load().unwrap_or_else(|e| {
        tracing::warn!("Failed to load configuration: {:#}, using defaults", e);
        eprintln!("warning: {:#}; using default configuration", e);
        ConfigLoader::load_defaults()
    })
}
