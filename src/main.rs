//! NEXUS - conversational pentest assistant backend
//!
#![doc = "Main entry point for the NEXUS API server and inspection CLI."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use nexus::agent::metrics::init_metrics_exporter;
use nexus::cli::{Cli, Commands, SandboxCommand};
use nexus::commands;
use nexus::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    match cli.command {
        Commands::Serve { .. } => {
            tracing::info!("Starting NEXUS API server");
            init_metrics_exporter();
            commands::handle_serve(config).await?;
        }
        Commands::Tools { json } => {
            commands::handle_tools(json)?;
        }
        Commands::Sessions => {
            commands::handle_sessions(&config).await?;
        }
        Commands::Executions { session_id } => {
            commands::handle_executions(&config, &session_id).await?;
        }
        Commands::Sandbox { command } => match command {
            SandboxCommand::Init => {
                commands::handle_sandbox_init(&config).await?;
            }
        },
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "nexus=debug" } else { "nexus=info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
