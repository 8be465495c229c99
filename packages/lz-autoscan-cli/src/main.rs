use anyhow::Result;
use clap::{Parser, Subcommand};
use lz_autoscan_core::{relayer::Relayer, Config};
use std::path::PathBuf;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the configuration and print a summary
    ValidateConfig {
        /// JSON config file; environment variables are used when omitted
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
    /// Start polling the explorer and executing pending messages
    Start {
        /// JSON config file; environment variables are used when omitted
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Run a single poll cycle and exit
        #[arg(long)]
        once: bool,
    },
}

fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let config = match path {
        Some(path) => {
            info!("Using config file: {:?}", path);
            Config::load(path)?
        }
        None => {
            if let Ok(path) = dotenvy::dotenv() {
                info!("Loaded environment from {:?}", path);
            }
            Config::from_env()?
        }
    };
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::ValidateConfig { config } => {
            let config = load_config(config)?;
            println!("Configuration is valid");
            println!("- Owner: {}", config.owner);
            println!("- Executor contract: {}", config.executor_address);
            println!("- RPC: {}", config.rpc_url);
            println!("- Destination EID: {}", config.dst_eid);
            println!("- Poll interval: {} ms", config.poll_interval_ms);
            println!("- Gas limit: {}", config.gas_limit);
            println!("- Explorer API: {} (limit {})", config.explorer.api_url, config.explorer.page_limit);
            println!("- Explorer pages: {}", config.explorer.scan_url);
            Ok(())
        }
        Commands::Start { config, once } => {
            let config = load_config(config).map_err(|e| {
                error!("Invalid configuration: {}", e);
                e
            })?;

            let relayer = Relayer::from_config(&config)?;

            if once {
                let report = relayer.poll_once().await;
                info!(?report, "Single cycle finished");
                return Ok(());
            }

            let (stop, shutdown) = watch::channel(false);
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("Ctrl-C received, stopping after the current cycle");
                    let _ = stop.send(true);
                }
            });

            relayer.run(shutdown).await;
            Ok(())
        }
    }
}
