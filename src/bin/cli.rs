//! FaucetChain CLI
//!
//! Command-line interface for the faucet tracker:
//! - Show faucet status
//! - Claim a faucet
//! - Watch the countdown
//! - Format a duration
//! - Generate a config file

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use faucetchain::faucet::{format_remaining, ChannelSink, FaucetSummary, NotificationSink};
use faucetchain::{generate_default_config, init_tracing, Config, FaucetPanel};

#[derive(Parser)]
#[command(name = "faucetchain")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Faucet cooldown tracker for FaucetChain")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search the standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show every faucet and its cooldown
    Status,

    /// Claim a faucet
    Claim {
        /// Faucet id (e.g. main-faucet)
        id: String,
    },

    /// Print the panel on every tick
    Watch {
        /// Number of ticks to watch
        #[arg(short, long, default_value = "5")]
        ticks: u32,
    },

    /// Format milliseconds as Hh Mm Ss
    Format {
        /// Duration in milliseconds
        ms: u64,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::load_default(),
    };
    init_tracing(&config.logging);

    match cli.command {
        Commands::Status => {
            let panel = FaucetPanel::from_config(&config, Arc::new(faucetchain::LogSink))?;
            print_panel(&panel, cli.format).await?;
            panel.close().await;
        }

        Commands::Claim { id } => {
            let (sink, mut toasts) = ChannelSink::channel();
            let sink: Arc<dyn NotificationSink> = Arc::new(sink);
            let panel = FaucetPanel::from_config(&config, sink)?;

            println!("Claiming {}...", id);
            let result = panel.claim(&id).await;

            while let Ok(toast) = toasts.try_recv() {
                println!("{}", toast);
            }

            match result {
                Ok(receipt) => {
                    if cli.format == OutputFormat::Json {
                        println!("{}", serde_json::to_string_pretty(&receipt)?);
                    } else {
                        println!("Transaction: {}", receipt.tx_id);
                    }
                }
                Err(e) if e.is_rejection() => println!("Nothing claimed: {}", e),
                Err(e) => {
                    panel.close().await;
                    return Err(e.into());
                }
            }

            print_panel(&panel, cli.format).await?;
            panel.close().await;
        }

        Commands::Watch { ticks } => {
            let panel = FaucetPanel::from_config(&config, Arc::new(faucetchain::LogSink))?;
            let interval = config.tick_interval();

            print_panel(&panel, cli.format).await?;
            for _ in 0..ticks {
                tokio::time::sleep(interval).await;
                print_panel(&panel, cli.format).await?;
            }
            panel.close().await;
        }

        Commands::Format { ms } => {
            println!("{}", format_remaining(ms));
        }

        Commands::Config { output } => {
            let content = generate_default_config();
            match output {
                Some(path) => {
                    std::fs::write(&path, content)
                        .with_context(|| format!("writing {}", path.display()))?;
                    println!("Config written to {}", path.display());
                }
                None => print!("{}", content),
            }
        }
    }

    Ok(())
}

async fn print_panel(panel: &FaucetPanel, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Table => println!("{}", panel.render().await),
        OutputFormat::Json => {
            let summaries: Vec<FaucetSummary> = panel
                .tracker()
                .snapshot()
                .await
                .iter()
                .map(|r| r.summary())
                .collect();
            println!("{}", serde_json::to_string_pretty(&summaries)?);
        }
    }
    Ok(())
}
