//! CLI module: command parsing and dispatch
//!
//! All CLI logic lives here. `main.rs` calls `cli::run()`.

pub mod agent;
mod common;
pub mod config;
pub mod serve;
pub mod status;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "zeptosense")]
#[command(version)]
#[command(about = "Serial sensor gateway with an LLM front end", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the sensor/control HTTP API over the serial board
    Serve {
        /// Bind address (overrides server.host)
        #[arg(long)]
        host: Option<String>,
        /// Listen port (overrides server.port)
        #[arg(long)]
        port: Option<u16>,
        /// Serial device (overrides serial.port)
        #[arg(long)]
        serial_port: Option<String>,
    },
    /// Talk to the board in natural language
    Agent {
        /// Direct message to process (non-interactive mode)
        #[arg(short, long)]
        message: Option<String>,
    },
    /// Validate configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Show resolved configuration
    Status,
    /// Show version information
    Version,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Validate config file for errors and unknown fields
    Check,
}

/// Entry point for the CLI, called from main().
pub async fn run() -> Result<()> {
    // .env is optional
    let _ = dotenvy::dotenv();

    // Load config early so we can respect the logging settings; fall back to
    // defaults if the config file is missing or unreadable.
    let logging_cfg = zeptosense::config::Config::load()
        .map(|c| c.logging)
        .unwrap_or_default();
    zeptosense::utils::logging::init_logging(&logging_cfg);

    let cli = Cli::parse();

    match cli.command {
        None => {
            let mut cmd = Cli::command();
            cmd.print_help()?;
            println!();
        }
        Some(Commands::Serve {
            host,
            port,
            serial_port,
        }) => {
            serve::cmd_serve(host, port, serial_port).await?;
        }
        Some(Commands::Agent { message }) => {
            agent::cmd_agent(message).await?;
        }
        Some(Commands::Config { action }) => {
            config::cmd_config(action).await?;
        }
        Some(Commands::Status) => {
            status::cmd_status().await?;
        }
        Some(Commands::Version) => {
            cmd_version();
        }
    }

    Ok(())
}

/// Display version information
fn cmd_version() {
    println!("zeptosense {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Serial sensor gateway with an LLM front end");
}
