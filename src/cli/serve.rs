//! Serve command handler (HTTP surface over the serial board).

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use zeptosense::api::{start_server, AppState};
use zeptosense::config::Config;
use zeptosense::gateway::CommandGateway;
use zeptosense::hardware::SerialLinkOpener;

/// Build the gateway and serve until Ctrl-C, then close the channel.
pub(crate) async fn cmd_serve(
    host: Option<String>,
    port: Option<u16>,
    serial_port: Option<String>,
) -> Result<()> {
    let mut config = Config::load().with_context(|| "Failed to load configuration")?;
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    if let Some(serial_port) = serial_port {
        config.serial.port = serial_port;
    }

    println!("Starting ZeptoSense on http://{}", config.server.bind_addr());
    println!(
        "Serial device: {} @ {} baud",
        config.serial.port, config.serial.baud_rate
    );

    let opener = Arc::new(SerialLinkOpener::new(config.serial.baud_rate));
    let gateway = Arc::new(CommandGateway::from_config(&config.serial, opener));
    let state = AppState::new(Arc::clone(&gateway));

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
        info!("Shutdown requested");
    };

    let served = start_server(&config.server, state, shutdown)
        .await
        .with_context(|| format!("HTTP server on {} failed", config.server.bind_addr()));

    if let Err(e) = gateway.shutdown().await {
        warn!(error = %e, "Failed to close serial channel cleanly");
    }
    info!("Serial channel released");

    served
}
