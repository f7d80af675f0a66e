//! Status command handler.

use anyhow::{Context, Result};

use zeptosense::config::Config;

/// Show the first few characters of a secret, never the whole thing.
fn mask_secret(secret: Option<&str>) -> String {
    match secret {
        None => "not set".to_string(),
        Some(s) if s.trim().is_empty() => "not set".to_string(),
        Some(s) => {
            let visible: String = s.chars().take(4).collect();
            format!("{}**** (configured)", visible)
        }
    }
}

/// Show resolved configuration.
pub(crate) async fn cmd_status() -> Result<()> {
    let config = Config::load().with_context(|| "Failed to load configuration")?;

    println!("ZeptoSense Status");
    println!("=================");
    println!();
    println!("Config file: {}", Config::path().display());
    println!();

    println!("Serial");
    println!("------");
    println!("  Port:            {}", config.serial.port);
    println!("  Baud rate:       {}", config.serial.baud_rate);
    println!(
        "  Settle (ms):     sensor={} actuator={} display={}",
        config.serial.settle.sensor_ms,
        config.serial.settle.actuator_ms,
        config.serial.settle.display_ms
    );
    println!("  Send timeout:    {}s", config.serial.command_timeout_secs);
    println!(
        "  Temp/humidity also refreshes illumination: {}",
        config.serial.refresh_illumination_with_temp_humidity
    );
    println!();

    println!("HTTP Server");
    println!("-----------");
    println!("  Listen:          {}", config.server.bind_addr());
    println!();

    println!("Agent");
    println!("-----");
    println!("  Gateway URL:     {}", config.agent.api_base_url);
    println!("  Primary model:   {}", config.agent.primary_model);
    println!("  Secondary model: {}", config.agent.secondary_model);
    println!("  Provider base:   {}", config.provider.api_base);
    println!(
        "  Provider key:    {}",
        mask_secret(config.provider.api_key.as_deref())
    );
    println!();

    println!("Logging");
    println!("-------");
    println!("  Level:           {}", config.logging.level);
    println!("  Format:          {:?}", config.logging.format);

    Ok(())
}
