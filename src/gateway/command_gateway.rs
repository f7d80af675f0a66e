//! The command gateway: one in-flight board command at a time.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, error, info_span, warn, Instrument};

use super::cache::{ReadingCache, Readings};
use super::channel::ChannelHandle;
use super::command::{
    CommandOutcome, CommandRequest, EmoticonAck, LcdAck, LedAck, LedCommand, SensorQuery,
};
use super::{emoticon, lcd};
use crate::config::{SerialConfig, SettleConfig};
use crate::error::{GatewayError, LinkError};
use crate::hardware::{DeviceCommand, DeviceKind, DeviceState, LinkOpener, SerialLink};

/// Fixed waits between a send and reading back its effect.
///
/// The board has no acknowledgment frame, so a read issued too early can see
/// the previous value. These delays are the only synchronisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettleDelays {
    pub sensor: Duration,
    pub actuator: Duration,
    pub display: Duration,
}

impl Default for SettleDelays {
    fn default() -> Self {
        Self::from(&SettleConfig::default())
    }
}

impl From<&SettleConfig> for SettleDelays {
    fn from(cfg: &SettleConfig) -> Self {
        Self {
            sensor: Duration::from_millis(cfg.sensor_ms),
            actuator: Duration::from_millis(cfg.actuator_ms),
            display: Duration::from_millis(cfg.display_ms),
        }
    }
}

/// Gateway tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatewayOptions {
    pub settle: SettleDelays,
    /// Upper bound on one frame write.
    pub command_timeout: Duration,
    /// Whether `temp-humidity` also refreshes illumination.
    pub refresh_illumination_with_temp_humidity: bool,
}

impl Default for GatewayOptions {
    fn default() -> Self {
        Self::from(&SerialConfig::default())
    }
}

impl From<&SerialConfig> for GatewayOptions {
    fn from(cfg: &SerialConfig) -> Self {
        Self {
            settle: SettleDelays::from(&cfg.settle),
            command_timeout: cfg.command_timeout(),
            refresh_illumination_with_temp_humidity: cfg.refresh_illumination_with_temp_humidity,
        }
    }
}

/// Channel health snapshot.
///
/// While a command holds the lock the channel is not inspected: `open` and
/// `opens` are `None` and `busy` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelHealth {
    pub port: String,
    pub open: Option<bool>,
    /// Successful opens since start, including reopens after failures.
    pub opens: Option<u64>,
    pub busy: bool,
}

/// Serialises every board command behind one lock.
///
/// The lock is held for the full send, settle, read and cache update, so no
/// two commands ever interleave on the wire. Callers queue on the lock with
/// no priority.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use zeptosense::error::GatewayError;
/// use zeptosense::gateway::{CommandGateway, CommandRequest, GatewayOptions};
/// use zeptosense::hardware::SerialLinkOpener;
///
/// # tokio_test::block_on(async {
/// let gateway = CommandGateway::new(
///     "/dev/ttyUSB0",
///     Arc::new(SerialLinkOpener::new(115_200)),
///     GatewayOptions::default(),
/// );
///
/// // Rejected before the serial port is opened.
/// let err = gateway
///     .execute(CommandRequest::SetLed("blink".into()))
///     .await
///     .unwrap_err();
/// assert!(matches!(err, GatewayError::Validation(_)));
/// assert_eq!(gateway.health().opens, Some(0));
/// # });
/// ```
pub struct CommandGateway {
    channel: Mutex<ChannelHandle>,
    cache: ReadingCache,
    options: GatewayOptions,
    port: String,
}

impl CommandGateway {
    pub fn new(port: impl Into<String>, opener: Arc<dyn LinkOpener>, options: GatewayOptions) -> Self {
        let port = port.into();
        Self {
            channel: Mutex::new(ChannelHandle::new(port.clone(), opener)),
            cache: ReadingCache::new(),
            options,
            port,
        }
    }

    /// Build from the `serial` config section.
    pub fn from_config(cfg: &SerialConfig, opener: Arc<dyn LinkOpener>) -> Self {
        Self::new(cfg.port.clone(), opener, GatewayOptions::from(cfg))
    }

    pub fn port(&self) -> &str {
        &self.port
    }

    /// Cached readings without touching the board.
    pub fn readings(&self) -> Readings {
        self.cache.get()
    }

    /// Run one command.
    pub async fn execute(&self, request: CommandRequest) -> Result<CommandOutcome, GatewayError> {
        let span = info_span!("command", command = request.kind());
        async move {
            match request {
                CommandRequest::Read(query) => {
                    self.read_sensors(query).await.map(CommandOutcome::Readings)
                }
                CommandRequest::SetLed(status) => {
                    self.set_led(&status).await.map(CommandOutcome::Led)
                }
                CommandRequest::SetLcdText(text) => {
                    self.set_lcd_text(&text).await.map(CommandOutcome::Lcd)
                }
                CommandRequest::SetEmoticon(tag) => {
                    self.show_emoticon(&tag).await.map(CommandOutcome::Emoticon)
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Refresh the sensors named by `query` and return the whole cache.
    ///
    /// Each board read updates the cache as soon as it completes. If a later
    /// read in the same query fails, earlier updates stay.
    pub async fn read_sensors(&self, query: SensorQuery) -> Result<Readings, GatewayError> {
        let started = Instant::now();
        let plan = query.plan(self.options.refresh_illumination_with_temp_humidity);

        let mut channel = self.channel.lock().await;
        for read in plan {
            let state = self
                .cycle(&mut channel, read.command(), self.options.settle.sensor)
                .await?;
            read.record(&state, &self.cache);
        }
        drop(channel);

        debug!(
            command = "read",
            query = query.as_str(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Sensor read complete"
        );
        Ok(self.cache.get())
    }

    /// Switch the LED bank. Anything but `on`/`off` is rejected before the
    /// channel is touched.
    pub async fn set_led(&self, status: &str) -> Result<LedAck, GatewayError> {
        let led = LedCommand::parse(status)?;
        let started = Instant::now();

        let mut channel = self.channel.lock().await;
        let state = self
            .cycle(&mut channel, led.command(), self.options.settle.actuator)
            .await?;
        drop(channel);

        debug!(
            command = "set-led",
            requested = ?led.0,
            reported = ?state.led,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "LED command complete"
        );
        Ok(LedAck {
            requested: led.0,
            status: state.led,
        })
    }

    /// Show `text` on the LCD, replacing characters outside the device
    /// character set.
    pub async fn set_lcd_text(&self, text: &str) -> Result<LcdAck, GatewayError> {
        let converted = lcd::to_device_text(text);
        if converted.transliterated {
            warn!(
                original = %text,
                displayed = %converted.text,
                "LCD text not representable in GBK, substituted"
            );
        }

        let cmd = DeviceCommand::control(DeviceKind::Lcd, converted.text.clone());
        let mut channel = self.channel.lock().await;
        self.cycle(&mut channel, cmd, self.options.settle.actuator)
            .await?;
        drop(channel);

        Ok(LcdAck {
            text: converted.text,
            transliterated: converted.transliterated,
        })
    }

    /// Draw the glyph for `tag`. Unknown tags draw the fallback marker.
    pub async fn show_emoticon(&self, tag: &str) -> Result<EmoticonAck, GatewayError> {
        let known = emoticon::lookup(tag).is_some();
        let glyph = emoticon::glyph_for(tag);
        if !known {
            debug!(tag = %tag, "Unknown emoticon tag, sending fallback marker");
        }

        let cmd = DeviceCommand::control(DeviceKind::Lcd, glyph);
        let mut channel = self.channel.lock().await;
        self.cycle(&mut channel, cmd, self.options.settle.display)
            .await?;
        drop(channel);

        Ok(EmoticonAck {
            tag: tag.to_string(),
            glyph,
            known,
        })
    }

    /// Port and open state. Does not wait for an in-flight command.
    pub fn health(&self) -> ChannelHealth {
        match self.channel.try_lock() {
            Ok(channel) => ChannelHealth {
                port: self.port.clone(),
                open: Some(channel.is_open()),
                opens: Some(channel.open_count()),
                busy: false,
            },
            Err(_) => ChannelHealth {
                port: self.port.clone(),
                open: None,
                opens: None,
                busy: true,
            },
        }
    }

    /// Close the channel. Waits for any in-flight command first.
    pub async fn shutdown(&self) -> Result<(), GatewayError> {
        let mut channel = self.channel.lock().await;
        channel.close().await.map_err(GatewayError::from)
    }

    /// Open if needed, send, settle, read back. Any failure after the open
    /// invalidates the channel.
    async fn cycle(
        &self,
        channel: &mut ChannelHandle,
        cmd: DeviceCommand,
        settle: Duration,
    ) -> Result<DeviceState, GatewayError> {
        let link = channel.ensure_open().await.map_err(|e| {
            error!(port = %self.port, error = %e, "Serial channel unavailable");
            GatewayError::Unavailable(e.to_string())
        })?;

        match exchange(link, &cmd, settle, self.options.command_timeout).await {
            Ok(state) => Ok(state),
            Err(e) => {
                error!(
                    port = %self.port,
                    device = cmd.device.as_str(),
                    error = %e,
                    "Command cycle failed"
                );
                channel.invalidate();
                Err(GatewayError::IoFailure(e.to_string()))
            }
        }
    }
}

async fn exchange(
    link: &mut Box<dyn SerialLink>,
    cmd: &DeviceCommand,
    settle: Duration,
    send_timeout: Duration,
) -> Result<DeviceState, LinkError> {
    tokio::time::timeout(send_timeout, link.send(cmd))
        .await
        .map_err(|_| {
            LinkError::Io(format!(
                "send timed out after {}ms",
                send_timeout.as_millis()
            ))
        })??;

    if !settle.is_zero() {
        tokio::time::sleep(settle).await;
    }

    link.state()
}

impl std::fmt::Debug for CommandGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandGateway")
            .field("port", &self.port)
            .field("options", &self.options)
            .finish()
    }
}
