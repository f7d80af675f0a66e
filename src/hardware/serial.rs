//! Serial transport over `tokio-serial`.
//!
//! The board pushes report frames whenever it has a value, not only in reply
//! to a `get`. A background task reads lines and folds every decodable report
//! into shared state; [`SerialLink::state`] returns a snapshot of it.
//!
//! This module is only compiled when the `hardware` feature is enabled.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt, BufReader, WriteHalf};
use tokio::task::JoinHandle;
use tokio_serial::{SerialPortBuilderExt, SerialStream};
use tracing::{debug, info, warn};

use super::protocol::decode_report;
use super::{validate_serial_path, DeviceCommand, DeviceState, LinkOpener, SerialLink};
use crate::error::LinkError;

/// Maximum buffered report line (64 KB). Longer lines are discarded up to
/// the next newline.
const MAX_LINE_SIZE: usize = 64 * 1024;

/// Opens [`SerialPortLink`]s at a fixed baud rate.
#[derive(Debug, Clone)]
pub struct SerialLinkOpener {
    baud_rate: u32,
}

impl SerialLinkOpener {
    pub fn new(baud_rate: u32) -> Self {
        Self { baud_rate }
    }

    pub fn baud_rate(&self) -> u32 {
        self.baud_rate
    }
}

#[async_trait]
impl LinkOpener for SerialLinkOpener {
    async fn open(&self, port: &str) -> Result<Box<dyn SerialLink>, LinkError> {
        validate_serial_path(port)?;

        let stream = tokio_serial::new(port, self.baud_rate)
            .open_native_async()
            .map_err(|e| LinkError::Open {
                port: port.to_string(),
                reason: e.to_string(),
            })?;

        info!(port = %port, baud = self.baud_rate, "Serial port opened");
        Ok(Box::new(SerialPortLink::spawn(port, stream)))
    }
}

/// A live serial connection plus its report reader.
pub struct SerialPortLink {
    port: String,
    writer: WriteHalf<SerialStream>,
    state: Arc<Mutex<DeviceState>>,
    open: Arc<AtomicBool>,
    reader: JoinHandle<()>,
}

impl SerialPortLink {
    fn spawn(port: &str, stream: SerialStream) -> Self {
        let (read_half, writer) = tokio::io::split(stream);
        let state = Arc::new(Mutex::new(DeviceState::default()));
        let open = Arc::new(AtomicBool::new(true));

        let reader = tokio::spawn(read_reports(
            port.to_string(),
            read_half,
            Arc::clone(&state),
            Arc::clone(&open),
        ));

        Self {
            port: port.to_string(),
            writer,
            state,
            open,
            reader,
        }
    }
}

/// Fold report lines from `source` into `state` until EOF or a read error.
///
/// Lines are raw bytes decoded lossily, so line noise only costs the line
/// it lands on.
async fn read_reports<R>(
    port: String,
    source: R,
    state: Arc<Mutex<DeviceState>>,
    open: Arc<AtomicBool>,
) where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(source);
    let mut line = Vec::new();
    let mut oversized = false;

    loop {
        let byte = match reader.read_u8().await {
            Ok(byte) => byte,
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                warn!(port = %port, "Serial port reached EOF");
                break;
            }
            Err(e) => {
                warn!(port = %port, error = %e, "Serial read failed");
                break;
            }
        };

        if byte != b'\n' {
            if line.len() < MAX_LINE_SIZE {
                line.push(byte);
            } else {
                oversized = true;
            }
            continue;
        }

        if oversized {
            warn!(port = %port, limit = MAX_LINE_SIZE, "Dropping oversized report line");
        } else {
            apply_line(&port, &line, &state);
        }
        line.clear();
        oversized = false;
    }

    open.store(false, Ordering::SeqCst);
}

fn apply_line(port: &str, raw: &[u8], state: &Mutex<DeviceState>) {
    let line = String::from_utf8_lossy(raw);
    match decode_report(&line) {
        Some(report) => {
            debug!(port = %port, report = ?report, "Report received");
            let mut guard = state.lock().unwrap_or_else(|e| e.into_inner());
            report.apply(&mut guard);
        }
        None => debug!(port = %port, line = %line.trim_end(), "Ignoring undecodable line"),
    }
}

#[async_trait]
impl SerialLink for SerialPortLink {
    fn port(&self) -> &str {
        &self.port
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    async fn send(&mut self, cmd: &DeviceCommand) -> Result<(), LinkError> {
        if !self.is_open() {
            return Err(LinkError::Closed);
        }
        let line = cmd.encode();
        self.writer
            .write_all(line.as_bytes())
            .await
            .map_err(|e| LinkError::Io(format!("write failed: {e}")))?;
        self.writer
            .flush()
            .await
            .map_err(|e| LinkError::Io(format!("flush failed: {e}")))?;
        Ok(())
    }

    fn state(&self) -> Result<DeviceState, LinkError> {
        if !self.is_open() {
            return Err(LinkError::Closed);
        }
        let guard = self.state.lock().unwrap_or_else(|e| e.into_inner());
        Ok(*guard)
    }

    async fn close(&mut self) -> Result<(), LinkError> {
        self.open.store(false, Ordering::SeqCst);
        self.reader.abort();
        self.writer
            .shutdown()
            .await
            .map_err(|e| LinkError::Io(format!("shutdown failed: {e}")))?;
        info!(port = %self.port, "Serial port closed");
        Ok(())
    }
}

impl Drop for SerialPortLink {
    fn drop(&mut self) {
        // The read half keeps the port alive until the reader task ends.
        self.reader.abort();
    }
}
