//! Hardware link to the sensor board.
//!
//! The board sits on one serial line. A [`LinkOpener`] claims the port and
//! hands back a [`SerialLink`], which sends [`DeviceCommand`] frames and
//! exposes the last values the board reported.
//!
//! # Feature Gates
//!
//! - `hardware`: real serial transport via `tokio-serial`
//!
//! Without the feature, [`SerialLinkOpener`] compiles but every open fails.

pub mod protocol;

#[cfg(feature = "hardware")]
pub mod serial;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::LinkError;

pub use protocol::{DeviceCommand, DeviceKind, DeviceOp, Report};

#[cfg(feature = "hardware")]
pub use serial::{SerialLinkOpener, SerialPortLink};

/// LED bank state as reported by the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedState {
    On,
    Off,
}

/// Last values decoded from the board's report frames.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DeviceState {
    pub temperature: f64,
    pub humidity: f64,
    pub illumination: f64,
    pub infrared: f64,
    pub led: Option<LedState>,
}

/// An open serial connection to the board.
///
/// Callers never use one link from two tasks at once; the command gateway
/// owns the only instance and drives it under its lock.
#[async_trait]
pub trait SerialLink: Send {
    /// Device path this link was opened on.
    fn port(&self) -> &str;

    /// Whether the underlying port is still usable.
    fn is_open(&self) -> bool;

    /// Write one command frame.
    async fn send(&mut self, cmd: &DeviceCommand) -> Result<(), LinkError>;

    /// Last decoded values. Fails if the port has closed.
    fn state(&self) -> Result<DeviceState, LinkError>;

    /// Release the port.
    async fn close(&mut self) -> Result<(), LinkError>;
}

/// Claims a serial port and returns a link for it.
#[async_trait]
pub trait LinkOpener: Send + Sync {
    async fn open(&self, port: &str) -> Result<Box<dyn SerialLink>, LinkError>;
}

/// Validate a serial port path for security.
///
/// Only allows known serial device path prefixes to prevent arbitrary
/// file access through the serial link.
pub fn validate_serial_path(path: &str) -> Result<(), LinkError> {
    const ALLOWED_PATH_PREFIXES: &[&str] = &[
        "/dev/ttyACM",
        "/dev/ttyUSB",
        "/dev/tty.usbmodem",
        "/dev/cu.usbmodem",
        "/dev/tty.usbserial",
        "/dev/cu.usbserial",
        "COM",
    ];

    // Windows port names are case-insensitive ("com3" is as good as "COM3").
    let upper = path.to_ascii_uppercase();
    if ALLOWED_PATH_PREFIXES
        .iter()
        .any(|p| path.starts_with(p) || (*p == "COM" && upper.starts_with(p)))
    {
        Ok(())
    } else {
        Err(LinkError::PathNotAllowed(format!(
            "{}. Allowed prefixes: {}",
            path,
            ALLOWED_PATH_PREFIXES.join(", ")
        )))
    }
}

/// Opener used when the crate is built without serial support.
#[cfg(not(feature = "hardware"))]
#[derive(Debug, Clone)]
pub struct SerialLinkOpener {
    baud_rate: u32,
}

#[cfg(not(feature = "hardware"))]
impl SerialLinkOpener {
    pub fn new(baud_rate: u32) -> Self {
        Self { baud_rate }
    }

    pub fn baud_rate(&self) -> u32 {
        self.baud_rate
    }
}

#[cfg(not(feature = "hardware"))]
#[async_trait]
impl LinkOpener for SerialLinkOpener {
    async fn open(&self, port: &str) -> Result<Box<dyn SerialLink>, LinkError> {
        Err(LinkError::Open {
            port: port.to_string(),
            reason: "serial support not compiled in; rebuild with --features hardware"
                .to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_serial_path_linux() {
        assert!(validate_serial_path("/dev/ttyACM0").is_ok());
        assert!(validate_serial_path("/dev/ttyUSB0").is_ok());
    }

    #[test]
    fn test_validate_serial_path_macos() {
        assert!(validate_serial_path("/dev/tty.usbmodem14201").is_ok());
        assert!(validate_serial_path("/dev/cu.usbserial-1420").is_ok());
    }

    #[test]
    fn test_validate_serial_path_windows() {
        assert!(validate_serial_path("COM3").is_ok());
        assert!(validate_serial_path("com3").is_ok());
        assert!(validate_serial_path("COM10").is_ok());
    }

    #[test]
    fn test_validate_serial_path_rejects_arbitrary() {
        assert!(validate_serial_path("/dev/sda1").is_err());
        assert!(validate_serial_path("/etc/passwd").is_err());
        assert!(validate_serial_path("/tmp/fake_serial").is_err());
        assert!(validate_serial_path("").is_err());
    }

    #[test]
    fn test_validate_serial_path_error_message() {
        let err = validate_serial_path("/etc/passwd").unwrap_err();
        assert!(matches!(err, LinkError::PathNotAllowed(_)));
        let msg = err.to_string();
        assert!(msg.contains("not allowed"));
        assert!(msg.contains("/etc/passwd"));
    }

    #[test]
    fn test_led_state_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&LedState::On).unwrap(), "\"on\"");
        assert_eq!(serde_json::to_string(&LedState::Off).unwrap(), "\"off\"");
    }

    #[cfg(not(feature = "hardware"))]
    #[tokio::test]
    async fn test_stub_opener_always_fails() {
        let opener = SerialLinkOpener::new(115_200);
        let err = opener.open("/dev/ttyUSB0").await.err().unwrap();
        assert!(matches!(err, LinkError::Open { .. }));
    }
}
