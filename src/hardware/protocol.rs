//! Sensor board line protocol.
//!
//! Newline-delimited JSON in both directions.
//!
//! Command: `{"dev":"temp_humidity","op":"get","data":""}`
//!
//! Reports pushed back by the board:
//! - `{"dev":"temp_humidity","temperature":23.5,"humidity":41.0}`
//! - `{"dev":"illumination","value":312.0}`
//! - `{"dev":"infrared","value":1.0}`
//! - `{"dev":"led","state":"on"}`

use serde::Deserialize;
use serde_json::json;

use super::{DeviceState, LedState};

/// LED payload that switches every LED on.
pub const LED_ALL_ON: &str = "LEDALLON";
/// LED payload that switches every LED off.
pub const LED_ALL_OFF: &str = "LEDALLOFF";

/// Addressable devices on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    TempHumidity,
    Illumination,
    Infrared,
    Led,
    Lcd,
}

impl DeviceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceKind::TempHumidity => "temp_humidity",
            DeviceKind::Illumination => "illumination",
            DeviceKind::Infrared => "infrared",
            DeviceKind::Led => "led",
            DeviceKind::Lcd => "lcd",
        }
    }
}

/// Operation applied to a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceOp {
    /// Ask the device to report its current value.
    Get,
    /// Drive the device with a payload.
    Control,
}

impl DeviceOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceOp::Get => "get",
            DeviceOp::Control => "control",
        }
    }
}

/// One outbound frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceCommand {
    pub device: DeviceKind,
    pub op: DeviceOp,
    pub payload: String,
}

impl DeviceCommand {
    /// A `get` request with an empty payload.
    pub fn read(device: DeviceKind) -> Self {
        Self {
            device,
            op: DeviceOp::Get,
            payload: String::new(),
        }
    }

    /// A `control` request carrying `payload`.
    pub fn control(device: DeviceKind, payload: impl Into<String>) -> Self {
        Self {
            device,
            op: DeviceOp::Control,
            payload: payload.into(),
        }
    }

    /// Encode as a single newline-terminated line.
    ///
    /// Payload newlines (emoticon glyphs) are escaped by the JSON encoder, so
    /// the frame never spans more than one line.
    pub fn encode(&self) -> String {
        let frame = json!({
            "dev": self.device.as_str(),
            "op": self.op.as_str(),
            "data": self.payload,
        });
        format!("{}\n", frame)
    }
}

/// A decoded report frame.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "dev", rename_all = "snake_case")]
pub enum Report {
    TempHumidity { temperature: f64, humidity: f64 },
    Illumination { value: f64 },
    Infrared { value: f64 },
    Led { state: LedState },
}

impl Report {
    /// Fold this report into the link's last-known state.
    pub fn apply(&self, state: &mut DeviceState) {
        match *self {
            Report::TempHumidity {
                temperature,
                humidity,
            } => {
                state.temperature = temperature;
                state.humidity = humidity;
            }
            Report::Illumination { value } => state.illumination = value,
            Report::Infrared { value } => state.infrared = value,
            Report::Led { state: led } => state.led = Some(led),
        }
    }
}

/// Decode one inbound line. Blank or unrecognised lines yield `None`.
pub fn decode_report(line: &str) -> Option<Report> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    serde_json::from_str(line).ok()
}
