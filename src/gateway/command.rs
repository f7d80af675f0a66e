//! Logical commands accepted by the gateway and what they return.

use serde::Serialize;

use super::cache::{ReadingField, ReadingCache, Readings};
use crate::error::GatewayError;
use crate::hardware::protocol::{LED_ALL_OFF, LED_ALL_ON};
use crate::hardware::{DeviceCommand, DeviceKind, DeviceState, LedState};

/// Which sensor values a caller wants refreshed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorQuery {
    Temperature,
    Humidity,
    TempHumidity,
    Illumination,
    Infrared,
    All,
}

impl SensorQuery {
    pub fn as_str(&self) -> &'static str {
        match self {
            SensorQuery::Temperature => "temperature",
            SensorQuery::Humidity => "humidity",
            SensorQuery::TempHumidity => "temp-humidity",
            SensorQuery::Illumination => "illumination",
            SensorQuery::Infrared => "infrared",
            SensorQuery::All => "all",
        }
    }

    /// Board reads needed for this query, in issue order.
    ///
    /// `temp-humidity` also refreshes illumination when
    /// `refresh_illumination` is set; older clients rely on that.
    pub fn plan(&self, refresh_illumination: bool) -> Vec<SensorRead> {
        match self {
            SensorQuery::Temperature | SensorQuery::Humidity => vec![SensorRead::TempHumidity],
            SensorQuery::TempHumidity if refresh_illumination => {
                vec![SensorRead::TempHumidity, SensorRead::Illumination]
            }
            SensorQuery::TempHumidity => vec![SensorRead::TempHumidity],
            SensorQuery::Illumination => vec![SensorRead::Illumination],
            SensorQuery::Infrared => vec![SensorRead::Infrared],
            SensorQuery::All => vec![
                SensorRead::TempHumidity,
                SensorRead::Illumination,
                SensorRead::Infrared,
            ],
        }
    }
}

/// One board read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorRead {
    TempHumidity,
    Illumination,
    Infrared,
}

impl SensorRead {
    pub fn device(&self) -> DeviceKind {
        match self {
            SensorRead::TempHumidity => DeviceKind::TempHumidity,
            SensorRead::Illumination => DeviceKind::Illumination,
            SensorRead::Infrared => DeviceKind::Infrared,
        }
    }

    pub fn command(&self) -> DeviceCommand {
        DeviceCommand::read(self.device())
    }

    /// Cache fields this read refreshes.
    pub fn fields(&self) -> &'static [ReadingField] {
        match self {
            SensorRead::TempHumidity => &[ReadingField::Temperature, ReadingField::Humidity],
            SensorRead::Illumination => &[ReadingField::Illumination],
            SensorRead::Infrared => &[ReadingField::Infrared],
        }
    }

    /// Copy this read's fields from the board state into the cache.
    pub(crate) fn record(&self, state: &DeviceState, cache: &ReadingCache) {
        for field in self.fields() {
            let value = match field {
                ReadingField::Temperature => state.temperature,
                ReadingField::Humidity => state.humidity,
                ReadingField::Illumination => state.illumination,
                ReadingField::Infrared => state.infrared,
            };
            cache.update(*field, value);
        }
    }
}

/// Validated LED switch request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedCommand(pub LedState);

impl LedCommand {
    /// Accepts exactly `on` or `off`.
    pub fn parse(status: &str) -> Result<Self, GatewayError> {
        match status {
            "on" => Ok(Self(LedState::On)),
            "off" => Ok(Self(LedState::Off)),
            other => Err(GatewayError::Validation(format!(
                "LED status must be 'on' or 'off', got '{}'",
                other
            ))),
        }
    }

    pub fn command(&self) -> DeviceCommand {
        let payload = match self.0 {
            LedState::On => LED_ALL_ON,
            LedState::Off => LED_ALL_OFF,
        };
        DeviceCommand::control(DeviceKind::Led, payload)
    }
}

/// A request to the gateway, one per HTTP call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandRequest {
    Read(SensorQuery),
    SetLed(String),
    SetLcdText(String),
    SetEmoticon(String),
}

impl CommandRequest {
    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            CommandRequest::Read(_) => "read",
            CommandRequest::SetLed(_) => "set-led",
            CommandRequest::SetLcdText(_) => "set-lcd-text",
            CommandRequest::SetEmoticon(_) => "set-emoticon",
        }
    }
}

/// LED acknowledgment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LedAck {
    /// State that was requested.
    pub requested: LedState,
    /// State the board reported after the settle delay, if it reported one.
    pub status: Option<LedState>,
}

/// LCD acknowledgment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LcdAck {
    /// Text actually sent to the display.
    pub text: String,
    pub transliterated: bool,
}

/// Emoticon acknowledgment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmoticonAck {
    pub tag: String,
    pub glyph: &'static str,
    pub known: bool,
}

/// Successful result of [`CommandGateway::execute`](super::CommandGateway::execute).
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    Readings(Readings),
    Led(LedAck),
    Lcd(LcdAck),
    Emoticon(EmoticonAck),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_single_reads() {
        assert_eq!(
            SensorQuery::Temperature.plan(true),
            vec![SensorRead::TempHumidity]
        );
        assert_eq!(
            SensorQuery::Humidity.plan(true),
            vec![SensorRead::TempHumidity]
        );
        assert_eq!(
            SensorQuery::Infrared.plan(true),
            vec![SensorRead::Infrared]
        );
    }

    #[test]
    fn test_plan_temp_humidity_side_effect_toggle() {
        assert_eq!(
            SensorQuery::TempHumidity.plan(true),
            vec![SensorRead::TempHumidity, SensorRead::Illumination]
        );
        assert_eq!(
            SensorQuery::TempHumidity.plan(false),
            vec![SensorRead::TempHumidity]
        );
    }

    #[test]
    fn test_plan_all_order() {
        assert_eq!(
            SensorQuery::All.plan(false),
            vec![
                SensorRead::TempHumidity,
                SensorRead::Illumination,
                SensorRead::Infrared
            ]
        );
    }

    #[test]
    fn test_record_copies_only_own_fields() {
        let cache = ReadingCache::new();
        let state = DeviceState {
            temperature: 20.0,
            humidity: 30.0,
            illumination: 400.0,
            infrared: 1.0,
            led: None,
        };
        SensorRead::TempHumidity.record(&state, &cache);
        let r = cache.get();
        assert_eq!((r.temperature, r.humidity), (20.0, 30.0));
        assert_eq!((r.illumination, r.infrared), (0.0, 0.0));
    }

    #[test]
    fn test_led_parse() {
        assert_eq!(LedCommand::parse("on").unwrap(), LedCommand(LedState::On));
        assert_eq!(LedCommand::parse("off").unwrap(), LedCommand(LedState::Off));
        for bad in ["maybe", "ON", "", " on"] {
            assert!(matches!(
                LedCommand::parse(bad),
                Err(GatewayError::Validation(_))
            ));
        }
    }

    #[test]
    fn test_led_command_payloads() {
        assert_eq!(LedCommand(LedState::On).command().payload, "LEDALLON");
        assert_eq!(LedCommand(LedState::Off).command().payload, "LEDALLOFF");
        assert_eq!(LedCommand(LedState::On).command().device, DeviceKind::Led);
    }
}
