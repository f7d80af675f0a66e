//! Last-known sensor readings.

use std::sync::RwLock;

use serde::Serialize;

/// One snapshot of every sensor value.
///
/// Fields start at zero and hold their last successfully read value
/// afterwards; there is no expiry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Readings {
    pub temperature: f64,
    pub humidity: f64,
    pub illumination: f64,
    pub infrared: f64,
}

/// A single cached field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadingField {
    Temperature,
    Humidity,
    Illumination,
    Infrared,
}

/// Process-wide reading cache.
///
/// Only the command gateway writes, and only while holding its command lock.
/// Readers take a short shared lock so the four fields are never torn.
#[derive(Debug, Default)]
pub struct ReadingCache {
    inner: RwLock<Readings>,
}

impl ReadingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current snapshot. Never touches the hardware.
    pub fn get(&self) -> Readings {
        *self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    pub(crate) fn update(&self, field: ReadingField, value: f64) {
        let mut readings = self.inner.write().unwrap_or_else(|e| e.into_inner());
        match field {
            ReadingField::Temperature => readings.temperature = value,
            ReadingField::Humidity => readings.humidity = value,
            ReadingField::Illumination => readings.illumination = value,
            ReadingField::Infrared => readings.infrared = value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_starts_at_zero() {
        let cache = ReadingCache::new();
        assert_eq!(cache.get(), Readings::default());
    }

    #[test]
    fn test_update_touches_only_one_field() {
        let cache = ReadingCache::new();
        cache.update(ReadingField::Humidity, 55.5);
        let r = cache.get();
        assert_eq!(r.humidity, 55.5);
        assert_eq!(r.temperature, 0.0);
        assert_eq!(r.illumination, 0.0);
        assert_eq!(r.infrared, 0.0);
    }

    #[test]
    fn test_readings_serialize_all_fields() {
        let r = Readings {
            temperature: 21.0,
            humidity: 40.0,
            illumination: 300.0,
            infrared: 1.0,
        };
        let v = serde_json::to_value(r).unwrap();
        assert_eq!(v["temperature"], 21.0);
        assert_eq!(v["infrared"], 1.0);
        assert_eq!(v.as_object().unwrap().len(), 4);
    }
}
