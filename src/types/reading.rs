//! Sensor readings as borrowed by the engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of tracked air-quality fields.
pub const AIR_QUALITY_FIELD_COUNT: usize = 9;

/// Air-quality field names in tuple order. The primary field (AQI) is first.
pub const AIR_QUALITY_FIELDS: [&str; AIR_QUALITY_FIELD_COUNT] = [
    "aqi", "pm25", "pm10", "no2", "so2", "co", "o3", "temperature", "humidity",
];

/// Value used for a field that is absent from every reading of a history.
pub const AIR_QUALITY_DEFAULTS: [f64; AIR_QUALITY_FIELD_COUNT] =
    [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 25.0, 50.0];

/// One timestamped tuple of named numeric fields.
///
/// `values[i]` corresponds to `FieldSchema::names[i]`; `None` means the sensor
/// did not report the field and must never be read as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub timestamp: DateTime<Utc>,
    pub values: Vec<Option<f64>>,
}

impl Reading {
    pub fn new(timestamp: DateTime<Utc>, values: Vec<Option<f64>>) -> Self {
        Self { timestamp, values }
    }

    /// Field value by position, `None` when missing or out of range.
    pub fn value(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied().flatten()
    }
}

/// Ordered field names plus the value to use when a field is absent from a
/// whole history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    pub names: Vec<String>,
    pub defaults: Vec<f64>,
}

impl FieldSchema {
    pub fn new(names: &[&str], defaults: &[f64]) -> Self {
        Self {
            names: names.iter().map(|n| (*n).to_string()).collect(),
            defaults: names
                .iter()
                .enumerate()
                .map(|(i, _)| defaults.get(i).copied().unwrap_or(0.0))
                .collect(),
        }
    }

    /// Schema used by station forecasts.
    pub fn air_quality() -> Self {
        Self::new(&AIR_QUALITY_FIELDS, &AIR_QUALITY_DEFAULTS)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Name of the primary (first) field.
    pub fn primary(&self) -> &str {
        self.names.first().map_or("", String::as_str)
    }
}

/// A single scalar observation fed to the anomaly detectors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    pub value: Option<f64>,
}

impl Sample {
    pub fn new(timestamp: DateTime<Utc>, value: Option<f64>) -> Self {
        Self { timestamp, value }
    }
}

/// Air-quality station reading with named optional fields, as delivered by
/// the persistence layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AirQualityReading {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub aqi: Option<f64>,
    #[serde(default)]
    pub pm25: Option<f64>,
    #[serde(default)]
    pub pm10: Option<f64>,
    #[serde(default)]
    pub no2: Option<f64>,
    #[serde(default)]
    pub so2: Option<f64>,
    #[serde(default)]
    pub co: Option<f64>,
    #[serde(default)]
    pub o3: Option<f64>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub humidity: Option<f64>,
}

impl From<&AirQualityReading> for Reading {
    fn from(r: &AirQualityReading) -> Self {
        Reading::new(
            r.timestamp,
            vec![
                r.aqi,
                r.pm25,
                r.pm10,
                r.no2,
                r.so2,
                r.co,
                r.o3,
                r.temperature,
                r.humidity,
            ],
        )
    }
}

/// Waste-bin telemetry reading. `fill_level` is a ratio in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinReading {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub fill_level: Option<f64>,
    #[serde(default)]
    pub weight_kg: Option<f64>,
}

impl BinReading {
    pub fn fill_sample(&self) -> Sample {
        Sample::new(self.timestamp, self.fill_level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_missing_value_is_none_not_zero() {
        let ts = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let r = Reading::new(ts, vec![Some(42.0), None]);
        assert_eq!(r.value(0), Some(42.0));
        assert_eq!(r.value(1), None);
        assert_eq!(r.value(7), None);
    }

    #[test]
    fn test_air_quality_conversion_keeps_order() {
        let ts = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let aq = AirQualityReading {
            timestamp: ts,
            aqi: Some(120.0),
            humidity: Some(61.0),
            ..Default::default()
        };
        let r = Reading::from(&aq);
        let schema = FieldSchema::air_quality();
        assert_eq!(r.values.len(), schema.len());
        assert_eq!(r.value(0), Some(120.0));
        assert_eq!(r.value(schema.index_of("humidity").unwrap()), Some(61.0));
        assert_eq!(r.value(schema.index_of("pm25").unwrap()), None);
        assert_eq!(schema.primary(), "aqi");
    }
}
