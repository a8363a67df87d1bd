use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};
use crate::models::weather::{parse_timestamp, WeatherRow, TIMESTAMP_OUTPUT_FORMAT};
use crate::utils::constants::{MAX_SIGNAL_DBM, MIN_SIGNAL_DBM, QUANTIZATION_STEP_DB};

/// A weather row together with its synthesized signal strength.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalRecord {
    pub weather: WeatherRow,
    pub signal_dbm: f64,
}

impl SignalRecord {
    pub fn new(weather: WeatherRow, signal_dbm: f64) -> Self {
        Self {
            weather,
            signal_dbm,
        }
    }

    pub fn location(&self) -> &str {
        &self.weather.location
    }

    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        self.weather.timestamp
    }

    pub fn has_signal(&self) -> bool {
        self.signal_dbm.is_finite()
    }

    pub fn is_within_receiver_range(&self) -> bool {
        (MIN_SIGNAL_DBM..=MAX_SIGNAL_DBM).contains(&self.signal_dbm)
    }

    pub fn is_quantized(&self) -> bool {
        let steps = self.signal_dbm / QUANTIZATION_STEP_DB;
        steps == steps.round()
    }
}

/// Flat CSV row layout of a [`SignalRecord`]. An empty `signal_dbm` cell
/// reads back as NaN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRow {
    pub timestamp: Option<String>,
    pub location: String,
    pub rain_rate: Option<f64>,
    pub relative_humidity_2m: Option<f64>,
    pub cloudcover: Option<f64>,
    pub windspeed_10m: Option<f64>,
    pub pressure_msl: Option<f64>,
    pub temperature_2m: Option<f64>,
    pub signal_dbm: Option<f64>,
}

impl From<&SignalRecord> for SignalRow {
    fn from(record: &SignalRecord) -> Self {
        let w = &record.weather;
        Self {
            timestamp: w
                .timestamp
                .map(|ts| ts.format(TIMESTAMP_OUTPUT_FORMAT).to_string()),
            location: w.location.clone(),
            rain_rate: w.rain_rate,
            relative_humidity_2m: w.relative_humidity_2m,
            cloudcover: w.cloudcover,
            windspeed_10m: w.windspeed_10m,
            pressure_msl: w.pressure_msl,
            temperature_2m: w.temperature_2m,
            signal_dbm: record.has_signal().then_some(record.signal_dbm),
        }
    }
}

impl TryFrom<SignalRow> for SignalRecord {
    type Error = SimulationError;

    fn try_from(row: SignalRow) -> Result<Self> {
        let timestamp = match row.timestamp.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(parse_timestamp(raw)?),
        };

        let weather = WeatherRow {
            timestamp,
            location: row.location,
            rain_rate: row.rain_rate,
            relative_humidity_2m: row.relative_humidity_2m,
            cloudcover: row.cloudcover,
            windspeed_10m: row.windspeed_10m,
            pressure_msl: row.pressure_msl,
            temperature_2m: row.temperature_2m,
            extra: Vec::new(),
        };

        Ok(Self::new(weather, row.signal_dbm.unwrap_or(f64::NAN)))
    }
}
