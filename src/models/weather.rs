use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use validator::Validate;

use crate::error::{Result, SimulationError};
use crate::utils::constants::*;

const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

pub const TIMESTAMP_OUTPUT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse a timestamp in any of the layouts produced by the weather exports.
/// A bare date resolves to midnight.
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime> {
    let trimmed = raw.trim();

    for format in TIMESTAMP_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(ts);
        }
    }

    let date = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")?;
    date.and_hms_opt(0, 0, 0)
        .ok_or_else(|| SimulationError::InvalidFormat(format!("Invalid timestamp: '{}'", raw)))
}

fn deserialize_timestamp<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => parse_timestamp(s)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

fn serialize_timestamp<S>(
    timestamp: &Option<NaiveDateTime>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match timestamp {
        Some(ts) => serializer.serialize_str(&ts.format(TIMESTAMP_OUTPUT_FORMAT).to_string()),
        None => serializer.serialize_none(),
    }
}

/// One hourly observation for a location. Weather fields are nullable; use
/// [`WeatherRow::conditions`] to obtain the defaulted values the models work on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct WeatherRow {
    #[serde(
        default,
        alias = "time",
        deserialize_with = "deserialize_timestamp",
        serialize_with = "serialize_timestamp"
    )]
    pub timestamp: Option<NaiveDateTime>,

    #[validate(length(min = 1))]
    pub location: String,

    #[serde(alias = "rain")]
    #[validate(range(min = 0.0, max = 100.0))]
    pub rain_rate: Option<f64>,

    #[validate(range(min = 0.0, max = 100.0))]
    pub relative_humidity_2m: Option<f64>,

    #[validate(range(min = 0.0, max = 100.0))]
    pub cloudcover: Option<f64>,

    #[validate(range(min = 0.0, max = 150.0))]
    pub windspeed_10m: Option<f64>,

    #[validate(range(min = 900.0, max = 1100.0))]
    pub pressure_msl: Option<f64>,

    #[validate(range(min = -50.0, max = 50.0))]
    pub temperature_2m: Option<f64>,

    /// Input columns the simulator does not interpret, in header order.
    /// They are carried through to the output table unchanged.
    #[serde(skip)]
    pub extra: Vec<(String, String)>,
}

/// Fully populated weather inputs for the attenuation and noise models.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherConditions {
    pub rain_rate: f64,
    pub humidity: f64,
    pub cloudcover: f64,
    pub wind_speed: f64,
    pub pressure: f64,
    pub temperature: f64,
}

impl Default for WeatherConditions {
    fn default() -> Self {
        Self {
            rain_rate: DEFAULT_RAIN_RATE,
            humidity: DEFAULT_HUMIDITY,
            cloudcover: DEFAULT_CLOUDCOVER,
            wind_speed: DEFAULT_WINDSPEED,
            pressure: DEFAULT_PRESSURE,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

/// Null (or non-finite) readings fall back to the field default.
fn or_default(value: Option<f64>, default: f64) -> f64 {
    match value {
        Some(v) if v.is_finite() => v,
        _ => default,
    }
}

impl WeatherRow {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            timestamp: None,
            location: location.into(),
            rain_rate: None,
            relative_humidity_2m: None,
            cloudcover: None,
            windspeed_10m: None,
            pressure_msl: None,
            temperature_2m: None,
            extra: Vec::new(),
        }
    }

    pub fn builder(location: impl Into<String>) -> WeatherRowBuilder {
        WeatherRowBuilder::new(location)
    }

    /// Substitute defaults for every missing weather field
    pub fn conditions(&self) -> WeatherConditions {
        WeatherConditions {
            rain_rate: or_default(self.rain_rate, DEFAULT_RAIN_RATE),
            humidity: or_default(self.relative_humidity_2m, DEFAULT_HUMIDITY),
            cloudcover: or_default(self.cloudcover, DEFAULT_CLOUDCOVER),
            wind_speed: or_default(self.windspeed_10m, DEFAULT_WINDSPEED),
            pressure: or_default(self.pressure_msl, DEFAULT_PRESSURE),
            temperature: or_default(self.temperature_2m, DEFAULT_TEMPERATURE),
        }
    }

    /// Hour of day from the row's own timestamp, noon when absent
    pub fn hour(&self) -> u32 {
        self.timestamp.map_or(DEFAULT_HOUR, |ts| ts.hour())
    }

    /// Calendar month (1-12) from the row's own timestamp, June when absent
    pub fn month(&self) -> u32 {
        self.timestamp.map_or(DEFAULT_MONTH, |ts| ts.month())
    }

    pub fn get(&self, column: WeatherColumn) -> Option<f64> {
        match column {
            WeatherColumn::RainRate => self.rain_rate,
            WeatherColumn::RelativeHumidity => self.relative_humidity_2m,
            WeatherColumn::CloudCover => self.cloudcover,
            WeatherColumn::WindSpeed => self.windspeed_10m,
            WeatherColumn::Pressure => self.pressure_msl,
            WeatherColumn::Temperature => self.temperature_2m,
        }
    }

    pub fn set(&mut self, column: WeatherColumn, value: Option<f64>) {
        let slot = match column {
            WeatherColumn::RainRate => &mut self.rain_rate,
            WeatherColumn::RelativeHumidity => &mut self.relative_humidity_2m,
            WeatherColumn::CloudCover => &mut self.cloudcover,
            WeatherColumn::WindSpeed => &mut self.windspeed_10m,
            WeatherColumn::Pressure => &mut self.pressure_msl,
            WeatherColumn::Temperature => &mut self.temperature_2m,
        };
        *slot = value;
    }

    pub fn missing_columns(&self) -> Vec<WeatherColumn> {
        WeatherColumn::ALL
            .into_iter()
            .filter(|c| self.get(*c).is_none())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        WeatherColumn::ALL.iter().all(|c| self.get(*c).is_some())
    }

    pub fn extra_value(&self, name: &str) -> Option<&str> {
        self.extra
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, value)| value.as_str())
    }

    /// Location name restricted to `[A-Za-z0-9_.-]`, other characters become `_`
    pub fn safe_location(&self) -> String {
        self.location
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    }
}

/// The six numeric weather columns of a [`WeatherRow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WeatherColumn {
    RainRate,
    RelativeHumidity,
    CloudCover,
    WindSpeed,
    Pressure,
    Temperature,
}

impl WeatherColumn {
    pub const ALL: [WeatherColumn; 6] = [
        WeatherColumn::RainRate,
        WeatherColumn::RelativeHumidity,
        WeatherColumn::CloudCover,
        WeatherColumn::WindSpeed,
        WeatherColumn::Pressure,
        WeatherColumn::Temperature,
    ];

    /// Columns targeted by sensor failure and malfunction simulation
    pub const DEGRADABLE: [WeatherColumn; 3] = [
        WeatherColumn::RainRate,
        WeatherColumn::RelativeHumidity,
        WeatherColumn::WindSpeed,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            WeatherColumn::RainRate => COL_RAIN_RATE,
            WeatherColumn::RelativeHumidity => COL_HUMIDITY,
            WeatherColumn::CloudCover => COL_CLOUDCOVER,
            WeatherColumn::WindSpeed => COL_WINDSPEED,
            WeatherColumn::Pressure => COL_PRESSURE,
            WeatherColumn::Temperature => COL_TEMPERATURE,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            COL_RAIN_RATE | ALIAS_RAIN_RATE => Some(WeatherColumn::RainRate),
            COL_HUMIDITY => Some(WeatherColumn::RelativeHumidity),
            COL_CLOUDCOVER => Some(WeatherColumn::CloudCover),
            COL_WINDSPEED => Some(WeatherColumn::WindSpeed),
            COL_PRESSURE => Some(WeatherColumn::Pressure),
            COL_TEMPERATURE => Some(WeatherColumn::Temperature),
            _ => None,
        }
    }

    pub fn valid_range(&self) -> (f64, f64) {
        match self {
            WeatherColumn::RainRate => VALID_RAIN_RATE,
            WeatherColumn::RelativeHumidity => VALID_HUMIDITY,
            WeatherColumn::CloudCover => VALID_CLOUDCOVER,
            WeatherColumn::WindSpeed => VALID_WINDSPEED,
            WeatherColumn::Pressure => VALID_PRESSURE,
            WeatherColumn::Temperature => VALID_TEMPERATURE,
        }
    }

    /// Value range reported by a malfunctioning sensor, if the column is degradable
    pub fn malfunction_range(&self) -> Option<(f64, f64)> {
        match self {
            WeatherColumn::RainRate => Some(MALFUNCTION_RAIN_RATE),
            WeatherColumn::RelativeHumidity => Some(MALFUNCTION_HUMIDITY),
            WeatherColumn::WindSpeed => Some(MALFUNCTION_WINDSPEED),
            _ => None,
        }
    }

    pub fn is_in_valid_range(&self, value: f64) -> bool {
        let (min, max) = self.valid_range();
        (min..=max).contains(&value)
    }
}

impl std::fmt::Display for WeatherColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

pub struct WeatherRowBuilder {
    row: WeatherRow,
}

impl WeatherRowBuilder {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            row: WeatherRow::new(location),
        }
    }

    pub fn timestamp(mut self, timestamp: NaiveDateTime) -> Self {
        self.row.timestamp = Some(timestamp);
        self
    }

    pub fn rain_rate(mut self, value: f64) -> Self {
        self.row.rain_rate = Some(value);
        self
    }

    pub fn humidity(mut self, value: f64) -> Self {
        self.row.relative_humidity_2m = Some(value);
        self
    }

    pub fn cloudcover(mut self, value: f64) -> Self {
        self.row.cloudcover = Some(value);
        self
    }

    pub fn wind_speed(mut self, value: f64) -> Self {
        self.row.windspeed_10m = Some(value);
        self
    }

    pub fn pressure(mut self, value: f64) -> Self {
        self.row.pressure_msl = Some(value);
        self
    }

    pub fn temperature(mut self, value: f64) -> Self {
        self.row.temperature_2m = Some(value);
        self
    }

    pub fn extra(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.row.extra.push((column.into(), value.into()));
        self
    }

    /// Populate every weather field with its null default
    pub fn calm(self) -> Self {
        let c = WeatherConditions::default();
        self.rain_rate(c.rain_rate)
            .humidity(c.humidity)
            .cloudcover(c.cloudcover)
            .wind_speed(c.wind_speed)
            .pressure(c.pressure)
            .temperature(c.temperature)
    }

    pub fn build(self) -> WeatherRow {
        self.row
    }
}
