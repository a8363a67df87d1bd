pub mod signal;
pub mod weather;

pub use signal::{SignalRecord, SignalRow};
pub use weather::{parse_timestamp, WeatherColumn, WeatherConditions, WeatherRow, WeatherRowBuilder};
