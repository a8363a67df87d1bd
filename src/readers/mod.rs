pub mod signal_reader;
pub mod weather_reader;

pub use signal_reader::SignalReader;
pub use weather_reader::WeatherReader;

use csv::StringRecord;

use crate::utils::constants::KNOWN_COLUMNS;

/// Header positions of columns the simulator does not interpret
pub(crate) fn passthrough_columns(headers: &StringRecord) -> Vec<(usize, String)> {
    headers
        .iter()
        .enumerate()
        .filter(|(_, name)| !KNOWN_COLUMNS.contains(name))
        .map(|(idx, name)| (idx, name.to_string()))
        .collect()
}

pub(crate) fn passthrough_cells(
    columns: &[(usize, String)],
    record: &StringRecord,
) -> Vec<(String, String)> {
    columns
        .iter()
        .map(|(idx, name)| (name.clone(), record.get(*idx).unwrap_or("").to_string()))
        .collect()
}
