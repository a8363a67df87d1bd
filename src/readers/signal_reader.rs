use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::info;

use crate::error::{Result, SimulationError};
use crate::models::{SignalRecord, SignalRow};
use crate::readers::{passthrough_cells, passthrough_columns};
use crate::utils::constants::{COL_LOCATION, COL_SIGNAL};

/// Reads simulator output back into [`SignalRecord`]s.
pub struct SignalReader;

impl SignalReader {
    pub fn new() -> Self {
        Self
    }

    pub fn read_records(&self, path: &Path) -> Result<Vec<SignalRecord>> {
        let file = File::open(path)?;
        let records = self.read_from(BufReader::new(file))?;
        info!(path = %path.display(), records = records.len(), "Loaded signal table");
        Ok(records)
    }

    pub fn read_from<R: Read>(&self, reader: R) -> Result<Vec<SignalRecord>> {
        let mut csv_reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        for required in [COL_LOCATION, COL_SIGNAL] {
            if !headers.iter().any(|h| h == required) {
                return Err(SimulationError::MissingColumn {
                    column: required.to_string(),
                });
            }
        }

        let passthrough = passthrough_columns(&headers);
        let mut records = Vec::new();
        for result in csv_reader.records() {
            let raw = result?;
            let row: SignalRow = raw.deserialize(Some(&headers))?;
            let mut record = SignalRecord::try_from(row)?;
            record.weather.extra = passthrough_cells(&passthrough, &raw);
            records.push(record);
        }

        Ok(records)
    }
}

impl Default for SignalReader {
    fn default() -> Self {
        Self::new()
    }
}
