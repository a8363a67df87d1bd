use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info};
use validator::Validate;

use crate::error::{Result, SimulationError};
use crate::models::WeatherRow;
use crate::processors::QualityChecker;
use crate::readers::{passthrough_cells, passthrough_columns};

pub struct WeatherReader {
    strict_validation: bool,
}

impl WeatherReader {
    pub fn new() -> Self {
        Self {
            strict_validation: false,
        }
    }

    /// Reject rows whose readings fall outside the valid physical ranges
    pub fn with_strict_validation(strict_validation: bool) -> Self {
        Self { strict_validation }
    }

    /// Read weather rows from a CSV file with a header row
    pub fn read_rows(&self, path: &Path) -> Result<Vec<WeatherRow>> {
        let file = File::open(path)?;
        let rows = self.read_from(BufReader::new(file))?;
        info!(path = %path.display(), rows = rows.len(), "Loaded weather table");
        Ok(rows)
    }

    pub fn read_from<R: Read>(&self, reader: R) -> Result<Vec<WeatherRow>> {
        let mut csv_reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        ensure_columns(&headers)?;
        let passthrough = passthrough_columns(&headers);
        debug!(
            columns = headers.len(),
            passthrough = passthrough.len(),
            "Weather table schema accepted"
        );

        let mut rows = Vec::new();
        for result in csv_reader.records() {
            let record = result?;
            let mut row: WeatherRow = record.deserialize(Some(&headers))?;
            if self.strict_validation {
                row.validate()?;
            }
            row.extra = passthrough_cells(&passthrough, &record);
            rows.push(row);
        }

        Ok(rows)
    }

    /// Header row of a CSV file
    pub fn read_headers(&self, path: &Path) -> Result<Vec<String>> {
        let mut csv_reader = ReaderBuilder::new()
            .trim(Trim::All)
            .from_reader(BufReader::new(File::open(path)?));
        Ok(csv_reader.headers()?.iter().map(str::to_string).collect())
    }
}

impl Default for WeatherReader {
    fn default() -> Self {
        Self::new()
    }
}

fn ensure_columns(headers: &StringRecord) -> Result<()> {
    let names: Vec<&str> = headers.iter().collect();
    let missing = QualityChecker::new().check_schema(&names);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(SimulationError::MissingColumn {
            column: missing.join(", "),
        })
    }
}
