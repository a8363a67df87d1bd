use csv::WriterBuilder;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::Result;
use crate::models::{SignalRecord, SignalRow};
use crate::utils::constants::{
    COL_CLOUDCOVER, COL_HUMIDITY, COL_LOCATION, COL_PRESSURE, COL_RAIN_RATE, COL_SIGNAL,
    COL_TEMPERATURE, COL_TIMESTAMP, COL_WINDSPEED,
};

const WEATHER_HEADER: [&str; 8] = [
    COL_TIMESTAMP,
    COL_LOCATION,
    COL_RAIN_RATE,
    COL_HUMIDITY,
    COL_CLOUDCOVER,
    COL_WINDSPEED,
    COL_PRESSURE,
    COL_TEMPERATURE,
];

pub struct SignalWriter {
    batch_size: usize,
}

impl SignalWriter {
    pub fn new() -> Self {
        Self { batch_size: 1000 }
    }

    /// Rows written between buffer flushes
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Write records as CSV, creating parent directories as needed
    pub fn write_records(&self, records: &[SignalRecord], path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let file = File::create(path)?;
        self.write_to(records, BufWriter::new(file))?;
        info!(path = %path.display(), records = records.len(), "Wrote signal table");
        Ok(())
    }

    /// Weather columns, then pass-through input columns, then `signal_dbm`
    pub fn write_to<W: Write>(&self, records: &[SignalRecord], writer: W) -> Result<()> {
        let passthrough = passthrough_names(records);
        let mut csv_writer = WriterBuilder::new().has_headers(false).from_writer(writer);

        let mut header: Vec<&str> = WEATHER_HEADER.to_vec();
        header.extend(passthrough.iter().map(String::as_str));
        header.push(COL_SIGNAL);
        csv_writer.write_record(&header)?;

        for (batch_idx, batch) in records.chunks(self.batch_size).enumerate() {
            for record in batch {
                csv_writer.write_record(&output_cells(record, &passthrough))?;
            }
            csv_writer.flush()?;
            debug!(batch = batch_idx, rows = batch.len(), "Flushed signal batch");
        }

        csv_writer.flush()?;
        Ok(())
    }

    pub fn get_file_info(&self, path: &Path) -> Result<OutputFileInfo> {
        let metadata = fs::metadata(path)?;
        let mut reader = csv::Reader::from_path(path)?;
        let total_rows = reader.records().count();

        Ok(OutputFileInfo {
            path: path.to_path_buf(),
            total_rows,
            file_size: metadata.len(),
        })
    }
}

impl Default for SignalWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Pass-through column names across all records, in first-seen order
fn passthrough_names(records: &[SignalRecord]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for record in records {
        for (name, _) in &record.weather.extra {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
    }
    names
}

fn number_cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn output_cells(record: &SignalRecord, passthrough: &[String]) -> Vec<String> {
    let row = SignalRow::from(record);
    let mut cells = vec![
        row.timestamp.unwrap_or_default(),
        row.location,
        number_cell(row.rain_rate),
        number_cell(row.relative_humidity_2m),
        number_cell(row.cloudcover),
        number_cell(row.windspeed_10m),
        number_cell(row.pressure_msl),
        number_cell(row.temperature_2m),
    ];
    cells.extend(
        passthrough
            .iter()
            .map(|name| record.weather.extra_value(name).unwrap_or("").to_string()),
    );
    cells.push(number_cell(row.signal_dbm));
    cells
}

#[derive(Debug, Clone)]
pub struct OutputFileInfo {
    pub path: PathBuf,
    pub total_rows: usize,
    pub file_size: u64,
}

impl OutputFileInfo {
    pub fn summary(&self) -> String {
        format!(
            "File: {}\nRows: {}\nSize: {:.2} KB",
            self.path.display(),
            self.total_rows,
            self.file_size as f64 / 1024.0
        )
    }
}
