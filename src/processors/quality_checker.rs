use chrono::NaiveDateTime;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::{info, warn};
use validator::Validate;

use crate::error::Result;
use crate::models::{WeatherColumn, WeatherRow};
use crate::readers::WeatherReader;
use crate::utils::constants::{ALIAS_RAIN_RATE, COL_RAIN_RATE, REQUIRED_COLUMNS};

#[derive(Debug, Clone, Default)]
pub struct QualityReport {
    pub total_records: usize,
    pub complete_records: usize,
    pub missing_columns: Vec<String>,
    pub null_counts: BTreeMap<WeatherColumn, usize>,
    pub range_violations: Vec<RangeViolation>,
    pub missing_timestamps: usize,
    pub duplicate_records: usize,
    pub location_statistics: BTreeMap<String, LocationStatistics>,
}

impl QualityReport {
    pub fn total_nulls(&self) -> usize {
        self.null_counts.values().sum()
    }

    pub fn violations_for(&self, column: WeatherColumn) -> usize {
        self.range_violations
            .iter()
            .filter(|v| v.column == column)
            .count()
    }

    pub fn is_clean(&self) -> bool {
        self.missing_columns.is_empty()
            && self.total_nulls() == 0
            && self.range_violations.is_empty()
            && self.duplicate_records == 0
    }
}

#[derive(Debug, Clone)]
pub struct RangeViolation {
    pub row: usize,
    pub location: String,
    pub timestamp: Option<NaiveDateTime>,
    pub column: WeatherColumn,
    pub value: f64,
    pub details: String,
}

#[derive(Debug, Clone, Default)]
pub struct LocationStatistics {
    pub total_records: usize,
    pub complete_records: usize,
    pub null_cells: usize,
    pub range_violations: usize,
}

/// Data-quality checks on a weather table: schema, nulls, physical ranges,
/// timestamps and duplicate observations.
pub struct QualityChecker {
    strict_mode: bool,
}

impl QualityChecker {
    pub fn new() -> Self {
        Self { strict_mode: false }
    }

    /// In strict mode the first row failing range validation aborts the check
    pub fn with_strict_mode(strict_mode: bool) -> Self {
        Self { strict_mode }
    }

    /// Required columns absent from a header row. `rain` is accepted for `rain_rate`.
    pub fn check_schema<S: AsRef<str>>(&self, headers: &[S]) -> Vec<String> {
        let present: HashSet<&str> = headers.iter().map(|h| h.as_ref().trim()).collect();

        REQUIRED_COLUMNS
            .iter()
            .filter(|col| {
                !(present.contains(**col)
                    || (**col == COL_RAIN_RATE && present.contains(ALIAS_RAIN_RATE)))
            })
            .map(|col| col.to_string())
            .collect()
    }

    /// Check a weather CSV file. A file lacking required columns yields a
    /// report listing them instead of an error, so it can still be summarized.
    pub fn check_file(&self, path: &Path) -> Result<QualityReport> {
        let reader = WeatherReader::new();
        let missing = self.check_schema(&reader.read_headers(path)?);

        if !missing.is_empty() {
            warn!(columns = %missing.join(", "), "Required columns missing");
            let total_records = csv::Reader::from_path(path)?.records().count();
            return Ok(QualityReport {
                total_records,
                missing_columns: missing,
                ..QualityReport::default()
            });
        }

        self.check_quality(&reader.read_rows(path)?)
    }

    pub fn check_quality(&self, rows: &[WeatherRow]) -> Result<QualityReport> {
        let mut report = QualityReport {
            total_records: rows.len(),
            null_counts: WeatherColumn::ALL.iter().map(|c| (*c, 0)).collect(),
            ..QualityReport::default()
        };

        let mut seen: HashSet<(&str, NaiveDateTime)> = HashSet::new();

        for (idx, row) in rows.iter().enumerate() {
            if self.strict_mode {
                row.validate()?;
            }

            self.check_record(idx, row, &mut report);

            match row.timestamp {
                Some(ts) => {
                    if !seen.insert((row.location.as_str(), ts)) {
                        report.duplicate_records += 1;
                    }
                }
                None => report.missing_timestamps += 1,
            }
        }

        if report.total_nulls() > 0 {
            warn!(nulls = report.total_nulls(), "Missing values detected");
        }
        if !report.range_violations.is_empty() {
            warn!(
                violations = report.range_violations.len(),
                "Out-of-range values detected"
            );
        }
        if report.duplicate_records > 0 {
            warn!(duplicates = report.duplicate_records, "Duplicate observations detected");
        }
        info!(records = report.total_records, "Quality check complete");

        Ok(report)
    }

    fn check_record(&self, idx: usize, row: &WeatherRow, report: &mut QualityReport) {
        let missing = row.missing_columns();
        for column in &missing {
            *report.null_counts.entry(*column).or_default() += 1;
        }

        let mut violations = 0;
        for column in WeatherColumn::ALL {
            let Some(value) = row.get(column) else {
                continue;
            };
            if column.is_in_valid_range(value) {
                continue;
            }

            violations += 1;
            let (min, max) = column.valid_range();
            report.range_violations.push(RangeViolation {
                row: idx,
                location: row.location.clone(),
                timestamp: row.timestamp,
                column,
                value,
                details: format!(
                    "{} value {} is outside valid range [{}, {}]",
                    column, value, min, max
                ),
            });
        }

        let complete = row.is_complete();
        if complete {
            report.complete_records += 1;
        }

        let stats = report
            .location_statistics
            .entry(row.location.clone())
            .or_default();
        stats.total_records += 1;
        stats.null_cells += missing.len();
        stats.range_violations += violations;
        if complete {
            stats.complete_records += 1;
        }
    }

    /// Generate a summary report
    pub fn generate_summary(&self, report: &QualityReport) -> String {
        let mut summary = String::new();
        let pct = |n: usize| {
            if report.total_records == 0 {
                0.0
            } else {
                100.0 * n as f64 / report.total_records as f64
            }
        };

        summary.push_str("=== Data Quality Report ===\n");
        summary.push_str(&format!("Total Records: {}\n", report.total_records));
        summary.push_str(&format!(
            "Complete Records: {} ({:.1}%)\n",
            report.complete_records,
            pct(report.complete_records)
        ));

        if !report.missing_columns.is_empty() {
            summary.push_str(&format!(
                "Missing Columns: {}\n",
                report.missing_columns.join(", ")
            ));
        }

        summary.push_str("\nNull Values:\n");
        for (column, count) in &report.null_counts {
            summary.push_str(&format!(
                "  {}: {} ({:.1}%)\n",
                column,
                count,
                pct(*count)
            ));
        }

        summary.push_str(&format!(
            "\nRows Without Timestamp: {}\n",
            report.missing_timestamps
        ));
        summary.push_str(&format!(
            "Duplicate Observations: {}\n",
            report.duplicate_records
        ));
        summary.push_str(&format!(
            "\nRange Violations: {}\n",
            report.range_violations.len()
        ));

        if !report.range_violations.is_empty() {
            summary.push_str("\nTop 10 Violations:\n");
            for (i, violation) in report.range_violations.iter().take(10).enumerate() {
                summary.push_str(&format!(
                    "  {}. Row {} ({}): {}\n",
                    i + 1,
                    violation.row,
                    violation.location,
                    violation.details
                ));
            }
        }

        summary
    }
}

impl Default for QualityChecker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::parse_timestamp;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn observation(location: &str, time: &str) -> WeatherRow {
        WeatherRow::builder(location)
            .timestamp(parse_timestamp(time).unwrap())
            .calm()
            .build()
    }

    #[test]
    fn test_schema_check() {
        let checker = QualityChecker::new();
        let headers = [
            "time",
            "location",
            "rain",
            "relative_humidity_2m",
            "cloudcover",
            "windspeed_10m",
            "pressure_msl",
        ];
        assert_eq!(checker.check_schema(&headers), vec!["temperature_2m"]);

        let full: Vec<&str> = REQUIRED_COLUMNS.to_vec();
        assert!(checker.check_schema(&full).is_empty());
    }

    #[test]
    fn test_clean_table() {
        let rows = vec![
            observation("Seattle", "2024-07-01T00:00"),
            observation("Seattle", "2024-07-01T01:00"),
            observation("Miami", "2024-07-01T00:00"),
        ];
        let report = QualityChecker::new().check_quality(&rows).unwrap();

        assert!(report.is_clean());
        assert_eq!(report.complete_records, 3);
        assert_eq!(report.location_statistics["Seattle"].total_records, 2);
    }

    #[test]
    fn test_nulls_ranges_and_duplicates() {
        let mut rows = vec![
            observation("Seattle", "2024-07-01T00:00"),
            observation("Seattle", "2024-07-01T00:00"),
            observation("Miami", "2024-07-01T00:00"),
            WeatherRow::builder("Denver").calm().build(),
        ];
        rows[0].relative_humidity_2m = None;
        rows[2].pressure_msl = Some(850.0);
        rows[2].windspeed_10m = Some(200.0);

        let report = QualityChecker::new().check_quality(&rows).unwrap();

        assert_eq!(report.null_counts[&WeatherColumn::RelativeHumidity], 1);
        assert_eq!(report.total_nulls(), 1);
        assert_eq!(report.range_violations.len(), 2);
        assert_eq!(report.violations_for(WeatherColumn::Pressure), 1);
        assert_eq!(report.violations_for(WeatherColumn::WindSpeed), 1);
        assert_eq!(report.duplicate_records, 1);
        assert_eq!(report.missing_timestamps, 1);
        assert_eq!(report.complete_records, 3);
        assert_eq!(report.location_statistics["Miami"].range_violations, 2);

        let summary = QualityChecker::new().generate_summary(&report);
        assert!(summary.contains("Range Violations: 2"));
        assert!(summary.contains("Duplicate Observations: 1"));
    }

    #[test]
    fn test_strict_mode_rejects_out_of_range_rows() {
        let mut row = observation("Phoenix", "2024-07-01T12:00");
        row.temperature_2m = Some(65.0);

        assert!(QualityChecker::with_strict_mode(true)
            .check_quality(&[row.clone()])
            .is_err());
        assert!(QualityChecker::new().check_quality(&[row]).is_ok());
    }

    #[test]
    fn test_empty_table_summary() {
        let checker = QualityChecker::new();
        let report = checker.check_quality(&[]).unwrap();
        let summary = checker.generate_summary(&report);
        assert!(summary.contains("Total Records: 0"));
    }

    #[test]
    fn test_check_file_reports_missing_columns() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "time,location,rain,relative_humidity_2m,cloudcover,windspeed_10m").unwrap();
        writeln!(file, "2024-07-01T00:00,Seattle,0.4,81,90,3.5").unwrap();
        writeln!(file, "2024-07-01T01:00,Seattle,0.2,80,90,3.0").unwrap();
        file.flush().unwrap();

        let checker = QualityChecker::new();
        let report = checker.check_file(file.path()).unwrap();

        assert_eq!(report.missing_columns, vec!["pressure_msl", "temperature_2m"]);
        assert_eq!(report.total_records, 2);
        assert!(!report.is_clean());
        assert!(checker
            .generate_summary(&report)
            .contains("Missing Columns: pressure_msl, temperature_2m"));
    }

    #[test]
    fn test_check_file_with_complete_schema() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "time,location,rain,relative_humidity_2m,cloudcover,windspeed_10m,pressure_msl,temperature_2m"
        )
        .unwrap();
        writeln!(file, "2024-07-01T00:00,Seattle,0.4,81,,3.5,1011.2,14.1").unwrap();
        file.flush().unwrap();

        let report = QualityChecker::new().check_file(file.path()).unwrap();

        assert!(report.missing_columns.is_empty());
        assert_eq!(report.total_records, 1);
        assert_eq!(report.null_counts[&WeatherColumn::CloudCover], 1);
        assert_eq!(report.location_statistics["Seattle"].null_cells, 1);
        assert_eq!(report.complete_records, 0);
    }
}
