use rand::seq::index;
use rand::Rng;
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::{Result, SimulationError};
use crate::models::{WeatherColumn, WeatherRow};
use crate::utils::constants::{DEFAULT_MISSING_RATE, DEFAULT_OUTLIER_RATE};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlierInjection {
    pub row: usize,
    pub column: WeatherColumn,
    pub original: Option<f64>,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DegradationReport {
    pub total_rows: usize,
    pub missing_injected: BTreeMap<WeatherColumn, usize>,
    pub outliers: Vec<OutlierInjection>,
}

impl DegradationReport {
    pub fn total_missing(&self) -> usize {
        self.missing_injected.values().sum()
    }

    pub fn summary(&self) -> String {
        let mut summary = String::new();
        summary.push_str("=== Quality Degradation ===\n");
        summary.push_str(&format!("Rows: {}\n", self.total_rows));
        for (column, count) in &self.missing_injected {
            summary.push_str(&format!("  {} nulls injected: {}\n", column, count));
        }
        summary.push_str(&format!("Outliers injected: {}\n", self.outliers.len()));
        summary
    }
}

/// Weather rows after missing-value and outlier injection.
#[derive(Debug, Clone, PartialEq)]
pub struct DegradedTable {
    pub rows: Vec<WeatherRow>,
    pub report: DegradationReport,
}

/// Simulates sensor failures (nulls) and malfunctions (out-of-normal values)
/// on rain rate, relative humidity and wind speed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityDegrader {
    missing_rate: f64,
    outlier_rate: f64,
}

fn check_rate(name: &str, rate: f64) -> Result<f64> {
    if (0.0..1.0).contains(&rate) {
        Ok(rate)
    } else {
        Err(SimulationError::InvalidParameter(format!(
            "{} must be in [0, 1), got {}",
            name, rate
        )))
    }
}

impl QualityDegrader {
    pub fn new(missing_rate: f64, outlier_rate: f64) -> Result<Self> {
        Ok(Self {
            missing_rate: check_rate("missing_rate", missing_rate)?,
            outlier_rate: check_rate("outlier_rate", outlier_rate)?,
        })
    }

    pub fn missing_rate(&self) -> f64 {
        self.missing_rate
    }

    pub fn outlier_rate(&self) -> f64 {
        self.outlier_rate
    }

    /// Inject missing values, then outliers. The two steps draw independently,
    /// so a row may be hit by both.
    pub fn degrade<R: Rng + ?Sized>(&self, rows: &[WeatherRow], rng: &mut R) -> DegradedTable {
        let mut rows = rows.to_vec();
        let missing_injected = self.inject_missing(&mut rows, rng);
        let outliers = self.inject_outliers(&mut rows, rng);

        debug!(
            rows = rows.len(),
            missing = missing_injected.values().sum::<usize>(),
            outliers = outliers.len(),
            "Degraded weather table"
        );

        DegradedTable {
            report: DegradationReport {
                total_rows: rows.len(),
                missing_injected,
                outliers,
            },
            rows,
        }
    }

    /// One uniform draw per row and column; below `missing_rate` the cell is nulled.
    pub fn inject_missing<R: Rng + ?Sized>(
        &self,
        rows: &mut [WeatherRow],
        rng: &mut R,
    ) -> BTreeMap<WeatherColumn, usize> {
        let mut injected = BTreeMap::new();

        for column in WeatherColumn::DEGRADABLE {
            let mut count = 0;
            for row in rows.iter_mut() {
                if rng.gen::<f64>() < self.missing_rate {
                    row.set(column, None);
                    count += 1;
                }
            }
            injected.insert(column, count);
        }

        injected
    }

    /// Overwrite one random degradable column in exactly
    /// `floor(rows * outlier_rate)` distinct rows with a malfunction reading.
    pub fn inject_outliers<R: Rng + ?Sized>(
        &self,
        rows: &mut [WeatherRow],
        rng: &mut R,
    ) -> Vec<OutlierInjection> {
        let n_outliers = (rows.len() as f64 * self.outlier_rate).floor() as usize;
        if n_outliers == 0 {
            return Vec::new();
        }

        let indices = index::sample(rng, rows.len(), n_outliers);
        let mut injections = Vec::with_capacity(n_outliers);

        for idx in indices.iter() {
            let column =
                WeatherColumn::DEGRADABLE[rng.gen_range(0..WeatherColumn::DEGRADABLE.len())];
            let Some((low, high)) = column.malfunction_range() else {
                continue;
            };
            let value = rng.gen_range(low..high);

            let row = &mut rows[idx];
            injections.push(OutlierInjection {
                row: idx,
                column,
                original: row.get(column),
                value,
            });
            row.set(column, Some(value));
        }

        injections
    }
}

impl Default for QualityDegrader {
    fn default() -> Self {
        Self {
            missing_rate: DEFAULT_MISSING_RATE,
            outlier_rate: DEFAULT_OUTLIER_RATE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;

    fn clean_table(n: usize) -> Vec<WeatherRow> {
        (0..n)
            .map(|i| {
                WeatherRow::builder(format!("Station {}", i % 5))
                    .rain_rate(0.5)
                    .humidity(55.0)
                    .cloudcover(40.0)
                    .wind_speed(3.0)
                    .pressure(1012.0)
                    .temperature(18.0)
                    .build()
            })
            .collect()
    }

    #[test]
    fn test_rejects_rates_outside_unit_interval() {
        assert!(QualityDegrader::new(1.0, 0.0).is_err());
        assert!(QualityDegrader::new(0.0, -0.1).is_err());
        assert!(QualityDegrader::new(0.0, 0.0).is_ok());
    }

    #[test]
    fn test_default_rates() {
        let degrader = QualityDegrader::default();
        assert_eq!(degrader.missing_rate(), 0.05);
        assert_eq!(degrader.outlier_rate(), 0.02);
    }

    #[test]
    fn test_missing_rate_within_binomial_tolerance() {
        let degrader = QualityDegrader::new(0.1, 0.0).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let table = degrader.degrade(&clean_table(10_000), &mut rng);

        // binomial(10000, 0.1): mean 1000, std 30
        for column in WeatherColumn::DEGRADABLE {
            let nulls = table.rows.iter().filter(|r| r.get(column).is_none()).count();
            assert!((910..=1090).contains(&nulls), "{}: {}", column, nulls);
            assert_eq!(table.report.missing_injected[&column], nulls);
        }
    }

    #[test]
    fn test_untargeted_columns_pass_through() {
        let degrader = QualityDegrader::new(0.5, 0.1).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let clean = clean_table(500);
        let table = degrader.degrade(&clean, &mut rng);

        for (before, after) in clean.iter().zip(&table.rows) {
            assert_eq!(before.location, after.location);
            assert_eq!(before.cloudcover, after.cloudcover);
            assert_eq!(before.pressure_msl, after.pressure_msl);
            assert_eq!(before.temperature_2m, after.temperature_2m);
        }
    }

    #[test]
    fn test_outlier_count_is_exact() {
        let degrader = QualityDegrader::new(0.0, 0.02).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let table = degrader.degrade(&clean_table(1000), &mut rng);

        assert_eq!(table.report.outliers.len(), 20);

        let rows: HashSet<usize> = table.report.outliers.iter().map(|o| o.row).collect();
        assert_eq!(rows.len(), 20);

        let outlier_cells: usize = table
            .rows
            .iter()
            .map(|r| {
                usize::from(r.rain_rate.unwrap() >= 50.0)
                    + usize::from(r.relative_humidity_2m.unwrap() >= 95.0)
                    + usize::from(r.windspeed_10m.unwrap() >= 30.0)
            })
            .sum();
        assert_eq!(outlier_cells, 20);
    }

    #[test]
    fn test_outlier_values_in_malfunction_ranges() {
        let degrader = QualityDegrader::new(0.0, 0.5).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let table = degrader.degrade(&clean_table(400), &mut rng);

        let mut seen = HashSet::new();
        for outlier in &table.report.outliers {
            let (low, high) = outlier.column.malfunction_range().unwrap();
            assert!((low..high).contains(&outlier.value));
            assert_eq!(table.rows[outlier.row].get(outlier.column), Some(outlier.value));
            assert!(outlier.original.is_some());
            seen.insert(outlier.column);
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_small_tables_get_no_outliers() {
        let degrader = QualityDegrader::new(0.0, 0.015).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let table = degrader.degrade(&clean_table(60), &mut rng);
        assert!(table.report.outliers.is_empty());
        assert_eq!(table.rows, clean_table(60));
    }

    #[test]
    fn test_degradation_is_reproducible() {
        let degrader = QualityDegrader::default();
        let clean = clean_table(2000);

        let a = degrader.degrade(&clean, &mut ChaCha8Rng::seed_from_u64(42));
        let b = degrader.degrade(&clean, &mut ChaCha8Rng::seed_from_u64(42));
        let c = degrader.degrade(&clean, &mut ChaCha8Rng::seed_from_u64(43));

        assert_eq!(a, b);
        assert_ne!(a.rows, c.rows);
    }

    #[test]
    fn test_empty_table() {
        let degrader = QualityDegrader::default();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let table = degrader.degrade(&[], &mut rng);
        assert!(table.rows.is_empty());
        assert_eq!(table.report.total_missing(), 0);
    }
}
