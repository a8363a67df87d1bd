use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use crate::models::{WeatherColumn, WeatherRow};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GapFillReport {
    pub filled: BTreeMap<WeatherColumn, usize>,
    /// Cells left null because their location has no reading at all
    pub unfilled: BTreeMap<WeatherColumn, usize>,
}

impl GapFillReport {
    pub fn total_filled(&self) -> usize {
        self.filled.values().sum()
    }

    pub fn total_unfilled(&self) -> usize {
        self.unfilled.values().sum()
    }
}

/// Fills null weather readings from neighbouring rows of the same location:
/// forward fill first, then backward fill for leading gaps.
#[derive(Debug, Clone, Copy, Default)]
pub struct GapFiller;

impl GapFiller {
    pub fn new() -> Self {
        Self
    }

    pub fn fill(&self, rows: &mut [WeatherRow]) -> GapFillReport {
        let mut groups: HashMap<&str, Vec<usize>> = HashMap::new();
        for (idx, row) in rows.iter().enumerate() {
            groups.entry(row.location.as_str()).or_default().push(idx);
        }
        // owned indices so rows can be mutated below
        let groups: Vec<Vec<usize>> = groups.into_values().collect();

        let mut report = GapFillReport::default();

        for column in WeatherColumn::ALL {
            let mut filled = 0;
            let mut unfilled = 0;

            for indices in &groups {
                let mut last = None;
                for &idx in indices {
                    match rows[idx].get(column) {
                        Some(v) => last = Some(v),
                        None if last.is_some() => {
                            rows[idx].set(column, last);
                            filled += 1;
                        }
                        None => {}
                    }
                }

                let mut next = None;
                for &idx in indices.iter().rev() {
                    match rows[idx].get(column) {
                        Some(v) => next = Some(v),
                        None if next.is_some() => {
                            rows[idx].set(column, next);
                            filled += 1;
                        }
                        None => unfilled += 1,
                    }
                }
            }

            report.filled.insert(column, filled);
            report.unfilled.insert(column, unfilled);
        }

        debug!(
            filled = report.total_filled(),
            unfilled = report.total_unfilled(),
            "Filled weather gaps"
        );

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rain(location: &str, value: Option<f64>) -> WeatherRow {
        let mut row = WeatherRow::builder(location).calm().build();
        row.rain_rate = value;
        row
    }

    #[test]
    fn test_forward_then_backward_fill() {
        let mut rows = vec![
            rain("Seattle", None),
            rain("Seattle", Some(1.0)),
            rain("Seattle", None),
            rain("Seattle", Some(3.0)),
            rain("Seattle", None),
        ];

        let report = GapFiller::new().fill(&mut rows);
        let values: Vec<Option<f64>> = rows.iter().map(|r| r.rain_rate).collect();

        assert_eq!(
            values,
            vec![Some(1.0), Some(1.0), Some(1.0), Some(3.0), Some(3.0)]
        );
        assert_eq!(report.filled[&WeatherColumn::RainRate], 3);
        assert_eq!(report.total_unfilled(), 0);
    }

    #[test]
    fn test_fill_does_not_cross_locations() {
        let mut rows = vec![
            rain("Seattle", Some(4.0)),
            rain("Miami", None),
            rain("Seattle", None),
            rain("Miami", Some(2.0)),
            rain("Denver", None),
        ];

        let report = GapFiller::new().fill(&mut rows);

        assert_eq!(rows[1].rain_rate, Some(2.0));
        assert_eq!(rows[2].rain_rate, Some(4.0));
        assert_eq!(rows[4].rain_rate, None);
        assert_eq!(report.unfilled[&WeatherColumn::RainRate], 1);
    }

    #[test]
    fn test_complete_rows_untouched() {
        let mut rows = vec![rain("London", Some(0.2)), rain("London", Some(0.4))];
        let original = rows.clone();
        let report = GapFiller::new().fill(&mut rows);

        assert_eq!(rows, original);
        assert_eq!(report.total_filled(), 0);
    }
}
