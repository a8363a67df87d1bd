use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::SignalRecord;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SignalStats {
    pub count: usize,
    pub missing: usize,
    pub mean: Option<f64>,
    pub std_dev: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl SignalStats {
    pub fn from_values<I: IntoIterator<Item = f64>>(values: I) -> Self {
        let mut finite = Vec::new();
        let mut missing = 0;
        for v in values {
            if v.is_finite() {
                finite.push(v);
            } else {
                missing += 1;
            }
        }

        let count = finite.len();
        if count == 0 {
            return Self {
                missing,
                ..Self::default()
            };
        }

        let n = count as f64;
        let mean = finite.iter().sum::<f64>() / n;
        // sample standard deviation; undefined for a single value
        let std_dev = (count > 1).then(|| {
            (finite.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
        });

        Self {
            count,
            missing,
            mean: Some(mean),
            std_dev,
            min: finite.iter().copied().reduce(f64::min),
            max: finite.iter().copied().reduce(f64::max),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SignalStatistics {
    pub total_records: usize,
    pub overall: SignalStats,
    pub by_location: BTreeMap<String, SignalStats>,
}

fn fmt_db(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.2} dBm", v))
}

impl SignalStatistics {
    pub fn summary(&self) -> String {
        let mut summary = String::new();
        summary.push_str("Signal Strength Statistics:\n");
        summary.push_str(&format!("  Records: {}\n", self.total_records));
        summary.push_str(&format!("  Mean: {}\n", fmt_db(self.overall.mean)));
        summary.push_str(&format!(
            "  Std:  {}\n",
            self.overall
                .std_dev
                .map_or_else(|| "n/a".to_string(), |v| format!("{:.2} dB", v))
        ));
        summary.push_str(&format!("  Min:  {}\n", fmt_db(self.overall.min)));
        summary.push_str(&format!("  Max:  {}\n", fmt_db(self.overall.max)));
        summary.push_str(&format!("  Missing values: {}\n", self.overall.missing));
        summary
    }

    pub fn detailed_summary(&self) -> String {
        let mut summary = self.summary();
        if self.by_location.is_empty() {
            return summary;
        }

        summary.push_str("\nBy Location:\n");
        for (location, stats) in &self.by_location {
            summary.push_str(&format!(
                "  {:<20} n={:<6} mean={} min={} max={}\n",
                location,
                stats.count,
                fmt_db(stats.mean),
                fmt_db(stats.min),
                fmt_db(stats.max)
            ));
        }
        summary
    }
}

pub struct SignalAnalyzer;

impl SignalAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, records: &[SignalRecord]) -> SignalStatistics {
        let mut grouped: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        for record in records {
            grouped
                .entry(record.location().to_string())
                .or_default()
                .push(record.signal_dbm);
        }

        SignalStatistics {
            total_records: records.len(),
            overall: SignalStats::from_values(records.iter().map(|r| r.signal_dbm)),
            by_location: grouped
                .into_iter()
                .map(|(location, values)| (location, SignalStats::from_values(values)))
                .collect(),
        }
    }
}

impl Default for SignalAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
