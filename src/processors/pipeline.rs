use tracing::{debug, info};
use validator::Validate;

use crate::analyzers::{SignalAnalyzer, SignalStatistics};
use crate::config::SimulationConfig;
use crate::error::{Result, SimulationError};
use crate::models::{SignalRecord, WeatherRow};
use crate::processors::{DegradationReport, GapFillReport, GapFiller, SignalSynthesizer};
use crate::utils::progress::ProgressReporter;
use crate::utils::rng::{stream_rng, DEGRADATION_STREAM};

#[derive(Debug, Clone)]
pub struct SimulationOutput {
    pub records: Vec<SignalRecord>,
    pub gap_fill: Option<GapFillReport>,
    pub degradation: Option<DegradationReport>,
    pub statistics: SignalStatistics,
}

/// Location normalization, gap filling, quality degradation and signal synthesis over one table.
/// Every random draw derives from `random_seed`, so a run is reproducible
/// regardless of the worker count.
pub struct SimulationPipeline {
    config: SimulationConfig,
}

impl SimulationPipeline {
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn run(
        &self,
        rows: Vec<WeatherRow>,
        progress: Option<&ProgressReporter>,
    ) -> Result<SimulationOutput> {
        let mut rows = rows;
        info!(
            rows = rows.len(),
            seed = self.config.random_seed,
            base_dbm = self.config.base_dbm,
            "Starting signal simulation"
        );

        if self.config.normalize_locations {
            for row in rows.iter_mut() {
                row.location = row.safe_location();
            }
            debug!("Normalized location names");
        }

        let gap_fill = if self.config.fill_gaps {
            if let Some(p) = progress {
                p.set_message("Filling weather gaps...");
            }
            Some(GapFiller::new().fill(&mut rows))
        } else {
            None
        };

        let degradation = if self.config.degrade {
            if let Some(p) = progress {
                p.set_message("Injecting missing values and outliers...");
            }
            let degrader = self.config.degrader()?;
            let mut rng = stream_rng(self.config.random_seed, DEGRADATION_STREAM);
            let table = degrader.degrade(&rows, &mut rng);
            rows = table.rows;
            Some(table.report)
        } else {
            None
        };

        if let Some(p) = progress {
            p.set_length(rows.len() as u64);
            p.set_message("Synthesizing signal strength...");
        }
        let records = self.synthesize(&rows, progress)?;

        let statistics = SignalAnalyzer::new().analyze(&records);

        if let Some(p) = progress {
            p.finish_with_message(&format!("Simulated {} samples", records.len()));
        }
        info!(samples = records.len(), "Signal simulation complete");

        Ok(SimulationOutput {
            records,
            gap_fill,
            degradation,
            statistics,
        })
    }

    fn synthesize(
        &self,
        rows: &[WeatherRow],
        progress: Option<&ProgressReporter>,
    ) -> Result<Vec<SignalRecord>> {
        let synthesizer = self.config.synthesizer();

        if !self.config.parallel {
            return Ok(self.synthesize_chunks(&synthesizer, rows, false, progress));
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.max_workers)
            .build()
            .map_err(|e| SimulationError::InvalidParameter(e.to_string()))?;

        debug!(workers = self.config.max_workers, "Using rayon worker pool");
        Ok(pool.install(|| self.synthesize_chunks(&synthesizer, rows, true, progress)))
    }

    /// Process rows chunk by chunk so progress can be reported between chunks
    fn synthesize_chunks(
        &self,
        synthesizer: &SignalSynthesizer,
        rows: &[WeatherRow],
        parallel: bool,
        progress: Option<&ProgressReporter>,
    ) -> Vec<SignalRecord> {
        let chunk_size = self.config.chunk_size;
        let mut records = Vec::with_capacity(rows.len());

        for (chunk_idx, chunk) in rows.chunks(chunk_size).enumerate() {
            records.extend(synthesizer.synthesize_slice(chunk_idx * chunk_size, chunk, parallel));

            if let Some(p) = progress {
                p.increment(chunk.len() as u64);
            }
        }

        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::parse_timestamp;
    use chrono::Duration;

    fn hourly_table(n: usize) -> Vec<WeatherRow> {
        let start = parse_timestamp("2024-07-01T00:00").unwrap();
        let locations = ["Seattle", "Miami", "Phoenix", "Denver", "London", "Nairobi"];
        (0..n)
            .map(|i| {
                let f = i as f64;
                WeatherRow::builder(locations[i % locations.len()])
                    .timestamp(start + Duration::hours((i / locations.len()) as i64))
                    .rain_rate((f * 0.13) % 12.0)
                    .humidity(35.0 + (f * 3.1) % 60.0)
                    .cloudcover((f * 11.0) % 100.0)
                    .wind_speed((f * 0.7) % 20.0)
                    .pressure(1000.0 + (f * 0.3) % 25.0)
                    .temperature(10.0 + (f * 0.4) % 25.0)
                    .build()
            })
            .collect()
    }

    fn config(parallel: bool) -> SimulationConfig {
        SimulationConfig {
            parallel,
            max_workers: 4,
            chunk_size: 128,
            ..SimulationConfig::default()
        }
    }

    #[test]
    fn test_pipeline_is_reproducible() {
        let pipeline = SimulationPipeline::new(config(false)).unwrap();
        let a = pipeline.run(hourly_table(1000), None).unwrap();
        let b = pipeline.run(hourly_table(1000), None).unwrap();

        assert_eq!(a.records, b.records);
        assert_eq!(a.degradation, b.degradation);
    }

    #[test]
    fn test_parallel_run_matches_sequential() {
        let sequential = SimulationPipeline::new(config(false))
            .unwrap()
            .run(hourly_table(3000), None)
            .unwrap();
        let parallel = SimulationPipeline::new(config(true))
            .unwrap()
            .run(hourly_table(3000), None)
            .unwrap();

        assert_eq!(sequential.records, parallel.records);
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = SimulationPipeline::new(config(false))
            .unwrap()
            .run(hourly_table(500), None)
            .unwrap();
        let b = SimulationPipeline::new(SimulationConfig {
            random_seed: 43,
            ..config(false)
        })
        .unwrap()
        .run(hourly_table(500), None)
        .unwrap();

        assert_ne!(a.records, b.records);
    }

    #[test]
    fn test_pipeline_degrades_with_configured_rates() {
        let output = SimulationPipeline::new(config(false))
            .unwrap()
            .run(hourly_table(2000), None)
            .unwrap();

        let report = output.degradation.unwrap();
        // floor(2000 * 0.015)
        assert_eq!(report.outliers.len(), 30);
        assert_eq!(report.total_rows, 2000);
        assert!(output.gap_fill.is_none());
    }

    #[test]
    fn test_output_rows_are_in_range() {
        let output = SimulationPipeline::new(config(true))
            .unwrap()
            .run(hourly_table(2500), None)
            .unwrap();

        assert_eq!(output.records.len(), 2500);
        assert_eq!(output.statistics.overall.count, 2500);
        for record in &output.records {
            assert!(record.is_within_receiver_range());
            assert!(record.is_quantized());
        }
    }

    #[test]
    fn test_without_degradation_input_passes_through() {
        let rows = hourly_table(100);
        let output = SimulationPipeline::new(SimulationConfig {
            degrade: false,
            ..config(false)
        })
        .unwrap()
        .run(rows.clone(), None)
        .unwrap();

        assert!(output.degradation.is_none());
        let weather: Vec<WeatherRow> = output.records.into_iter().map(|r| r.weather).collect();
        assert_eq!(weather, rows);
    }

    #[test]
    fn test_gap_fill_runs_before_degradation() {
        let mut rows = hourly_table(60);
        rows[6].rain_rate = None;

        let output = SimulationPipeline::new(SimulationConfig {
            fill_gaps: true,
            degrade: false,
            ..config(false)
        })
        .unwrap()
        .run(rows, None)
        .unwrap();

        assert_eq!(output.gap_fill.unwrap().total_filled(), 1);
        assert!(output.records[6].weather.rain_rate.is_some());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = SimulationPipeline::new(SimulationConfig {
            missing_rate: 2.0,
            ..SimulationConfig::default()
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_table() {
        let output = SimulationPipeline::new(config(true))
            .unwrap()
            .run(Vec::new(), None)
            .unwrap();
        assert!(output.records.is_empty());
        assert_eq!(output.statistics.overall.mean, None);
    }

    #[test]
    fn test_location_normalization_is_optional() {
        let rows = vec![WeatherRow::builder("Seattle, WA").calm().build()];

        let untouched = SimulationPipeline::new(SimulationConfig {
            degrade: false,
            ..config(false)
        })
        .unwrap()
        .run(rows.clone(), None)
        .unwrap();
        assert_eq!(untouched.records[0].location(), "Seattle, WA");

        let normalized = SimulationPipeline::new(SimulationConfig {
            degrade: false,
            normalize_locations: true,
            ..config(false)
        })
        .unwrap()
        .run(rows, None)
        .unwrap();
        assert_eq!(normalized.records[0].location(), "Seattle__WA");

        // the bias lookup still matches the normalized name
        assert_eq!(untouched.records[0].signal_dbm, normalized.records[0].signal_dbm);
    }
}
