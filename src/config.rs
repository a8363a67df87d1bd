use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;
use validator::Validate;

use crate::error::Result;
use crate::processors::{LocationBiasTable, QualityDegrader, SignalSynthesizer};
use crate::utils::constants::*;

/// Simulation settings, layered from defaults, an optional config file and
/// `SIGNAL_SIM_*` environment variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct SimulationConfig {
    #[validate(range(min = -120.0, max = -40.0))]
    pub base_dbm: f64,

    #[validate(range(min = 0.0, exclusive_max = 1.0))]
    pub missing_rate: f64,

    #[validate(range(min = 0.0, exclusive_max = 1.0))]
    pub outlier_rate: f64,

    pub random_seed: u64,

    #[validate(range(min = 0.0))]
    pub bias_noise_std: f64,

    /// Run the quality degradation stage before synthesis
    pub degrade: bool,

    /// Forward/backward fill nulls per location before degradation
    pub fill_gaps: bool,

    /// Replace characters outside `[A-Za-z0-9_.-]` in location names with `_`
    pub normalize_locations: bool,

    pub parallel: bool,

    #[validate(range(min = 1))]
    pub max_workers: usize,

    #[validate(range(min = 1))]
    pub chunk_size: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            base_dbm: DEFAULT_BASE_DBM,
            missing_rate: PIPELINE_MISSING_RATE,
            outlier_rate: PIPELINE_OUTLIER_RATE,
            random_seed: DEFAULT_RANDOM_SEED,
            bias_noise_std: DEFAULT_BIAS_NOISE_STD,
            degrade: true,
            fill_gaps: false,
            normalize_locations: false,
            parallel: true,
            max_workers: num_cpus::get(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl SimulationConfig {
    /// Load defaults, then `path` (TOML, YAML or JSON by extension) if given,
    /// then environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            debug!(path = %path.display(), "Loading configuration file");
            builder = builder.add_source(File::from(path));
        }

        let settings = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        let config: SimulationConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn degrader(&self) -> Result<QualityDegrader> {
        QualityDegrader::new(self.missing_rate, self.outlier_rate)
    }

    pub fn synthesizer(&self) -> SignalSynthesizer {
        SignalSynthesizer::new(self.base_dbm, self.random_seed)
            .with_bias_table(LocationBiasTable::default().with_noise_std(self.bias_noise_std))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::Builder;

    // Tests that read the process environment must not overlap
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_defaults_are_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.base_dbm, -70.0);
        assert_eq!(config.missing_rate, 0.02);
        assert_eq!(config.outlier_rate, 0.015);
        assert_eq!(config.random_seed, 42);
    }

    #[test]
    fn test_rates_must_be_below_one() {
        let config = SimulationConfig {
            missing_rate: 1.0,
            ..SimulationConfig::default()
        };
        assert!(config.validate().is_err());

        let config = SimulationConfig {
            outlier_rate: -0.1,
            ..SimulationConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_base_level_within_receiver_range() {
        let config = SimulationConfig {
            base_dbm: -30.0,
            ..SimulationConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_toml_file() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "base_dbm = -65.0").unwrap();
        writeln!(file, "random_seed = 7").unwrap();
        writeln!(file, "missing_rate = 0.1").unwrap();
        writeln!(file, "parallel = false").unwrap();
        file.flush().unwrap();

        let config = SimulationConfig::load(Some(file.path())).unwrap();
        assert_eq!(
            config,
            SimulationConfig {
                base_dbm: -65.0,
                random_seed: 7,
                missing_rate: 0.1,
                parallel: false,
                ..SimulationConfig::default()
            }
        );
    }

    #[test]
    fn test_load_rejects_invalid_file_values() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "outlier_rate = 1.5").unwrap();
        file.flush().unwrap();

        assert!(SimulationConfig::load(Some(file.path())).is_err());
    }

    #[test]
    fn test_environment_overrides_defaults_and_file() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "random_seed = 7").unwrap();
        writeln!(file, "base_dbm = -65.0").unwrap();
        file.flush().unwrap();

        std::env::set_var("SIGNAL_SIM_RANDOM_SEED", "99");
        let from_env = SimulationConfig::load(None);
        let from_file_and_env = SimulationConfig::load(Some(file.path()));
        std::env::remove_var("SIGNAL_SIM_RANDOM_SEED");

        assert_eq!(from_env.unwrap().random_seed, 99);
        let layered = from_file_and_env.unwrap();
        assert_eq!(layered.random_seed, 99);
        assert_eq!(layered.base_dbm, -65.0);

        assert_eq!(SimulationConfig::load(None).unwrap().random_seed, 42);
    }

    #[test]
    fn test_builds_components() {
        let config = SimulationConfig {
            base_dbm: -60.0,
            random_seed: 9,
            bias_noise_std: 0.0,
            ..SimulationConfig::default()
        };
        let synth = config.synthesizer();
        assert_eq!(synth.base_dbm(), -60.0);
        assert_eq!(synth.seed(), 9);
        assert_eq!(synth.bias_table().noise_std(), 0.0);

        let degrader = config.degrader().unwrap();
        assert_eq!(degrader.missing_rate(), 0.02);
    }
}
