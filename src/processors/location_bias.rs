use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::processors::noise::gaussian;
use crate::utils::constants::DEFAULT_BIAS_NOISE_STD;

/// Site-specific offset applied to every sample whose location contains `pattern`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationBias {
    pub pattern: String,
    pub bias_db: f64,
}

impl LocationBias {
    pub fn new(pattern: impl Into<String>, bias_db: f64) -> Self {
        Self {
            pattern: pattern.into().to_lowercase(),
            bias_db,
        }
    }

    /// Case-insensitive substring match
    pub fn matches(&self, location: &str) -> bool {
        location.to_lowercase().contains(&self.pattern)
    }
}

/// Ordered bias table; the first matching entry wins.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationBiasTable {
    entries: Vec<LocationBias>,
    noise_std: f64,
}

impl LocationBiasTable {
    pub fn new(entries: Vec<LocationBias>, noise_std: f64) -> Self {
        Self { entries, noise_std }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), DEFAULT_BIAS_NOISE_STD)
    }

    pub fn with_noise_std(mut self, noise_std: f64) -> Self {
        self.noise_std = noise_std;
        self
    }

    pub fn entries(&self) -> &[LocationBias] {
        &self.entries
    }

    pub fn noise_std(&self) -> f64 {
        self.noise_std
    }

    pub fn lookup(&self, location: &str) -> Option<&LocationBias> {
        let lowered = location.to_lowercase();
        self.entries.iter().find(|e| lowered.contains(&e.pattern))
    }

    /// Bias plus jitter for `location`, or `None` when no entry matches.
    /// The jitter is drawn only for matched locations.
    pub fn sample<R: Rng + ?Sized>(&self, location: &str, rng: &mut R) -> Option<f64> {
        self.lookup(location)
            .map(|entry| entry.bias_db + gaussian(rng, self.noise_std))
    }
}

impl Default for LocationBiasTable {
    fn default() -> Self {
        Self::new(
            vec![
                LocationBias::new("seattle", -1.8), // urban, frequent precipitation
                LocationBias::new("miami", 0.3),    // coastal ducting
                LocationBias::new("phoenix", -0.5), // heat on equipment
                LocationBias::new("denver", -2.2),  // altitude
                LocationBias::new("london", -1.4),  // urban, overcast
            ],
            DEFAULT_BIAS_NOISE_STD,
        )
    }
}
