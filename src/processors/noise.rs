use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

use crate::models::WeatherConditions;

/// Zero-mean Gaussian sample with the given standard deviation
pub fn gaussian<R: Rng + ?Sized>(rng: &mut R, std_dev: f64) -> f64 {
    let z: f64 = StandardNormal.sample(rng);
    z * std_dev
}

/// Source of additive measurement noise in dB.
///
/// Implementations must draw from `rng` in a fixed order so a seeded
/// generator reproduces the same sequence.
pub trait NoiseModel: Send + Sync {
    fn sample<R: Rng + ?Sized>(&self, conditions: &WeatherConditions, rng: &mut R) -> f64;
}

/// Per-source noise contributions for one sample.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NoiseBreakdown {
    pub equipment: f64,
    pub atmospheric: f64,
    pub interference: f64,
    pub multipath: f64,
}

impl NoiseBreakdown {
    pub fn total(&self) -> f64 {
        self.equipment + self.atmospheric + self.interference + self.multipath
    }
}

/// Receiver noise: thermal, scintillation, interference events and multipath.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementNoise {
    pub equipment_std: f64,
    pub scintillation_std: f64,
    pub interference_probability: f64,
    pub interference_range: (f64, f64),
    pub ducting_std: f64,
    pub multipath_std: f64,
}

impl MeasurementNoise {
    pub fn new() -> Self {
        Self {
            equipment_std: 1.5,
            scintillation_std: 0.8,
            interference_probability: 0.05,
            interference_range: (-5.0, -2.0),
            ducting_std: 2.0,
            multipath_std: 0.5,
        }
    }

    /// Scintillation grows with rain rate and wind speed
    pub fn scintillation_factor(conditions: &WeatherConditions) -> f64 {
        (1.0 + conditions.rain_rate * 0.2 + conditions.wind_speed * 0.1).max(0.0)
    }

    /// High humidity with high temperature causes atmospheric ducting
    pub fn is_ducting(conditions: &WeatherConditions) -> bool {
        conditions.humidity > 80.0 && conditions.temperature > 25.0
    }

    pub fn sample_components<R: Rng + ?Sized>(
        &self,
        conditions: &WeatherConditions,
        rng: &mut R,
    ) -> NoiseBreakdown {
        let equipment = gaussian(rng, self.equipment_std);

        let atmospheric = gaussian(
            rng,
            self.scintillation_std * Self::scintillation_factor(conditions),
        );

        let interference = if rng.gen::<f64>() < self.interference_probability {
            let (low, high) = self.interference_range;
            rng.gen_range(low..high)
        } else {
            0.0
        };

        let multipath_std = if Self::is_ducting(conditions) {
            self.ducting_std
        } else {
            self.multipath_std
        };
        let multipath = gaussian(rng, multipath_std);

        NoiseBreakdown {
            equipment,
            atmospheric,
            interference,
            multipath,
        }
    }
}

impl Default for MeasurementNoise {
    fn default() -> Self {
        Self::new()
    }
}

impl NoiseModel for MeasurementNoise {
    fn sample<R: Rng + ?Sized>(&self, conditions: &WeatherConditions, rng: &mut R) -> f64 {
        self.sample_components(conditions, rng).total()
    }
}

/// Noise-free receiver, useful for isolating the attenuation model.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoNoise;

impl NoiseModel for NoNoise {
    fn sample<R: Rng + ?Sized>(&self, _conditions: &WeatherConditions, _rng: &mut R) -> f64 {
        0.0
    }
}
