use rand::Rng;
use rayon::prelude::*;
use tracing::debug;

use crate::models::{SignalRecord, WeatherRow};
use crate::processors::attenuation::{attenuation, temporal_attenuation};
use crate::processors::location_bias::LocationBiasTable;
use crate::processors::noise::{MeasurementNoise, NoiseModel};
use crate::utils::constants::{
    DEFAULT_BASE_DBM, DEFAULT_RANDOM_SEED, MAX_SIGNAL_DBM, MIN_SIGNAL_DBM, QUANTIZATION_STEP_DB,
};
use crate::utils::rng::row_rng;

/// Clip to the receiver range and round to the nearest quantization step
/// (ties to even). NaN falls back to `fallback`.
pub fn clip_and_quantize(signal: f64, fallback: f64) -> f64 {
    if signal.is_nan() {
        return fallback;
    }

    let clipped = signal.clamp(MIN_SIGNAL_DBM, MAX_SIGNAL_DBM);
    let quantized = (clipped / QUANTIZATION_STEP_DB).round_ties_even() * QUANTIZATION_STEP_DB;

    if quantized.is_nan() {
        fallback
    } else {
        quantized
    }
}

/// Turns weather rows into received signal levels: base level minus the
/// attenuation model, plus measurement noise, clipped and quantized to the
/// receiver, then shifted by the site bias. Row `i` always draws from its own
/// random stream, so the output does not depend on evaluation order.
pub struct SignalSynthesizer<N: NoiseModel = MeasurementNoise> {
    base_dbm: f64,
    seed: u64,
    noise: N,
    bias_table: LocationBiasTable,
}

impl SignalSynthesizer<MeasurementNoise> {
    pub fn new(base_dbm: f64, seed: u64) -> Self {
        Self {
            base_dbm,
            seed,
            noise: MeasurementNoise::new(),
            bias_table: LocationBiasTable::default(),
        }
    }
}

impl Default for SignalSynthesizer<MeasurementNoise> {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_DBM, DEFAULT_RANDOM_SEED)
    }
}

impl<N: NoiseModel> SignalSynthesizer<N> {
    pub fn with_noise<M: NoiseModel>(self, noise: M) -> SignalSynthesizer<M> {
        SignalSynthesizer {
            base_dbm: self.base_dbm,
            seed: self.seed,
            noise,
            bias_table: self.bias_table,
        }
    }

    pub fn with_bias_table(mut self, bias_table: LocationBiasTable) -> Self {
        self.bias_table = bias_table;
        self
    }

    pub fn base_dbm(&self) -> f64 {
        self.base_dbm
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn bias_table(&self) -> &LocationBiasTable {
        &self.bias_table
    }

    /// Total path loss for a row, including the diurnal and seasonal terms
    /// taken from the row's own timestamp.
    pub fn total_attenuation(&self, row: &WeatherRow) -> f64 {
        attenuation(&row.conditions()) + temporal_attenuation(row.hour(), row.month())
    }

    /// Clipped and quantized signal before the location bias
    pub fn base_signal<R: Rng + ?Sized>(&self, row: &WeatherRow, rng: &mut R) -> f64 {
        let conditions = row.conditions();
        let noise = self.noise.sample(&conditions, rng);
        let signal = self.base_dbm - self.total_attenuation(row) + noise;
        clip_and_quantize(signal, self.base_dbm)
    }

    /// Final signal for a row: base signal plus location bias, kept within
    /// the receiver range and resolution.
    pub fn synthesize_row<R: Rng + ?Sized>(&self, row: &WeatherRow, rng: &mut R) -> f64 {
        let signal = self.base_signal(row, rng);
        match self.bias_table.sample(&row.location, rng) {
            Some(bias) => clip_and_quantize(signal + bias, self.base_dbm),
            None => signal,
        }
    }

    /// Synthesize row `index` of a table using that row's random stream
    pub fn synthesize_at(&self, index: usize, row: &WeatherRow) -> SignalRecord {
        let mut rng = row_rng(self.seed, index);
        let signal_dbm = self.synthesize_row(row, &mut rng);
        SignalRecord::new(row.clone(), signal_dbm)
    }

    /// Synthesize rows whose table positions start at `offset`
    pub fn synthesize_slice(
        &self,
        offset: usize,
        rows: &[WeatherRow],
        parallel: bool,
    ) -> Vec<SignalRecord> {
        if parallel {
            rows.par_iter()
                .enumerate()
                .map(|(i, row)| self.synthesize_at(offset + i, row))
                .collect()
        } else {
            rows.iter()
                .enumerate()
                .map(|(i, row)| self.synthesize_at(offset + i, row))
                .collect()
        }
    }

    pub fn synthesize(&self, rows: &[WeatherRow]) -> Vec<SignalRecord> {
        debug!(rows = rows.len(), seed = self.seed, "Synthesizing signal");
        self.synthesize_slice(0, rows, false)
    }

    /// Row-parallel synthesis on the current rayon pool; identical output to
    /// [`SignalSynthesizer::synthesize`].
    pub fn synthesize_parallel(&self, rows: &[WeatherRow]) -> Vec<SignalRecord> {
        debug!(rows = rows.len(), seed = self.seed, "Synthesizing signal in parallel");
        self.synthesize_slice(0, rows, true)
    }
}
