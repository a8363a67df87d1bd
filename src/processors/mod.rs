pub mod attenuation;
pub mod degradation;
pub mod gap_filler;
pub mod location_bias;
pub mod noise;
pub mod pipeline;
pub mod quality_checker;
pub mod synthesizer;

pub use attenuation::{attenuation, temporal_attenuation, AttenuationBreakdown};
pub use degradation::{DegradationReport, DegradedTable, OutlierInjection, QualityDegrader};
pub use gap_filler::{GapFillReport, GapFiller};
pub use location_bias::{LocationBias, LocationBiasTable};
pub use noise::{MeasurementNoise, NoNoise, NoiseBreakdown, NoiseModel};
pub use pipeline::{SimulationOutput, SimulationPipeline};
pub use quality_checker::{LocationStatistics, QualityChecker, QualityReport, RangeViolation};
pub use synthesizer::{clip_and_quantize, SignalSynthesizer};
