pub mod constants;
pub mod progress;
pub mod rng;

pub use constants::*;
pub use progress::ProgressReporter;
pub use rng::{row_rng, stream_rng};
