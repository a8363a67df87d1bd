use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Stream reserved for the quality degradation stage
pub const DEGRADATION_STREAM: u64 = 0;

/// Independent ChaCha8 stream of a seed. Streams never overlap, so each
/// stage or row can draw without coordinating with the others.
pub fn stream_rng(seed: u64, stream: u64) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(stream);
    rng
}

/// Generator for row `index` of a synthesis run
pub fn row_rng(seed: u64, index: usize) -> ChaCha8Rng {
    stream_rng(seed, DEGRADATION_STREAM + 1 + index as u64)
}
