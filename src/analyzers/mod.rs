pub mod signal_analyzer;

pub use signal_analyzer::{SignalAnalyzer, SignalStatistics, SignalStats};
