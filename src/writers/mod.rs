pub mod signal_writer;

pub use signal_writer::{OutputFileInfo, SignalWriter};
