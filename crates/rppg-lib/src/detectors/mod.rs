pub mod ppg;

pub use ppg::{detect_peaks, extract_envelope, peak_threshold, Envelope, EnvelopeConfig};
