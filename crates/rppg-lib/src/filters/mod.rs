//! Filtering stages of the pulse pipeline.
//!
//! The Butterworth band-pass is designed and applied as second-order
//! sections through `sci_rs`. The envelope moving average is a short FIR
//! filtered here directly.

pub mod butterworth;
pub mod moving_average;

pub use butterworth::{bandpass, highpass, lowpass, padding_len, FilterSpec};
pub use moving_average::MovingAverage;

use crate::error::{ProcessError, Result};

/// Zero-phase filtering pads `pad` samples on each side by odd reflection,
/// which needs strictly more than `pad` input samples.
fn ensure_longer_than(data: &[f64], pad: usize) -> Result<()> {
    if data.len() <= pad {
        return Err(ProcessError::SignalTooShort {
            len: data.len(),
            required: pad + 1,
        });
    }
    Ok(())
}
