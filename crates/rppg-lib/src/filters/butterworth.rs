use super::ensure_longer_than;
use crate::error::{ProcessError, Result};
use sci_rs::signal::filter::{
    design::{butter_dyn, DigitalFilter, FilterBandType, FilterOutputType, Sos, SosFormatFilter},
    sosfiltfilt_dyn,
};
use serde::{Deserialize, Serialize};

/// Highpass + lowpass Butterworth cascade parameters.
///
/// `sampling_rate` is the rate the cutoffs are expressed against. The pulse
/// pipeline derives it from the frame rate with a scale factor, so it is
/// generally not the frame rate itself.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub order: usize,
    /// Highpass corner (baseline wander removal).
    pub cutoff_high: f64,
    /// Lowpass corner (noise removal).
    pub cutoff_low: f64,
    pub sampling_rate: f64,
}

impl FilterSpec {
    pub fn validate(&self) -> Result<()> {
        if self.order == 0 {
            return Err(ProcessError::InvalidFilterSpec(
                "order must be at least 1".into(),
            ));
        }
        if !(self.sampling_rate.is_finite() && self.sampling_rate > 0.0) {
            return Err(ProcessError::InvalidFilterSpec(format!(
                "sampling rate {} is not positive",
                self.sampling_rate
            )));
        }
        let nyquist = 0.5 * self.sampling_rate;
        for (name, cutoff) in [("highpass", self.cutoff_high), ("lowpass", self.cutoff_low)] {
            if !(cutoff > 0.0 && cutoff < nyquist) {
                return Err(ProcessError::InvalidFilterSpec(format!(
                    "{name} cutoff {cutoff} must lie in (0, {nyquist})"
                )));
            }
        }
        Ok(())
    }
}

/// Edge padding applied by zero-phase filtering with an `order` design.
pub fn padding_len(order: usize) -> usize {
    3 * (order + 1)
}

/// Digital Butterworth design as second-order sections.
fn design(order: usize, cutoff: f64, fs: f64, band: FilterBandType) -> Result<Vec<Sos<f64>>> {
    let filter = butter_dyn(
        order,
        vec![cutoff],
        Some(band),
        Some(false),
        Some(FilterOutputType::Sos),
        Some(fs),
    );
    match filter {
        DigitalFilter::Sos(SosFormatFilter { sos }) => Ok(sos),
        _ => Err(ProcessError::InvalidFilterSpec(
            "butterworth design did not yield second-order sections".into(),
        )),
    }
}

fn zero_phase(data: &[f64], order: usize, sos: &[Sos<f64>]) -> Result<Vec<f64>> {
    ensure_longer_than(data, padding_len(order))?;
    Ok(sosfiltfilt_dyn(data.iter(), sos))
}

/// Zero-phase Butterworth highpass. The caller validates the corner.
pub fn highpass(data: &[f64], order: usize, cutoff: f64, fs: f64) -> Result<Vec<f64>> {
    let sos = design(order, cutoff, fs, FilterBandType::Highpass)?;
    zero_phase(data, order, &sos)
}

/// Zero-phase Butterworth lowpass. The caller validates the corner.
pub fn lowpass(data: &[f64], order: usize, cutoff: f64, fs: f64) -> Result<Vec<f64>> {
    let sos = design(order, cutoff, fs, FilterBandType::Lowpass)?;
    zero_phase(data, order, &sos)
}

/// Zero-phase highpass followed by zero-phase lowpass.
pub fn bandpass(data: &[f64], spec: &FilterSpec) -> Result<Vec<f64>> {
    spec.validate()?;
    let highpassed = highpass(data, spec.order, spec.cutoff_high, spec.sampling_rate)?;
    lowpass(&highpassed, spec.order, spec.cutoff_low, spec.sampling_rate)
}
