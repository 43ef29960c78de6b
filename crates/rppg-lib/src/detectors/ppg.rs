use crate::{
    error::Result,
    filters::MovingAverage,
    signal::Events,
};
use serde::{Deserialize, Serialize};

/// Parameters for envelope extraction and peak picking.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvelopeConfig {
    /// Moving-average length (samples) applied to the squared signal.
    pub window: usize,
    /// Threshold sits at `min + (max - min) / threshold_divisor`.
    pub threshold_divisor: f64,
    /// Also compute the causal moving average for inspection.
    pub causal_diagnostic: bool,
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        Self {
            window: 7,
            threshold_divisor: 16.0,
            causal_diagnostic: false,
        }
    }
}

/// Pulse envelope of a band-passed signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Zero-phase smoothed energy; the only input to peak detection.
    pub smoothed: Vec<f64>,
    /// Forward-only smoothing, present when requested. Lags `smoothed`.
    pub causal: Option<Vec<f64>>,
}

fn square(data: &[f64]) -> Vec<f64> {
    data.iter().map(|x| x * x).collect()
}

/// Rectify by squaring, then smooth without lag.
pub fn extract_envelope(filtered: &[f64], cfg: &EnvelopeConfig) -> Result<Envelope> {
    let squared = square(filtered);
    let ma = MovingAverage::new(cfg.window);
    let smoothed = ma.zero_phase(&squared)?;
    let causal = cfg.causal_diagnostic.then(|| ma.causal(&squared));
    Ok(Envelope { smoothed, causal })
}

/// Amplitude threshold relative to the envelope's own range.
pub fn peak_threshold(envelope: &[f64], divisor: f64) -> Option<f64> {
    let (min, max) = envelope
        .iter()
        .fold(None, |acc: Option<(f64, f64)>, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })?;
    Some(min + (max - min) / divisor)
}

/// Strict local maxima at or above the adaptive threshold, ascending.
pub fn detect_peaks(envelope: &[f64], cfg: &EnvelopeConfig) -> Events {
    if envelope.len() < 3 {
        return Events::from_indices(Vec::new());
    }
    let Some(threshold) = peak_threshold(envelope, cfg.threshold_divisor) else {
        return Events::from_indices(Vec::new());
    };
    let peaks = envelope
        .windows(3)
        .enumerate()
        .filter(|(_, w)| w[1] > w[0] && w[1] > w[2] && w[1] >= threshold)
        .map(|(i, _)| i + 1)
        .collect();
    Events::from_indices(peaks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_preserves_length() {
        let data: Vec<f64> = (0..120).map(|i| (i as f64 * 0.3).sin()).collect();
        let env = extract_envelope(&data, &EnvelopeConfig::default()).unwrap();
        assert_eq!(env.smoothed.len(), data.len());
        assert!(env.causal.is_none());
        assert!(env.smoothed.iter().all(|v| v.is_finite()));
        assert!(env.smoothed[60] > 0.0);
    }

    #[test]
    fn causal_diagnostic_is_opt_in() {
        let data: Vec<f64> = (0..60).map(|i| (i as f64 * 0.5).cos()).collect();
        let cfg = EnvelopeConfig {
            causal_diagnostic: true,
            ..EnvelopeConfig::default()
        };
        let env = extract_envelope(&data, &cfg).unwrap();
        let causal = env.causal.expect("causal envelope requested");
        assert_eq!(causal.len(), data.len());
        // From rest the first causal output only sees one squared sample.
        assert!((causal[0] - data[0] * data[0] / 7.0).abs() < 1e-12);
    }

    #[test]
    fn threshold_boundary_is_inclusive() {
        // min 0, max 16, divisor 16 => threshold exactly 1.0
        let envelope = [0.0, 16.0, 0.0, 1.0, 0.0, 0.9375, 0.0];
        let peaks = detect_peaks(&envelope, &EnvelopeConfig::default());
        assert_eq!(peaks.indices, vec![1, 3]);
    }

    #[test]
    fn plateaus_and_edges_are_not_peaks() {
        let envelope = [5.0, 1.0, 4.0, 4.0, 1.0, 3.0, 1.0, 6.0];
        let peaks = detect_peaks(&envelope, &EnvelopeConfig::default());
        assert_eq!(peaks.indices, vec![5]);
    }

    #[test]
    fn flat_envelope_has_no_peaks() {
        let peaks = detect_peaks(&[0.0; 50], &EnvelopeConfig::default());
        assert!(peaks.is_empty());
        assert!(detect_peaks(&[1.0, 2.0], &EnvelopeConfig::default()).is_empty());
    }
}
