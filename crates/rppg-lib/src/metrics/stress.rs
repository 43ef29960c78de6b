//! Stress index estimation through a pluggable HRV analyzer.
//!
//! The pipeline only owns the pulse-train construction and the
//! present-or-absent propagation of the analyzer's answer. Which index is
//! produced, and how, is up to the [`HrvAnalyzer`] implementation.

use crate::signal::{Events, RRSeries};
use log::{debug, warn};
use std::collections::BTreeMap;
use thiserror::Error;

/// Metric name the built-in analyzer reports its stress index under.
pub const STRESS_INDEX_METRIC: &str = "HRV_SI";

#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("not enough beats for HRV analysis ({0})")]
    InsufficientBeats(usize),
    #[error("invalid sampling rate {0}")]
    InvalidSamplingRate(f64),
    #[error("{0}")]
    Other(String),
}

/// Named metrics returned by an analyzer.
pub type HrvReport = BTreeMap<String, f64>;

/// External HRV-analysis capability.
pub trait HrvAnalyzer: Send + Sync {
    /// Analyse a binary pulse train (ones at beats) sampled at `sampling_rate` Hz.
    fn analyze(
        &self,
        pulse_train: &[f64],
        sampling_rate: f64,
    ) -> Result<HrvReport, AnalyzerError>;

    fn name(&self) -> &str;
}

/// Baevsky stress index from the RR histogram.
///
/// `SI = AMo / (2 * Mo * MxDMn)` with `AMo` the share (%) of intervals in the
/// modal bin, `Mo` the modal bin centre (s) and `MxDMn` the interval range (s).
#[derive(Debug, Clone, Copy)]
pub struct BaevskyAnalyzer {
    pub bin_ms: f64,
}

impl Default for BaevskyAnalyzer {
    fn default() -> Self {
        Self { bin_ms: 50.0 }
    }
}

impl BaevskyAnalyzer {
    fn stress_index(&self, rr_ms: &[f64]) -> Option<f64> {
        if rr_ms.len() < 2 {
            return None;
        }
        let min = rr_ms.iter().copied().fold(f64::INFINITY, f64::min);
        let max = rr_ms.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let range_s = (max - min) / 1000.0;
        if range_s <= 0.0 {
            return None;
        }
        let mut bins: BTreeMap<i64, usize> = BTreeMap::new();
        for &v in rr_ms {
            *bins.entry((v / self.bin_ms).floor() as i64).or_default() += 1;
        }
        // Ties resolve to the shortest-interval bin.
        let (mode_bin, mode_count) = bins
            .iter()
            .fold((0i64, 0usize), |best, (&bin, &count)| {
                if count > best.1 {
                    (bin, count)
                } else {
                    best
                }
            });
        let mo_s = (mode_bin as f64 + 0.5) * self.bin_ms / 1000.0;
        let amo = 100.0 * mode_count as f64 / rr_ms.len() as f64;
        Some(amo / (2.0 * mo_s * range_s))
    }
}

impl HrvAnalyzer for BaevskyAnalyzer {
    fn analyze(
        &self,
        pulse_train: &[f64],
        sampling_rate: f64,
    ) -> Result<HrvReport, AnalyzerError> {
        if !(sampling_rate.is_finite() && sampling_rate > 0.0) {
            return Err(AnalyzerError::InvalidSamplingRate(sampling_rate));
        }
        let beats = Events::from_pulse_train(pulse_train);
        if beats.len() < 2 {
            return Err(AnalyzerError::InsufficientBeats(beats.len()));
        }
        let rr = RRSeries::from_events(&beats, sampling_rate)
            .map_err(|e| AnalyzerError::Other(e.to_string()))?;
        let rr_ms = rr.to_millis();

        let mut report = HrvReport::new();
        if let Some(mean) = rr.mean() {
            report.insert("HRV_MeanNN".into(), mean * 1000.0);
        }
        if let Some(si) = self.stress_index(&rr_ms) {
            report.insert(STRESS_INDEX_METRIC.into(), si);
        }
        Ok(report)
    }

    fn name(&self) -> &str {
        "baevsky"
    }
}

/// Builds the pulse train and reads one metric from the analyzer.
pub struct StressEstimator<'a> {
    analyzer: &'a dyn HrvAnalyzer,
    metric: &'a str,
}

impl<'a> StressEstimator<'a> {
    pub fn new(analyzer: &'a dyn HrvAnalyzer, metric: &'a str) -> Self {
        Self { analyzer, metric }
    }

    /// Stress index for `peaks`, or `None` when the analyzer cannot supply
    /// a finite value. Never fails.
    pub fn estimate(&self, peaks: &Events, sampling_rate: f64) -> Option<f64> {
        let train = peaks.to_pulse_train();
        if train.is_empty() {
            return None;
        }
        match self.analyzer.analyze(&train, sampling_rate) {
            Ok(report) => {
                let value = report.get(self.metric).copied().filter(|v| v.is_finite());
                if value.is_none() {
                    debug!(
                        "analyzer '{}' reported no usable '{}'",
                        self.analyzer.name(),
                        self.metric
                    );
                }
                value
            }
            Err(err) => {
                warn!(
                    "analyzer '{}' failed, stress score omitted: {}",
                    self.analyzer.name(),
                    err
                );
                None
            }
        }
    }
}
