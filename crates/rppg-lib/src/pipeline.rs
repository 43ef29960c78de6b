//! End-to-end pulse estimation: colour trace to BPM, HRV and stress index.

use crate::{
    config::PipelineConfig,
    deadline::Deadline,
    detectors::{detect_peaks, extract_envelope, Envelope},
    error::{ProcessError, Result},
    filters::bandpass,
    metrics::{hrv_time, BaevskyAnalyzer, HrvAnalyzer, HrvMetrics, StressEstimator},
    sampler::{FrameSampler, FrameSource},
    signal::{Events, RRSeries, TimeSeries},
};
use log::debug;
use serde::{Deserialize, Serialize};

/// Beat-derived quantities for a recording with at least two peaks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub envelope: Envelope,
    pub peaks: Events,
    pub rr: RRSeries,
    pub bpm: f64,
    pub hrv: HrvMetrics,
    pub stress_score: Option<f64>,
}

/// Outcome of a successful invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Analysis {
    Measured(Measurement),
    /// Fewer than two peaks: nothing to measure intervals from.
    Degenerate { envelope: Envelope, peaks: Events },
}

impl Analysis {
    pub fn envelope(&self) -> &Envelope {
        match self {
            Analysis::Measured(m) => &m.envelope,
            Analysis::Degenerate { envelope, .. } => envelope,
        }
    }

    pub fn peaks(&self) -> &Events {
        match self {
            Analysis::Measured(m) => &m.peaks,
            Analysis::Degenerate { peaks, .. } => peaks,
        }
    }

    pub fn bpm(&self) -> f64 {
        match self {
            Analysis::Measured(m) => m.bpm,
            Analysis::Degenerate { .. } => 0.0,
        }
    }

    pub fn hrv(&self) -> HrvMetrics {
        match self {
            Analysis::Measured(m) => m.hrv,
            Analysis::Degenerate { .. } => HrvMetrics::default(),
        }
    }

    pub fn stress_score(&self) -> Option<f64> {
        match self {
            Analysis::Measured(m) => m.stress_score,
            Analysis::Degenerate { .. } => None,
        }
    }

    pub fn is_degenerate(&self) -> bool {
        matches!(self, Analysis::Degenerate { .. })
    }
}

/// Read-only configuration plus the stress analyzer. Each call builds its
/// own buffers, so one pipeline can serve any number of requests.
pub struct RppgPipeline {
    config: PipelineConfig,
    analyzer: Box<dyn HrvAnalyzer>,
}

impl RppgPipeline {
    pub fn new(config: PipelineConfig, analyzer: Box<dyn HrvAnalyzer>) -> Self {
        Self { config, analyzer }
    }

    /// Pipeline using the built-in Baevsky analyzer.
    pub fn with_default_analyzer(config: PipelineConfig) -> Self {
        Self::new(config, Box::new(BaevskyAnalyzer::default()))
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Sample every frame of `source`, then analyse the configured channel.
    pub fn analyze_source(&self, source: &mut dyn FrameSource) -> Result<Analysis> {
        let deadline = Deadline::start(self.config.budget());
        self.config.validate()?;
        let sampler = FrameSampler::new(self.config.roi, self.config.trim_margin);
        let traces = sampler.sample(source, &deadline)?;
        debug!(
            "{} samples after trimming {} from each end",
            traces.len(),
            self.config.trim_margin
        );
        self.run(traces.channel(self.config.channel), &deadline)
    }

    /// Analyse an already sampled and trimmed colour trace.
    pub fn analyze_signal(&self, signal: &TimeSeries) -> Result<Analysis> {
        let deadline = Deadline::start(self.config.budget());
        self.config.validate()?;
        self.run(signal, &deadline)
    }

    fn run(&self, signal: &TimeSeries, deadline: &Deadline) -> Result<Analysis> {
        let fps = signal.fs;
        if !(fps.is_finite() && fps > 0.0) {
            return Err(ProcessError::InvalidFrameRate(fps));
        }

        let spec = self.config.filter.spec_for(fps);
        let filtered = bandpass(&signal.data, &spec)?;
        debug!(
            "band-passed {} samples (order {}, {}..{} at {} Hz)",
            filtered.len(),
            spec.order,
            spec.cutoff_high,
            spec.cutoff_low,
            spec.sampling_rate
        );
        deadline.check()?;

        let envelope = extract_envelope(&filtered, &self.config.envelope)?;
        deadline.check()?;

        let peaks = detect_peaks(&envelope.smoothed, &self.config.envelope);
        debug!("{} peaks detected", peaks.len());
        if peaks.len() < 2 {
            return Ok(Analysis::Degenerate { envelope, peaks });
        }

        let rr = RRSeries::from_events(&peaks, fps)?;
        let bpm = rr.bpm();
        let hrv = hrv_time(&rr);
        deadline.check()?;

        let stress_score = StressEstimator::new(self.analyzer.as_ref(), &self.config.stress_metric)
            .estimate(&peaks, PipelineConfig::stress_sampling_rate(fps));
        debug!(
            "bpm {:.2}, sdnn {:.2} ms, stress {:?} ({:?} elapsed)",
            bpm,
            hrv.sdnn,
            stress_score,
            deadline.elapsed()
        );

        Ok(Analysis::Measured(Measurement {
            envelope,
            peaks,
            rr,
            bpm,
            hrv,
            stress_score,
        }))
    }
}
