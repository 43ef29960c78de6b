use crate::{
    detectors::EnvelopeConfig,
    error::{ProcessError, Result},
    filters::FilterSpec,
    metrics::STRESS_INDEX_METRIC,
    signal::Channel,
};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, time::Duration};

/// Band-pass parameters before they are bound to a frame rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub order: usize,
    pub cutoff_high: f64,
    pub cutoff_low: f64,
    /// Filter rate = `sampling_rate_scale * floor(fps + 1)`.
    pub sampling_rate_scale: f64,
    /// Absolute filter rate; takes precedence over the scaled value.
    pub sampling_rate: Option<f64>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            order: 5,
            cutoff_high: 10.0,
            cutoff_low: 100.0,
            sampling_rate_scale: 8.0,
            sampling_rate: None,
        }
    }
}

impl FilterConfig {
    /// The rate the cutoffs are interpreted against, distinct from the
    /// frame rate.
    pub fn filter_sampling_rate(&self, fps: f64) -> f64 {
        self.sampling_rate
            .unwrap_or_else(|| self.sampling_rate_scale * (fps + 1.0).floor())
    }

    pub fn spec_for(&self, fps: f64) -> FilterSpec {
        FilterSpec {
            order: self.order,
            cutoff_high: self.cutoff_high,
            cutoff_low: self.cutoff_low,
            sampling_rate: self.filter_sampling_rate(fps),
        }
    }
}

/// Sampling window around the frame centre.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoiConfig {
    /// Half the window side, in pixels.
    pub half_width: u32,
}

impl Default for RoiConfig {
    fn default() -> Self {
        Self { half_width: 50 }
    }
}

/// Everything one pipeline invocation needs besides the recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub channel: Channel,
    /// Samples discarded from each end of the colour traces.
    pub trim_margin: usize,
    pub roi: RoiConfig,
    pub filter: FilterConfig,
    pub envelope: EnvelopeConfig,
    /// Analyzer metric reported as the stress score.
    pub stress_metric: String,
    /// Wall-clock budget per invocation.
    pub max_processing_secs: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            channel: Channel::Red,
            trim_margin: 100,
            roi: RoiConfig::default(),
            filter: FilterConfig::default(),
            envelope: EnvelopeConfig::default(),
            stress_metric: STRESS_INDEX_METRIC.to_string(),
            max_processing_secs: 120.0,
        }
    }
}

impl PipelineConfig {
    /// `None` (no limit) unless the budget is a positive, representable duration.
    pub fn budget(&self) -> Option<Duration> {
        if self.max_processing_secs > 0.0 {
            Duration::try_from_secs_f64(self.max_processing_secs).ok()
        } else {
            None
        }
    }

    /// Rate handed to the stress analyzer: whole frames per second.
    pub fn stress_sampling_rate(fps: f64) -> f64 {
        fps.floor()
    }

    pub fn validate(&self) -> Result<()> {
        if self.envelope.window == 0 {
            return Err(ProcessError::InvalidFilterSpec(
                "envelope window must be at least 1".into(),
            ));
        }
        if !(self.envelope.threshold_divisor.is_finite() && self.envelope.threshold_divisor > 0.0)
        {
            return Err(ProcessError::InvalidFilterSpec(format!(
                "threshold divisor {} must be positive",
                self.envelope.threshold_divisor
            )));
        }
        Ok(())
    }
}

pub fn parse_config(text: &str) -> anyhow::Result<PipelineConfig> {
    let cfg: PipelineConfig = toml::from_str(text).context("parsing pipeline config")?;
    Ok(cfg)
}

pub fn load_config(path: &Path) -> anyhow::Result<PipelineConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    parse_config(&contents).with_context(|| format!("in {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = PipelineConfig::default();
        assert_eq!(cfg.trim_margin, 100);
        assert_eq!(cfg.roi.half_width, 50);
        assert_eq!(cfg.envelope.window, 7);
        let spec = cfg.filter.spec_for(30.0);
        assert_eq!(spec.order, 5);
        assert_eq!(spec.cutoff_high, 10.0);
        assert_eq!(spec.cutoff_low, 100.0);
        assert_eq!(spec.sampling_rate, 248.0);
    }

    #[test]
    fn filter_and_stress_rates_stay_distinct() {
        let cfg = FilterConfig::default();
        assert_eq!(cfg.filter_sampling_rate(29.97), 240.0);
        assert_eq!(PipelineConfig::stress_sampling_rate(29.97), 29.0);
        let fixed = FilterConfig {
            sampling_rate: Some(500.0),
            ..FilterConfig::default()
        };
        assert_eq!(fixed.filter_sampling_rate(29.97), 500.0);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg = parse_config(
            r#"
channel = "green"
trim_margin = 30

[filter]
cutoff_low = 60.0

[envelope]
causal_diagnostic = true
"#,
        )
        .unwrap();
        assert_eq!(cfg.channel, Channel::Green);
        assert_eq!(cfg.trim_margin, 30);
        assert_eq!(cfg.filter.cutoff_low, 60.0);
        assert_eq!(cfg.filter.order, 5);
        assert!(cfg.envelope.causal_diagnostic);
        assert_eq!(cfg.envelope.window, 7);
        assert_eq!(cfg.stress_metric, "HRV_SI");
    }

    #[test]
    fn load_config_reports_missing_file() {
        let err = load_config(Path::new("/nonexistent/rppg.toml")).unwrap_err();
        assert!(err.to_string().contains("failed to read config"));
    }

    #[test]
    fn unrepresentable_budget_is_unbounded() {
        for secs in [1e30, f64::INFINITY, f64::NAN, 0.0, -5.0] {
            let cfg = PipelineConfig {
                max_processing_secs: secs,
                ..PipelineConfig::default()
            };
            assert_eq!(cfg.budget(), None, "budget for {secs}");
        }
        let cfg = PipelineConfig {
            max_processing_secs: 2.5,
            ..PipelineConfig::default()
        };
        assert_eq!(cfg.budget(), Some(Duration::from_millis(2500)));
    }

    #[test]
    fn zero_window_is_rejected() {
        let mut cfg = PipelineConfig::default();
        cfg.envelope.window = 0;
        assert!(cfg.validate().is_err());
    }
}
