use crate::error::{ProcessError, Result};
use serde::{Deserialize, Serialize};

/// Basic typed time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    /// Uniform sampling frequency in Hz
    pub fs: f64,
    /// Samples
    pub data: Vec<f64>,
}

impl TimeSeries {
    pub fn new(fs: f64, data: Vec<f64>) -> Self {
        Self { fs, data }
    }
    pub fn len(&self) -> usize {
        self.data.len()
    }
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
    pub fn duration(&self) -> f64 {
        self.data.len() as f64 / self.fs
    }
    /// Seconds between consecutive samples.
    pub fn sample_interval(&self) -> f64 {
        1.0 / self.fs
    }

    /// Drop `margin` samples from both ends. Recordings shorter than
    /// `2 * margin` collapse to an empty series.
    pub fn trimmed(&self, margin: usize) -> Self {
        let data = if self.data.len() > 2 * margin {
            self.data[margin..self.data.len() - margin].to_vec()
        } else {
            Vec::new()
        };
        Self { fs: self.fs, data }
    }
}

/// Colour channel of an RGB recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    #[default]
    Red,
    Green,
    Blue,
}

/// Per-frame channel averages of one recording, all sampled at the frame rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorTraces {
    pub red: TimeSeries,
    pub green: TimeSeries,
    pub blue: TimeSeries,
}

impl ColorTraces {
    pub fn channel(&self, channel: Channel) -> &TimeSeries {
        match channel {
            Channel::Red => &self.red,
            Channel::Green => &self.green,
            Channel::Blue => &self.blue,
        }
    }

    pub fn trimmed(&self, margin: usize) -> Self {
        Self {
            red: self.red.trimmed(margin),
            green: self.green.trimmed(margin),
            blue: self.blue.trimmed(margin),
        }
    }

    pub fn len(&self) -> usize {
        self.red.len()
    }

    pub fn is_empty(&self) -> bool {
        self.red.is_empty()
    }
}

/// Point events on a timeline (e.g., pulse peak indices)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Events {
    pub indices: Vec<usize>,
}

impl Events {
    pub fn from_indices(indices: Vec<usize>) -> Self {
        Self { indices }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Binary train sized to the last event: ones at event positions, zeros elsewhere.
    pub fn to_pulse_train(&self) -> Vec<f64> {
        let Some(&last) = self.indices.last() else {
            return Vec::new();
        };
        let mut train = vec![0.0; last + 1];
        for &idx in &self.indices {
            train[idx] = 1.0;
        }
        train
    }

    /// Inverse of [`Events::to_pulse_train`].
    pub fn from_pulse_train(train: &[f64]) -> Self {
        let indices = train
            .iter()
            .enumerate()
            .filter(|(_, &v)| v > 0.5)
            .map(|(i, _)| i)
            .collect();
        Self { indices }
    }
}

/// RR intervals (seconds)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RRSeries {
    pub rr: Vec<f64>,
}

impl RRSeries {
    /// Consecutive event distances scaled to seconds. Fails on any
    /// non-increasing pair instead of producing a zero or negative interval.
    pub fn from_events(events: &Events, fs: f64) -> Result<Self> {
        let mut rr = Vec::with_capacity(events.len().saturating_sub(1));
        for (i, w) in events.indices.windows(2).enumerate() {
            if w[1] <= w[0] {
                return Err(ProcessError::InvalidPeakOrdering { index: i + 1 });
            }
            let dt = (w[1] - w[0]) as f64 / fs;
            rr.push(dt);
        }
        Ok(Self { rr })
    }

    pub fn len(&self) -> usize {
        self.rr.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rr.is_empty()
    }

    pub fn mean(&self) -> Option<f64> {
        if self.rr.is_empty() {
            None
        } else {
            Some(self.rr.iter().sum::<f64>() / self.rr.len() as f64)
        }
    }

    pub fn to_millis(&self) -> Vec<f64> {
        self.rr.iter().map(|s| s * 1000.0).collect()
    }

    /// Beats per minute from the mean interval, 0 when no interval exists.
    pub fn bpm(&self) -> f64 {
        match self.mean() {
            Some(mean) if mean > 0.0 => 60.0 / mean,
            _ => 0.0,
        }
    }
}
