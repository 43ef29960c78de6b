use super::ensure_longer_than;
use crate::error::Result;

/// Equal-weight FIR smoother.
#[derive(Debug, Clone, PartialEq)]
pub struct MovingAverage {
    taps: Vec<f64>,
}

impl MovingAverage {
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            taps: vec![1.0 / window as f64; window],
        }
    }

    /// Edge padding used by [`MovingAverage::zero_phase`].
    pub fn padding_len(&self) -> usize {
        3 * self.taps.len()
    }

    /// Forward-only pass from rest. Output lags the input by half a window.
    pub fn causal(&self, data: &[f64]) -> Vec<f64> {
        self.run(data, 0.0)
    }

    /// Forward-backward pass over an odd extension of `data`, each direction
    /// starting in the steady state of its first sample.
    pub fn zero_phase(&self, data: &[f64]) -> Result<Vec<f64>> {
        let pad = self.padding_len();
        ensure_longer_than(data, pad)?;
        let ext = odd_extend(data, pad);
        let mut y = self.run(&ext, ext[0]);
        y.reverse();
        let mut y = self.run(&y, y[0]);
        y.reverse();
        Ok(y[pad..pad + data.len()].to_vec())
    }

    /// Convolution where every sample before the start equals `history`.
    fn run(&self, data: &[f64], history: f64) -> Vec<f64> {
        (0..data.len())
            .map(|i| {
                self.taps
                    .iter()
                    .enumerate()
                    .map(|(k, b)| b * if k <= i { data[i - k] } else { history })
                    .sum()
            })
            .collect()
    }
}

/// Odd extension of `data` by `pad` samples on both sides.
fn odd_extend(data: &[f64], pad: usize) -> Vec<f64> {
    let n = data.len();
    let first = data[0];
    let last = data[n - 1];
    let mut ext = Vec::with_capacity(n + 2 * pad);
    ext.extend((1..=pad).rev().map(|i| 2.0 * first - data[i]));
    ext.extend_from_slice(data);
    ext.extend((1..=pad).map(|i| 2.0 * last - data[n - 1 - i]));
    ext
}
