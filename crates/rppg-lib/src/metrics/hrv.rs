use crate::signal::RRSeries;
use serde::{Deserialize, Serialize};

/// Time-domain HRV summary. SDNN and RMSSD in milliseconds, pNN50 in percent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HrvMetrics {
    #[serde(rename = "SDNN")]
    pub sdnn: f64,
    #[serde(rename = "RMSSD")]
    pub rmssd: f64,
    #[serde(rename = "pNN50")]
    pub pnn50: f64,
}

impl HrvMetrics {
    pub fn is_zero(&self) -> bool {
        self.sdnn == 0.0 && self.rmssd == 0.0 && self.pnn50 == 0.0
    }
}

pub fn hrv_time(rr: &RRSeries) -> HrvMetrics {
    let rr_ms = rr.to_millis();
    let n = rr_ms.len();
    if n < 2 {
        return HrvMetrics::default();
    }

    let mean = rr_ms.iter().sum::<f64>() / n as f64;
    let sdnn = (rr_ms.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n as f64).sqrt();

    let diffs: Vec<f64> = rr_ms.windows(2).map(|w| w[1] - w[0]).collect();
    let rmssd = (diffs.iter().map(|d| d * d).sum::<f64>() / diffs.len() as f64).sqrt();

    // Normalised by the number of intervals, not the number of differences.
    let nn50 = diffs.iter().filter(|d| d.abs() > 50.0).count();
    let pnn50 = 100.0 * nn50 as f64 / n as f64;

    HrvMetrics { sdnn, rmssd, pnn50 }
}
