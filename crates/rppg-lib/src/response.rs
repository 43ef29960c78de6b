//! Wire shape of one pipeline invocation.

use crate::{error::ProcessError, metrics::HrvMetrics, pipeline::Analysis};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultBody {
    /// Smoothed pulse envelope, one value per analysed sample.
    pub r_avg: Vec<f64>,
    #[serde(rename = "BPM")]
    pub bpm: f64,
    #[serde(rename = "HRV")]
    pub hrv: HrvMetrics,
    #[serde(rename = "Stress_Score")]
    pub stress_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub causal_envelope: Option<Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    Success(ResultBody),
    Failure { error: String },
}

impl Response {
    pub fn is_failure(&self) -> bool {
        matches!(self, Response::Failure { .. })
    }
}

impl From<&Analysis> for ResultBody {
    fn from(analysis: &Analysis) -> Self {
        let envelope = analysis.envelope();
        Self {
            r_avg: envelope.smoothed.clone(),
            bpm: analysis.bpm(),
            hrv: analysis.hrv(),
            stress_score: analysis.stress_score(),
            causal_envelope: envelope.causal.clone(),
        }
    }
}

impl From<ProcessError> for Response {
    fn from(err: ProcessError) -> Self {
        Response::Failure {
            error: err.to_string(),
        }
    }
}

impl From<Result<Analysis, ProcessError>> for Response {
    fn from(outcome: Result<Analysis, ProcessError>) -> Self {
        match outcome {
            Ok(analysis) => Response::Success(ResultBody::from(&analysis)),
            Err(err) => err.into(),
        }
    }
}
