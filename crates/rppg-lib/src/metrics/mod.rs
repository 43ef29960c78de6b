pub mod hrv;
pub mod stress;

pub use hrv::{hrv_time, HrvMetrics};
pub use stress::{BaevskyAnalyzer, HrvAnalyzer, StressEstimator, STRESS_INDEX_METRIC};
