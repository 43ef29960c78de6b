pub mod config;
pub mod deadline;
pub mod detectors;
pub mod error;
pub mod filters;
pub mod io;
pub mod metrics;
pub mod pipeline;
pub mod plot;
pub mod response;
pub mod sampler;
pub mod signal;

pub use config::{load_config, parse_config, PipelineConfig};
pub use detectors::*;
pub use error::{ProcessError, Result};
pub use metrics::*;
pub use pipeline::{Analysis, Measurement, RppgPipeline};
pub use response::{Response, ResultBody};
pub use sampler::{FrameSampler, FrameSource, MemoryFrames};
pub use signal::*;
