use thiserror::Error;

/// Fatal outcomes of a single pipeline invocation.
///
/// A recording with too few detectable beats is not an error; see
/// [`crate::pipeline::Analysis::Degenerate`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProcessError {
    #[error("video source could not be opened: {0}")]
    SourceUnavailable(String),

    #[error("video source rejected: {0}")]
    SourceRejected(String),

    #[error("video contains no frames")]
    EmptyVideo,

    #[error("frame is {width}x{height}, sampling window needs at least {required}x{required}")]
    InvalidFrameSize {
        width: u32,
        height: u32,
        required: u32,
    },

    #[error("frame rate must be finite and positive, got {0}")]
    InvalidFrameRate(f64),

    #[error("signal has {len} samples, zero-phase filtering needs at least {required}")]
    SignalTooShort { len: usize, required: usize },

    #[error("invalid filter specification: {0}")]
    InvalidFilterSpec(String),

    #[error("peak indices are not strictly increasing at position {index}")]
    InvalidPeakOrdering { index: usize },

    #[error("processing exceeded the {budget_secs}s budget")]
    Timeout { budget_secs: f64 },
}

pub type Result<T> = std::result::Result<T, ProcessError>;
