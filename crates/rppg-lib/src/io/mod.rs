pub mod frames;
pub mod guard;
pub mod text;

pub use frames::{open_video, GifVideo, ImageSequence};
pub use guard::SourceGuard;
pub use text::{parse_f64_series, read_f64_series};
