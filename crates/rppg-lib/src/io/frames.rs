//! Frame decoders for recordings stored on disk.
//!
//! Two layouts are understood: a directory of still images (one file per
//! frame, ordered by file name) and an animated GIF.

use crate::{
    error::{ProcessError, Result},
    sampler::FrameSource,
};
use image::{codecs::gif::GifDecoder, AnimationDecoder, DynamicImage, Frames, RgbImage};
use log::{info, warn};
use std::{
    collections::VecDeque,
    fs::{self, File},
    io::BufReader,
    path::{Path, PathBuf},
};

const FRAME_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];

/// Frame rate assumed for GIFs whose first frame carries no delay.
pub const GIF_FALLBACK_FPS: f64 = 10.0;

fn unavailable(path: &Path, detail: impl std::fmt::Display) -> ProcessError {
    ProcessError::SourceUnavailable(format!("{}: {}", path.display(), detail))
}

/// Directory of frame images decoded lazily in file-name order.
pub struct ImageSequence {
    fps: f64,
    paths: VecDeque<PathBuf>,
}

impl ImageSequence {
    pub fn open(dir: &Path, fps: f64) -> Result<Self> {
        let entries = fs::read_dir(dir).map_err(|e| unavailable(dir, e))?;
        let mut paths = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| unavailable(dir, e))?.path();
            let is_frame = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| FRAME_EXTENSIONS.iter().any(|f| ext.eq_ignore_ascii_case(f)))
                .unwrap_or(false);
            if is_frame && path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();
        info!("opened {} ({} frame files)", dir.display(), paths.len());
        Ok(Self {
            fps,
            paths: paths.into(),
        })
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl FrameSource for ImageSequence {
    fn frame_rate(&self) -> f64 {
        self.fps
    }

    fn next_frame(&mut self) -> Result<Option<RgbImage>> {
        let Some(path) = self.paths.pop_front() else {
            return Ok(None);
        };
        let img = image::open(&path).map_err(|e| unavailable(&path, e))?;
        Ok(Some(img.into_rgb8()))
    }
}

/// Animated GIF; the frame rate comes from the first frame's delay unless
/// overridden.
pub struct GifVideo {
    fps: f64,
    pending: Option<RgbImage>,
    frames: Frames<'static>,
    path: PathBuf,
}

impl GifVideo {
    pub fn open(path: &Path, fps_override: Option<f64>) -> Result<Self> {
        let file = File::open(path).map_err(|e| unavailable(path, e))?;
        let decoder = GifDecoder::new(BufReader::new(file)).map_err(|e| unavailable(path, e))?;
        let mut frames = decoder.into_frames();
        let first = match frames.next() {
            Some(frame) => Some(frame.map_err(|e| unavailable(path, e))?),
            None => None,
        };
        let delay_fps = first.as_ref().and_then(|frame| {
            let (num, den) = frame.delay().numer_denom_ms();
            let ms = num as f64 / den.max(1) as f64;
            (ms > 0.0).then(|| 1000.0 / ms)
        });
        let fps = match (fps_override, delay_fps) {
            (Some(fps), _) => fps,
            (None, Some(fps)) => fps,
            (None, None) => {
                warn!(
                    "{} has no frame delay, assuming {} fps",
                    path.display(),
                    GIF_FALLBACK_FPS
                );
                GIF_FALLBACK_FPS
            }
        };
        info!("opened {} at {:.3} fps", path.display(), fps);
        Ok(Self {
            fps,
            pending: first.map(|f| DynamicImage::ImageRgba8(f.into_buffer()).into_rgb8()),
            frames,
            path: path.to_path_buf(),
        })
    }
}

impl FrameSource for GifVideo {
    fn frame_rate(&self) -> f64 {
        self.fps
    }

    fn next_frame(&mut self) -> Result<Option<RgbImage>> {
        if let Some(frame) = self.pending.take() {
            return Ok(Some(frame));
        }
        match self.frames.next() {
            Some(Ok(frame)) => Ok(Some(
                DynamicImage::ImageRgba8(frame.into_buffer()).into_rgb8(),
            )),
            Some(Err(err)) => Err(unavailable(&self.path, err)),
            None => Ok(None),
        }
    }
}

/// Open a recording once: a directory becomes an [`ImageSequence`] (frame
/// rate required), a `.gif` file a [`GifVideo`].
pub fn open_video(path: &Path, fps: Option<f64>) -> Result<Box<dyn FrameSource>> {
    if path.is_dir() {
        let fps = fps.ok_or_else(|| {
            unavailable(path, "frame rate is required for image sequences")
        })?;
        return Ok(Box::new(ImageSequence::open(path, fps)?));
    }
    let is_gif = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("gif"))
        .unwrap_or(false);
    if is_gif {
        return Ok(Box::new(GifVideo::open(path, fps)?));
    }
    if !path.exists() {
        return Err(unavailable(path, "no such file or directory"));
    }
    Err(unavailable(path, "unsupported video format"))
}
