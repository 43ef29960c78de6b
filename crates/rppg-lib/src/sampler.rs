//! Frame acquisition and per-frame colour averaging.

use crate::{
    config::RoiConfig,
    deadline::Deadline,
    error::{ProcessError, Result},
    signal::{ColorTraces, TimeSeries},
};
use image::RgbImage;
use log::debug;
use std::collections::VecDeque;

/// A decoded recording, consumed one frame at a time.
///
/// Implementations own the underlying handle; dropping the source releases it.
pub trait FrameSource {
    /// Frames per second of the recording.
    fn frame_rate(&self) -> f64;

    /// Next frame, or `None` once the recording is exhausted.
    fn next_frame(&mut self) -> Result<Option<RgbImage>>;
}

/// Frames already held in memory.
#[derive(Debug, Clone)]
pub struct MemoryFrames {
    fps: f64,
    frames: VecDeque<RgbImage>,
}

impl MemoryFrames {
    pub fn new(fps: f64, frames: Vec<RgbImage>) -> Self {
        Self {
            fps,
            frames: frames.into(),
        }
    }
}

impl FrameSource for MemoryFrames {
    fn frame_rate(&self) -> f64 {
        self.fps
    }

    fn next_frame(&mut self) -> Result<Option<RgbImage>> {
        Ok(self.frames.pop_front())
    }
}

/// Pixel window centred on the frame, derived from frame dimensions only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Roi {
    pub x0: u32,
    pub x1: u32,
    pub y0: u32,
    pub y1: u32,
}

impl Roi {
    pub fn centered(width: u32, height: u32, half_width: u32) -> Result<Self> {
        let too_small = |required| ProcessError::InvalidFrameSize {
            width,
            height,
            required,
        };
        let side = half_width.checked_mul(2).ok_or(too_small(u32::MAX))?;
        if width < side || height < side {
            return Err(too_small(side));
        }
        let x0 = (width - side) / 2;
        let y0 = (height - side) / 2;
        Ok(Self {
            x0,
            x1: x0 + side,
            y0,
            y1: y0 + side,
        })
    }

    pub fn pixel_count(&self) -> u64 {
        (self.x1 - self.x0) as u64 * (self.y1 - self.y0) as u64
    }
}

/// Mean R, G, B over the centred window of one frame.
pub fn frame_means(frame: &RgbImage, roi_cfg: &RoiConfig) -> Result<[f64; 3]> {
    let roi = Roi::centered(frame.width(), frame.height(), roi_cfg.half_width)?;
    let mut sums = [0.0f64; 3];
    for y in roi.y0..roi.y1 {
        for x in roi.x0..roi.x1 {
            let px = frame.get_pixel(x, y);
            sums[0] += px[0] as f64;
            sums[1] += px[1] as f64;
            sums[2] += px[2] as f64;
        }
    }
    let n = roi.pixel_count().max(1) as f64;
    Ok([sums[0] / n, sums[1] / n, sums[2] / n])
}

/// Reduces every frame of a source to three colour traces.
#[derive(Debug, Clone, Copy)]
pub struct FrameSampler {
    pub roi: RoiConfig,
    pub trim_margin: usize,
}

impl FrameSampler {
    pub fn new(roi: RoiConfig, trim_margin: usize) -> Self {
        Self { roi, trim_margin }
    }

    /// Untrimmed per-frame means for the whole source.
    pub fn sample_raw(
        &self,
        source: &mut dyn FrameSource,
        deadline: &Deadline,
    ) -> Result<ColorTraces> {
        let fps = source.frame_rate();
        if !(fps.is_finite() && fps > 0.0) {
            return Err(ProcessError::InvalidFrameRate(fps));
        }
        let (mut red, mut green, mut blue) = (Vec::new(), Vec::new(), Vec::new());
        while let Some(frame) = source.next_frame()? {
            deadline.check()?;
            let [r, g, b] = frame_means(&frame, &self.roi)?;
            red.push(r);
            green.push(g);
            blue.push(b);
        }
        if red.is_empty() {
            return Err(ProcessError::EmptyVideo);
        }
        debug!("sampled {} frames at {:.3} fps", red.len(), fps);
        Ok(ColorTraces {
            red: TimeSeries::new(fps, red),
            green: TimeSeries::new(fps, green),
            blue: TimeSeries::new(fps, blue),
        })
    }

    /// Per-frame means with the edge margin removed.
    pub fn sample(&self, source: &mut dyn FrameSource, deadline: &Deadline) -> Result<ColorTraces> {
        let raw = self.sample_raw(source, deadline)?;
        Ok(raw.trimmed(self.trim_margin))
    }
}
