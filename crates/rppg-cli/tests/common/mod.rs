#![allow(dead_code)]

use image::{Rgb, RgbImage};
use std::{f64::consts::PI, path::Path};

pub const FPS: f64 = 30.0;
pub const PULSE_HZ: f64 = 1.2;

pub fn pulse(i: usize) -> f64 {
    (2.0 * PI * PULSE_HZ * i as f64 / FPS + 0.3).sin()
}

/// Narrow Gaussian beat once per 1.2 Hz cycle, in `[0, 1]`.
pub fn beat(i: usize) -> f64 {
    const SPREAD: f64 = 0.05;
    let phase = (PULSE_HZ * i as f64 / FPS + 0.4).rem_euclid(1.0);
    let dt = phase.min(1.0 - phase) / PULSE_HZ;
    (-dt * dt / (2.0 * SPREAD * SPREAD)).exp()
}

/// Write `count` 100x100 PNG frames whose red channel carries a 1.2 Hz
/// sinusoid.
pub fn write_pulse_frames(dir: &Path, count: usize) {
    write_frames(dir, count, pulse);
}

/// Write `count` 100x100 PNG frames whose red channel follows `wave`.
/// Column dither keeps the window mean from quantising to whole levels.
pub fn write_frames(dir: &Path, count: usize, wave: fn(usize) -> f64) {
    for i in 0..count {
        let s = wave(i);
        let frame = RgbImage::from_fn(100, 100, |x, _| {
            let v = (128.0 + 40.0 * s + (x as f64 + 0.5) / 100.0).floor();
            Rgb([v as u8, 90, 60])
        });
        frame
            .save(dir.join(format!("frame_{i:05}.png")))
            .expect("write fixture frame");
    }
}

pub fn assert_close(actual: f64, expected: f64, tol: f64) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= tol,
        "expected {expected}, got {actual} (diff {diff} > tol {tol})"
    );
}
