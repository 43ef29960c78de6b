use crate::signal::Events;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Axis {
    pub label: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Style {
    pub width: f32,
    pub color: Color,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color(pub u32);

impl Color {
    pub fn rgb(self) -> (u8, u8, u8) {
        (
            ((self.0 >> 16) & 0xFF) as u8,
            ((self.0 >> 8) & 0xFF) as u8,
            (self.0 & 0xFF) as u8,
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineSeries {
    pub name: String,
    pub points: Vec<[f64; 2]>,
    pub style: Style,
}

/// Isolated points, drawn as filled circles of `style.width` radius.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkerSeries {
    pub name: String,
    pub points: Vec<[f64; 2]>,
    pub style: Style,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Series {
    Line(LineSeries),
    Markers(MarkerSeries),
}

impl Series {
    pub fn points(&self) -> &[[f64; 2]] {
        match self {
            Series::Line(line) => &line.points,
            Series::Markers(markers) => &markers.points,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Figure {
    pub title: Option<String>,
    pub x: Axis,
    pub y: Axis,
    pub series: Vec<Series>,
}

impl Figure {
    pub fn new(title: impl Into<Option<String>>) -> Self {
        Self {
            title: title.into(),
            x: Axis { label: None },
            y: Axis { label: None },
            series: Vec::new(),
        }
    }

    pub fn add_series(&mut self, series: Series) {
        self.series.push(series);
    }

    /// `(x_min, x_max, y_min, y_max)` over all finite points. Degenerate
    /// ranges are widened so the result is always drawable.
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        let mut b = (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY);
        for p in self.series.iter().flat_map(|s| s.points()) {
            if p[0].is_finite() && p[1].is_finite() {
                b = (b.0.min(p[0]), b.1.max(p[0]), b.2.min(p[1]), b.3.max(p[1]));
            }
        }
        if !b.0.is_finite() {
            return (0.0, 1.0, 0.0, 1.0);
        }
        if b.1 <= b.0 {
            b.1 = b.0 + 1.0;
        }
        if b.3 <= b.2 {
            b.3 = b.2 + 1.0;
        }
        b
    }
}

pub fn decimate_points(points: &[[f64; 2]], max_points: usize) -> Vec<[f64; 2]> {
    if points.len() <= max_points {
        return points.to_vec();
    }
    let bucket_size = points.len() as f64 / max_points as f64;
    let mut result = Vec::with_capacity(max_points);
    for i in 0..max_points {
        let start = (i as f64 * bucket_size).floor() as usize;
        if start >= points.len() {
            break;
        }
        result.push(points[start]);
    }
    result
}

/// Pulse envelope against time with the detected peaks marked. Peaks are
/// never decimated.
pub fn figure_from_envelope(
    envelope: &[f64],
    fs: f64,
    peaks: &Events,
    max_points: usize,
) -> Figure {
    let dt = 1.0 / fs.max(f64::EPSILON);
    let points: Vec<[f64; 2]> = envelope
        .iter()
        .enumerate()
        .map(|(i, value)| [i as f64 * dt, *value])
        .collect();
    let mut fig = Figure::new(Some("Pulse envelope".into()));
    fig.x.label = Some("time (s)".into());
    fig.y.label = Some("energy".into());
    fig.add_series(Series::Line(LineSeries {
        name: "envelope".into(),
        points: decimate_points(&points, max_points),
        style: Style {
            width: 1.4,
            color: Color(0x1F77B4),
        },
    }));
    let peak_points = peaks
        .indices
        .iter()
        .filter_map(|&i| envelope.get(i).map(|&v| [i as f64 * dt, v]))
        .collect();
    fig.add_series(Series::Markers(MarkerSeries {
        name: "peaks".into(),
        points: peak_points,
        style: Style {
            width: 3.0,
            color: Color(0xFF0077),
        },
    }));
    fig
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimation_keeps_first_point_and_caps_length() {
        let points: Vec<[f64; 2]> = (0..1000).map(|i| [i as f64, 0.0]).collect();
        let out = decimate_points(&points, 100);
        assert_eq!(out.len(), 100);
        assert_eq!(out[0], [0.0, 0.0]);
        assert_eq!(out[1], [10.0, 0.0]);
        assert_eq!(decimate_points(&points[..5], 100).len(), 5);
    }

    #[test]
    fn envelope_figure_marks_every_peak() {
        let envelope = vec![0.0, 2.0, 0.0, 1.0, 0.0];
        let fig = figure_from_envelope(&envelope, 2.0, &Events::from_indices(vec![1, 3]), 1024);
        assert_eq!(fig.series.len(), 2);
        assert_eq!(fig.series[1].points(), &[[0.5, 2.0], [1.5, 1.0]]);
        assert_eq!(fig.bounds(), (0.0, 2.0, 0.0, 2.0));
    }

    #[test]
    fn flat_figure_bounds_are_widened() {
        let fig = figure_from_envelope(&[0.0; 4], 1.0, &Events::from_indices(vec![]), 10);
        assert_eq!(fig.bounds(), (0.0, 3.0, 0.0, 1.0));
        assert_eq!(Figure::new(None).bounds(), (0.0, 1.0, 0.0, 1.0));
        assert_eq!(Color(0xFF0077).rgb(), (0xFF, 0x00, 0x77));
    }
}
