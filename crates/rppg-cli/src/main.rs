use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::{info, warn};
use plotters::prelude::*;
use rppg_lib::{
    config::load_config,
    io::{open_video, text as text_io, SourceGuard},
    metrics::hrv::hrv_time,
    plot::{figure_from_envelope, Figure, Series},
    Analysis, PipelineConfig, Response, RppgPipeline, RRSeries, TimeSeries,
};
use std::{
    io::{self, BufReader, Read},
    path::{Path, PathBuf},
    process::ExitCode,
};

mod serve;

const PLOT_MAX_POINTS: usize = 2048;

#[derive(Parser)]
#[command(
    name = "rppg",
    version,
    about = "Remote photoplethysmography: heart rate and HRV from face video"
)]
struct Cli {
    /// Default log filter when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyse a recording (directory of frames or animated GIF)
    Analyze {
        #[arg(long)]
        video: PathBuf,
        /// Frame rate; required for frame directories, overrides GIF timing
        #[arg(long)]
        fps: Option<f64>,
        #[arg(long)]
        config: Option<PathBuf>,
        /// Render the envelope and detected peaks to a PNG
        #[arg(long)]
        plot: Option<PathBuf>,
    },
    /// Analyse an already sampled colour trace (newline-delimited, stdin or --input)
    Signal {
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long)]
        fps: f64,
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        plot: Option<PathBuf>,
    },
    /// Compute time-domain HRV from newline-delimited RR intervals (seconds)
    HrvTime {
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Answer JSON-lines analysis requests on stdin/stdout
    Serve {
        /// Directory request paths are resolved against
        #[arg(long, default_value = ".")]
        media_root: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or(&cli.log_level)).init();

    match cli.command {
        Commands::Analyze {
            video,
            fps,
            config,
            plot,
        } => cmd_analyze(&video, fps, config.as_deref(), plot.as_deref()),
        Commands::Signal {
            input,
            fps,
            config,
            plot,
        } => cmd_signal(input.as_deref(), fps, config.as_deref(), plot.as_deref()),
        Commands::HrvTime { input } => {
            cmd_hrv_time(input.as_deref())?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Serve { media_root, config } => {
            cmd_serve(&media_root, config.as_deref())?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn read_samples(input: Option<&Path>) -> Result<Vec<f64>> {
    match input {
        Some(path) => text_io::read_f64_series(path),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            text_io::parse_f64_series(&buf)
        }
    }
}

fn pipeline_from(config: Option<&Path>) -> Result<RppgPipeline> {
    let cfg = match config {
        Some(path) => load_config(path)?,
        None => PipelineConfig::default(),
    };
    Ok(RppgPipeline::with_default_analyzer(cfg))
}

/// Print the response and map failure responses to a non-zero exit status.
fn emit(response: &Response) -> Result<ExitCode> {
    println!("{}", serde_json::to_string(response)?);
    Ok(if response.is_failure() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn cmd_analyze(
    video: &Path,
    fps: Option<f64>,
    config: Option<&Path>,
    plot: Option<&Path>,
) -> Result<ExitCode> {
    let pipeline = pipeline_from(config)?;
    let outcome = open_video(video, fps).and_then(|mut source| {
        let fps = source.frame_rate();
        pipeline
            .analyze_source(source.as_mut())
            .map(|analysis| (fps, analysis))
    });
    let plotted = match (&outcome, plot) {
        (Ok((fps, analysis)), Some(out)) => Some((out, *fps, analysis.clone())),
        _ => None,
    };
    let status = emit(&Response::from(outcome.map(|(_, analysis)| analysis)))?;
    if let Some((out, fps, analysis)) = plotted {
        plot_after_emit(out, &analysis, fps);
    }
    Ok(status)
}

fn cmd_signal(
    input: Option<&Path>,
    fps: f64,
    config: Option<&Path>,
    plot: Option<&Path>,
) -> Result<ExitCode> {
    let pipeline = pipeline_from(config)?;
    let signal = TimeSeries::new(fps, read_samples(input)?);
    let outcome = pipeline.analyze_signal(&signal);
    let plotted = match (&outcome, plot) {
        (Ok(analysis), Some(out)) => Some((out, analysis.clone())),
        _ => None,
    };
    let status = emit(&Response::from(outcome))?;
    if let Some((out, analysis)) = plotted {
        plot_after_emit(out, &analysis, fps);
    }
    Ok(status)
}

fn cmd_hrv_time(input: Option<&Path>) -> Result<()> {
    let rr = RRSeries {
        rr: read_samples(input)?,
    };
    if let Some(bad) = rr.rr.iter().find(|v| !(v.is_finite() && **v > 0.0)) {
        return Err(anyhow!("RR intervals must be positive seconds, got {}", bad));
    }
    let m = hrv_time(&rr);
    println!("{}", serde_json::to_string(&m)?);
    Ok(())
}

fn cmd_serve(media_root: &Path, config: Option<&Path>) -> Result<()> {
    let pipeline = pipeline_from(config)?;
    let guard = SourceGuard::new(media_root)?;
    let stdin = io::stdin();
    let mut reader = BufReader::new(stdin.lock());
    let stdout = io::stdout();
    let mut writer = stdout.lock();
    serve::run_lines(&pipeline, &guard, &mut reader, &mut writer)
}

/// The diagnostic plot is optional output: failing to write it never
/// changes the response or the exit status.
fn plot_after_emit(out: &Path, analysis: &Analysis, fps: f64) {
    if let Err(err) = plot_analysis(out, analysis, fps) {
        warn!("failed to write plot {}: {:#}", out.display(), err);
    }
}

fn plot_analysis(out: &Path, analysis: &Analysis, fps: f64) -> Result<()> {
    let fig = figure_from_envelope(
        &analysis.envelope().smoothed,
        fps,
        analysis.peaks(),
        PLOT_MAX_POINTS,
    );
    draw_plotters_figure(out, &fig)?;
    info!("wrote {}", out.display());
    Ok(())
}

fn draw_plotters_figure(path: &Path, fig: &Figure) -> Result<()> {
    let backend = BitMapBackend::new(path, (800, 480));
    let root = backend.into_drawing_area();
    root.fill(&WHITE)?;
    let (x_min, x_max, y_min, y_max) = fig.bounds();
    // No captions or tick labels: the bitmap backend is built without fonts.
    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;
    for series in &fig.series {
        match series {
            Series::Line(line) => {
                let (r, g, b) = line.style.color.rgb();
                chart.draw_series(LineSeries::new(
                    line.points.iter().map(|p| (p[0], p[1])),
                    RGBColor(r, g, b).stroke_width(line.style.width.ceil() as u32),
                ))?;
            }
            Series::Markers(markers) => {
                let (r, g, b) = markers.style.color.rgb();
                let radius = markers.style.width.ceil() as u32;
                chart.draw_series(markers.points.iter().map(|p| {
                    Circle::new((p[0], p[1]), radius, RGBColor(r, g, b).filled())
                }))?;
            }
        }
    }
    root.present()?;
    Ok(())
}
