use assert_cmd::cargo::cargo_bin_cmd;
use serde_json::Value;
use std::{error::Error, fs};

mod common;
use common::{assert_close, pulse};

#[test]
fn sinusoidal_trace_reports_lobe_rate() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("trace.txt");
    let text: String = (0..1800).map(|i| format!("{}\n", pulse(i))).collect();
    fs::write(&input, text)?;

    let mut cmd = cargo_bin_cmd!("rppg");
    cmd.args([
        "signal",
        "--fps",
        "30",
        "--input",
        input.to_str().expect("utf8 path"),
    ]);
    let out = cmd.assert().success().get_output().stdout.clone();
    let value: Value = serde_json::from_slice(&out)?;
    // Two envelope lobes per 1.2 Hz cycle.
    assert_close(value["BPM"].as_f64().expect("BPM"), 144.0, 3.0);
    assert_eq!(value["r_avg"].as_array().map(Vec::len), Some(1800));
    assert!(value.get("causal_envelope").is_none());
    Ok(())
}

#[test]
fn constant_trace_is_degenerate_not_an_error() -> Result<(), Box<dyn Error>> {
    let mut cmd = cargo_bin_cmd!("rppg");
    cmd.args(["signal", "--fps", "30"])
        .write_stdin("0\n".repeat(300));
    let out = cmd.assert().success().get_output().stdout.clone();
    let value: Value = serde_json::from_slice(&out)?;
    assert_eq!(value["BPM"], 0.0);
    assert_eq!(
        value["HRV"],
        serde_json::json!({"SDNN": 0.0, "RMSSD": 0.0, "pNN50": 0.0})
    );
    assert!(value["Stress_Score"].is_null());
    Ok(())
}

#[test]
fn config_enables_causal_envelope() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let config = dir.path().join("rppg.toml");
    fs::write(&config, "[envelope]\ncausal_diagnostic = true\n")?;
    let text: String = (0..600).map(|i| format!("{}\n", pulse(i))).collect();

    let mut cmd = cargo_bin_cmd!("rppg");
    cmd.args([
        "signal",
        "--fps",
        "30",
        "--config",
        config.to_str().expect("utf8 path"),
    ])
    .write_stdin(text);
    let out = cmd.assert().success().get_output().stdout.clone();
    let value: Value = serde_json::from_slice(&out)?;
    assert_eq!(value["causal_envelope"].as_array().map(Vec::len), Some(600));
    Ok(())
}

#[test]
fn too_short_trace_fails_with_error_body() -> Result<(), Box<dyn Error>> {
    let mut cmd = cargo_bin_cmd!("rppg");
    cmd.args(["signal", "--fps", "30"]).write_stdin("1\n2\n3\n");
    let out = cmd.assert().failure().get_output().stdout.clone();
    let value: Value = serde_json::from_slice(&out)?;
    let error = value["error"].as_str().expect("error message");
    assert!(error.contains("3 samples"), "{error}");
    Ok(())
}

#[test]
fn unwritable_plot_still_reports_measurement() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let plot = dir.path().join("no_such_dir").join("envelope.png");
    let text: String = (0..600).map(|i| format!("{}\n", pulse(i))).collect();

    let mut cmd = cargo_bin_cmd!("rppg");
    cmd.args([
        "signal",
        "--fps",
        "30",
        "--plot",
        plot.to_str().expect("utf8 path"),
    ])
    .write_stdin(text);
    let out = cmd.assert().success().get_output().stdout.clone();
    let value: Value = serde_json::from_slice(&out)?;
    assert!(value["BPM"].as_f64().expect("BPM") > 0.0);
    assert!(!plot.exists());
    Ok(())
}
