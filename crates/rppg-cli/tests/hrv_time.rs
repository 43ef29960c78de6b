use assert_cmd::cargo::cargo_bin_cmd;
use serde::Deserialize;
use std::error::Error;

mod common;
use common::assert_close;

#[derive(Deserialize)]
struct HrvOutput {
    #[serde(rename = "SDNN")]
    sdnn: f64,
    #[serde(rename = "RMSSD")]
    rmssd: f64,
    #[serde(rename = "pNN50")]
    pnn50: f64,
}

#[test]
fn hrv_time_closed_form_from_stdin() -> Result<(), Box<dyn Error>> {
    let mut cmd = cargo_bin_cmd!("rppg");
    cmd.arg("hrv-time").write_stdin("0.8\n0.82\n0.78\n0.85\n");
    let out = cmd.assert().success().get_output().stdout.clone();
    let m: HrvOutput = serde_json::from_slice(&out)?;
    // ms deviations from 812.5 square-sum to 2675; successive diffs 20, -40, 70.
    assert_close(m.sdnn, (2675.0f64 / 4.0).sqrt(), 1e-6);
    assert_close(m.rmssd, (6900.0f64 / 3.0).sqrt(), 1e-6);
    assert_close(m.pnn50, 25.0, 1e-9);
    Ok(())
}

#[test]
fn hrv_time_reads_file_input() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("rr.txt");
    std::fs::write(&path, "# seconds\n1.0\n1.0\n1.0\n")?;
    let mut cmd = cargo_bin_cmd!("rppg");
    cmd.args(["hrv-time", "--input", path.to_str().expect("utf8 path")]);
    let out = cmd.assert().success().get_output().stdout.clone();
    let m: HrvOutput = serde_json::from_slice(&out)?;
    assert_eq!((m.sdnn, m.rmssd, m.pnn50), (0.0, 0.0, 0.0));
    Ok(())
}

#[test]
fn hrv_time_rejects_non_positive_intervals() {
    let mut cmd = cargo_bin_cmd!("rppg");
    cmd.arg("hrv-time").write_stdin("0.8\n-0.1\n");
    cmd.assert().failure();
}
