use assert_cmd::cargo::cargo_bin_cmd;
use serde_json::Value;
use std::error::Error;

mod common;
use common::write_pulse_frames;

fn replies(stdout: &[u8]) -> Result<Vec<Value>, Box<dyn Error>> {
    let text = std::str::from_utf8(stdout)?;
    Ok(text
        .lines()
        .map(serde_json::from_str)
        .collect::<Result<_, _>>()?)
}

#[test]
fn serve_answers_requests_in_order() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let media = dir.path().join("media");
    let clip = media.join("clip");
    std::fs::create_dir_all(&clip)?;
    write_pulse_frames(&clip, 500);

    let requests = [
        r#"{"id": 1, "query": "clip", "fps": 30}"#,
        r#"{"id": 2, "query": "/etc/passwd", "fps": 30}"#,
        r#"{"id": 3, "query": "../../etc/passwd"}"#,
        r#"{"id": 4, "query": "clip"}"#,
    ]
    .join("\n");

    let mut cmd = cargo_bin_cmd!("rppg");
    cmd.args([
        "serve",
        "--media-root",
        media.to_str().expect("utf8 path"),
    ])
    .write_stdin(requests);
    let out = cmd.assert().success().get_output().stdout.clone();
    let replies = replies(&out)?;
    assert_eq!(replies.len(), 4);

    assert_eq!(replies[0]["id"], 1);
    assert!(replies[0]["result"]["BPM"].as_f64().expect("BPM") > 0.0);

    for reply in &replies[1..3] {
        let error = reply["result"]["error"].as_str().expect("error message");
        assert!(error.contains("rejected"), "{error}");
    }

    // Frame directories need an explicit frame rate.
    assert_eq!(replies[3]["id"], 4);
    assert!(replies[3]["result"]["error"].is_string());
    Ok(())
}
