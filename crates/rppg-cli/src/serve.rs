use anyhow::Result;
use log::{error, info};
use rppg_lib::{io::open_video, io::SourceGuard, ProcessError, Response, RppgPipeline};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::{BufRead, Write};

#[derive(Debug, Deserialize)]
struct AnalyzeRequest {
    #[serde(default)]
    id: Option<Value>,
    query: String,
    #[serde(default)]
    fps: Option<f64>,
}

#[derive(Debug, Serialize)]
struct AnalyzeResponse {
    id: Option<Value>,
    result: Response,
}

/// Answer one JSON request per input line until EOF. Requests are handled
/// in order; each gets exactly one response line.
pub fn run_lines(
    pipeline: &RppgPipeline,
    guard: &SourceGuard,
    reader: &mut dyn BufRead,
    writer: &mut dyn Write,
) -> Result<()> {
    info!(
        "serving analysis requests for media under {}",
        guard.root().display()
    );
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let bytes = reader.read_until(b'\n', &mut buf)?;
        if bytes == 0 {
            info!("EOF reached, stopping");
            break;
        }

        let request = match parse_request(&buf) {
            Ok(Some(req)) => req,
            Ok(None) => continue,
            Err(reason) => {
                error!("failed to parse request: {}", reason);
                let response = AnalyzeResponse {
                    id: None,
                    result: Response::Failure {
                        error: format!("invalid request: {reason}"),
                    },
                };
                write_response(writer, &response)?;
                continue;
            }
        };

        let outcome = guard
            .resolve(&request.query)
            .and_then(|path| open_video(&path, request.fps))
            .and_then(|mut source| pipeline.analyze_source(source.as_mut()));
        if let Err(err) = &outcome {
            log_failure(&request.query, err);
        }
        let response = AnalyzeResponse {
            id: request.id,
            result: Response::from(outcome),
        };
        write_response(writer, &response)?;
    }

    Ok(())
}

/// `Ok(None)` for blank lines. Undecodable lines are answered, not fatal.
fn parse_request(line: &[u8]) -> std::result::Result<Option<AnalyzeRequest>, String> {
    let text = std::str::from_utf8(line).map_err(|err| err.to_string())?;
    if text.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(text).map(Some).map_err(|err| err.to_string())
}

fn log_failure(query: &str, err: &ProcessError) {
    match err {
        ProcessError::SourceRejected(_) => error!("rejected source '{}'", query),
        other => error!("analysis of '{}' failed: {}", query, other),
    }
}

fn write_response(writer: &mut dyn Write, response: &AnalyzeResponse) -> Result<()> {
    let serialized = serde_json::to_string(response)?;
    writer.write_all(serialized.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
