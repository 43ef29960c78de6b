//! Plain-text sample series: one or more numbers per line, separated by
//! whitespace or commas. `#` starts a comment.

use anyhow::{Context, Result};
use std::path::Path;

pub fn parse_f64_series(text: &str) -> Result<Vec<f64>> {
    let mut out = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let content = line.split('#').next().unwrap_or("").trim();
        for token in content
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
        {
            let val: f64 = token
                .parse()
                .with_context(|| format!("line {} is not f64: {}", idx + 1, token))?;
            out.push(val);
        }
    }
    if out.is_empty() {
        anyhow::bail!("no numeric samples found");
    }
    Ok(out)
}

pub fn read_f64_series(path: &Path) -> Result<Vec<f64>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_f64_series(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mixed_separators_and_comments() {
        let text = "# rr intervals (s)\n0.8, 0.82\n\n0.78 0.85 # last two\n";
        assert_eq!(parse_f64_series(text).unwrap(), vec![0.8, 0.82, 0.78, 0.85]);
    }

    #[test]
    fn bad_token_names_its_line() {
        let err = parse_f64_series("1.0\n2.0\nabc\n").unwrap_err();
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(parse_f64_series("# nothing\n\n").is_err());
    }
}
