//! JSON encoding of responses and decoding of kubelet options.

use std::io::Write;

use anyhow::Context;
use ploopflex_common::error::Result;
use ploopflex_common::types::{Options, Response};

/// Decodes the JSON options object passed to `attach` and `mount`.
///
/// # Errors
///
/// Returns a serialization error if `raw` is not a JSON object of strings.
pub fn parse_options(raw: &str) -> Result<Options> {
    Ok(serde_json::from_str(raw)?)
}

/// Writes `response` to stdout as a single JSON line.
///
/// # Errors
///
/// Returns an error if encoding or writing fails.
pub fn print_response(response: &Response) -> anyhow::Result<()> {
    let json = serde_json::to_string(response).context("encoding response")?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{json}").context("writing response")?;
    stdout.flush().context("flushing response")?;
    Ok(())
}
