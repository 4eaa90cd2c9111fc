//! Report an invocation response on the console and as GitHub Actions outputs.

use crate::Response;
use lambdasign_core::hash::hex_sha256;
use lambdasign_core::{Context, Error, Result};
use log::debug;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Env value naming the file GitHub Actions collects step outputs from.
pub const GITHUB_OUTPUT: &str = "GITHUB_OUTPUT";

/// The outputs exported for a response: `status`, `code` and `message`.
pub fn outputs(resp: &Response) -> Vec<(&'static str, String)> {
    vec![
        ("status", resp.status_text()),
        ("code", resp.status.as_u16().to_string()),
        ("message", String::from_utf8_lossy(&resp.body).into_owned()),
    ]
}

/// The console line for a response.
pub fn console_line(resp: &Response) -> String {
    format!(
        "status code: {}, response: {}",
        resp.status_text(),
        String::from_utf8_lossy(&resp.body)
    )
}

/// Format outputs with the multi-line safe `name<<DELIMITER` syntax.
pub fn format_output_file(outputs: &[(&str, String)]) -> Result<String> {
    let mut s = String::new();
    for (name, value) in outputs {
        // A delimiter derived from the value itself can't appear in it.
        let delimiter = format!("lambdasign_{}", &hex_sha256(value.as_bytes())[..16]);
        if value.contains(&delimiter) {
            return Err(Error::unexpected(format!(
                "output {name} contains its own delimiter"
            )));
        }

        s.push_str(&format!("{name}<<{delimiter}\n{value}\n{delimiter}\n"));
    }
    Ok(s)
}

/// Format outputs as legacy `::set-output` workflow commands.
pub fn format_set_output(outputs: &[(&str, String)]) -> String {
    outputs
        .iter()
        .map(|(name, value)| format!("::set-output name={name}::{}\n", escape_data(value)))
        .collect()
}

/// Escape a workflow command value so that it stays on one line.
fn escape_data(v: &str) -> String {
    v.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Append outputs to the file at `path`.
pub fn write_output_file(path: &Path, outputs: &[(&str, String)]) -> Result<()> {
    let content = format_output_file(outputs)?;
    let mut f = OpenOptions::new().create(true).append(true).open(path)?;
    f.write_all(content.as_bytes())?;
    Ok(())
}

/// Print the console line to `w` and export the outputs.
///
/// Outputs go to the file named by [`GITHUB_OUTPUT`] when the env is set,
/// otherwise they are printed to `w` as `::set-output` commands.
pub fn emit(ctx: &Context, resp: &Response, w: &mut impl Write) -> Result<()> {
    writeln!(w, "{}", console_line(resp))?;

    let outputs = outputs(resp);
    match ctx.env_var(GITHUB_OUTPUT).filter(|v| !v.is_empty()) {
        Some(path) => {
            debug!("writing outputs to {path}");
            write_output_file(Path::new(&path), &outputs)
        }
        None => {
            w.write_all(format_set_output(&outputs).as_bytes())?;
            Ok(())
        }
    }
}
