use anyhow::Context;
use std::io::Write;
use std::process::{Command, Stdio};

/// Environment variable overriding the rustfmt binary
pub const RUSTFMT_ENV: &str = "ASSEMBLYGEN_RUSTFMT";

/// Format generated source through `rustfmt`, reading stdin and writing stdout
///
/// Formatting happens in memory so that unchanged output is still detected
/// before anything is written.
pub fn format_source(source: &str) -> anyhow::Result<String> {
    // Allow tests to override the rustfmt binary path without mutating PATH
    let rustfmt_bin = std::env::var(RUSTFMT_ENV).unwrap_or_else(|_| "rustfmt".to_string());

    let mut child = Command::new(&rustfmt_bin)
        .args(["--edition", "2021"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("Failed to run {rustfmt_bin}"))?;

    child
        .stdin
        .take()
        .context("rustfmt stdin was not captured")?
        .write_all(source.as_bytes())
        .context("Failed to pipe generated source to rustfmt")?;

    let output = child.wait_with_output()?;
    if !output.status.success() {
        anyhow::bail!(
            "rustfmt failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    String::from_utf8(output.stdout).context("rustfmt produced invalid UTF-8")
}
