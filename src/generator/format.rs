use anyhow::{bail, Context};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Pipe `text` through an external formatter and return its stdout.
///
/// `command` is the program followed by its arguments, for example
/// `["prettier", "--stdin-filepath", "index.ts"]`.
pub async fn format_output(command: &[String], text: &str) -> anyhow::Result<String> {
    let (program, args) = command
        .split_first()
        .context("Formatter command is empty")?;

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("Failed to start formatter `{program}`"))?;

    let mut stdin = child
        .stdin
        .take()
        .context("Formatter stdin is not available")?;
    let input = text.to_string();
    let writer = tokio::spawn(async move {
        stdin.write_all(input.as_bytes()).await?;
        stdin.shutdown().await
    });

    let output = child
        .wait_with_output()
        .await
        .with_context(|| format!("Formatter `{program}` did not finish"))?;
    writer
        .await?
        .with_context(|| format!("Failed to write to formatter `{program}`"))?;

    if !output.status.success() {
        bail!(
            "Formatter `{program}` failed ({}): {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    String::from_utf8(output.stdout)
        .with_context(|| format!("Formatter `{program}` produced invalid UTF-8"))
}
