//! Line-command surface.
//!
//! Reads one command per line, runs it against the active flow and writes
//! the resulting snapshot (or an `{"error": ...}` object) as one JSON line.

mod dispatch;
mod error;
mod parse;

pub use dispatch::{Flow, Reply, Shell};
pub use error::error_line;
pub use parse::{Command, CommandError, HELP};

use anyhow::Context;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{info_span, warn, Instrument};

use crate::runtime::ShellRuntime;

/// Drive `runtime` from `input` until end of input or `quit`.
///
/// Blank lines and lines starting with `#` are skipped.
pub async fn run_shell<R, W>(runtime: &ShellRuntime, input: R, mut output: W) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut shell = Shell::new(runtime);
    let mut lines = input.lines();

    while let Some(line) = lines.next_line().await.context("Failed to read command")? {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let reply = match line.parse::<Command>() {
            Ok(command) => {
                let span = info_span!("shell.command", command = command.name(), flow = ?shell.flow());
                shell.execute(command).instrument(span).await
            }
            Err(err) => Err(err.into()),
        };

        let rendered = match reply {
            Ok(Reply::Quit) => break,
            Ok(Reply::Text(text)) => text.to_string(),
            Ok(Reply::Snapshot(value)) => value.to_string(),
            Err(err) => {
                warn!(error = %err, "command failed");
                error_line(&err)
            }
        };

        output
            .write_all(rendered.as_bytes())
            .await
            .context("Failed to write command output")?;
        output.write_all(b"\n").await?;
        output.flush().await?;
    }

    Ok(())
}
