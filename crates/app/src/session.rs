//! Line-delimited JSON session
//!
//! Each input line is one `Command`; each output line is the matching `Reply`.

use seatbook_core::{Command, Reply};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use crate::desk::DeskHandle;

/// Pump commands from `input` to the desk until EOF, writing replies to `output`
pub async fn run_session<R, W>(desk: &DeskHandle, input: R, mut output: W) -> std::io::Result<usize>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut handled = 0;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let reply = match Command::from_bytes(line.as_bytes()) {
            Ok(command) => {
                debug!(?command, "Command received");
                match desk.submit(command).await {
                    Ok(reply) => reply,
                    Err(e) => {
                        warn!("{}", e);
                        break;
                    }
                }
            }
            Err(e) => Reply::Error {
                kind: "parse".to_string(),
                message: e.to_string(),
            },
        };

        let mut bytes = serde_json::to_vec(&reply)?;
        bytes.push(b'\n');
        output.write_all(&bytes).await?;
        output.flush().await?;
        handled += 1;
    }

    Ok(handled)
}
