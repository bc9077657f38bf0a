//! Line-oriented front end: each input line is one message from a fixed
//! sender, each reply is written back followed by a newline.

use crate::error::Result;
use crate::handler::{CommandHandler, IncomingMessage};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Serve `reader` until it is exhausted or `shutdown` fires
pub async fn run_console<R, W>(
    handler: &CommandHandler,
    sender_id: i64,
    reader: R,
    mut writer: W,
    shutdown: CancellationToken,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();

    loop {
        let line = tokio::select! {
            () = shutdown.cancelled() => {
                info!("Console stopped by shutdown");
                break;
            }
            line = lines.next_line() => line?,
        };

        let Some(line) = line else {
            info!("Console input closed");
            break;
        };

        if line.trim().is_empty() {
            continue;
        }

        let message = IncomingMessage::new(sender_id, line);
        match handler.handle(&message).await {
            Some(reply) => {
                writer.write_all(reply.text.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
            None => debug!(sender_id, "No reply for console message"),
        }
    }

    Ok(())
}
