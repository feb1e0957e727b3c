use error_tracking::tracker::ErrorTracker;
use gtm::identity::CurrentUser;
use gtm::integration::EnhancedGtm;
use serde_json::{Map, Value};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::message::Message;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReplayStats {
    pub replayed: u64,
    pub skipped: u64,
}

/// Feeds every line of `input` to the integration. The identity a line
/// carries stays current for the lines after it. Undecodable lines are
/// reported to `errors` and skipped.
pub async fn replay<R>(
    input: R,
    integration: &EnhancedGtm,
    user: &CurrentUser,
    errors: &ErrorTracker,
) -> std::io::Result<ReplayStats>
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(input).lines();
    let mut stats = ReplayStats::default();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        match Message::from_line(&line) {
            Ok(message) => {
                if let Some(identity) = message.identity {
                    user.set(identity);
                }
                integration.handle(&message.event);
                stats.replayed += 1;
            }
            Err(e) => {
                let event_id = errors.capture_exception(&e);
                tracing::warn!(%event_id, "skipping undecodable message: {}", e);
                stats.skipped += 1;
            }
        }
    }

    Ok(stats)
}

/// Writes pushes to `output` as JSON lines until every sender is gone.
pub async fn drain<W>(
    mut receiver: UnboundedReceiver<Map<String, Value>>,
    mut output: W,
) -> anyhow::Result<W>
where
    W: AsyncWrite + Unpin,
{
    while let Some(payload) = receiver.recv().await {
        let mut line = serde_json::to_vec(&payload)?;
        line.push(b'\n');
        output.write_all(&line).await?;
    }
    output.flush().await?;
    Ok(output)
}
