use anyhow::Result;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::irc::message::{ERROR, Message, RPL_BOUNCE};

use super::pool::UpstreamTarget;

/// Runs the redirect handshake over an accepted stream.
///
/// Exactly two messages go out (the numeric bounce naming the target, then
/// a terminal `ERROR` with the same reason) and the stream is shut down.
/// Nothing is ever read from the client.
pub async fn run<S>(stream: &mut S, target: &UpstreamTarget) -> Result<()>
where
    S: AsyncWrite + Unpin,
{
    let reason = format!("Please connect to server {}", target);

    let bounce = Message::new(RPL_BOUNCE, &["*", &target.host, &target.port, &reason]);
    let farewell = Message::new(ERROR, &[&reason]);

    stream.write_all(&bounce.to_bytes()).await?;
    stream.write_all(&farewell.to_bytes()).await?;
    stream.flush().await?;
    stream.shutdown().await?;

    Ok(())
}
