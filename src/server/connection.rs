//! Connection Handler
//!
//! Drives one client session: read a command, enforce the memory budget,
//! execute, reply. Repeats until the peer closes its side.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use crate::cache::{CacheStore, EvictionPolicy};
use crate::error::Result;
use crate::protocol::process;

/// Serves commands from `stream` until it reports end of file.
///
/// Each read of up to `buffer_size` bytes is one command; nothing is
/// buffered across reads. Parse failures are answered with an `ERROR: `
/// line and the session carries on. Socket errors end the session.
pub async fn handle_connection<S>(
    mut stream: S,
    store: &mut CacheStore,
    policy: &EvictionPolicy,
    buffer_size: usize,
) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut buf = vec![0u8; buffer_size];

    loop {
        let n = stream.read(&mut buf).await?;
        if n == 0 {
            info!("Client disconnected");
            break;
        }

        // Make room before the command can add more data
        policy.manage_memory(store);

        match process(&buf[..n], store) {
            Ok(response) => {
                debug!(bytes = n, "command processed");
                stream.write_all(response.as_bytes()).await?;
            }
            Err(err) => {
                warn!(error = %err, "rejected command");
                stream.write_all(err.to_wire().as_bytes()).await?;
            }
        }
    }

    if let Err(err) = stream.shutdown().await {
        debug!(error = %err, "shutdown after disconnect failed");
    }
    Ok(())
}
