// src/runner/relay.rs

//! Copying job output to the terminal and the log file at the same time.

use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

const CHUNK_SIZE: usize = 8192;

/// Stream `source` into both `sink` and `log` until EOF.
///
/// Bytes are forwarded in the chunks they arrive in; nothing is buffered
/// beyond one chunk. If the sink goes away (the terminal was closed), the
/// log keeps receiving output. Returns the number of bytes read.
pub async fn relay<R, W>(mut source: R, sink: W, mut log: File, stream: &'static str) -> std::io::Result<u64>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut sink = Some(sink);
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut total = 0u64;

    loop {
        let n = source.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        total += n as u64;
        let chunk = &buf[..n];

        let failed = match sink.as_mut() {
            Some(out) => write_through(out, chunk).await.err(),
            None => None,
        };
        if let Some(e) = failed {
            warn!(stream, error = %e, "terminal output failed; continuing with log only");
            sink = None;
        }

        log.write_all(chunk).await?;
    }

    log.flush().await?;
    debug!(stream, bytes = total, "output relay finished");
    Ok(total)
}

async fn write_through<W: AsyncWrite + Unpin>(out: &mut W, chunk: &[u8]) -> std::io::Result<()> {
    out.write_all(chunk).await?;
    out.flush().await
}
