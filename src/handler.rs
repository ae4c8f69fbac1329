//! Per-connection request loop.
//!
//! Each accepted connection gets its own [`Handler::serve`] task, which owns
//! the stream and its read buffer until the loop ends:
//!
//! ```text
//! Reading -> Parsing -> Computing -> Writing -> Reading ...
//!    |
//!    +-> Closing (read error or end of stream)
//! ```
//!
//! A malformed request is logged and dropped with no reply. A failed write
//! is logged and the loop goes back to reading; only a failed or empty read
//! closes the connection.

use crate::compute::ComputeMode;
use crate::config::Config;
use crate::protocol::{Request, Response};
use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, error, trace, warn};

/// Historical read size: one read is one request.
pub const DEFAULT_BUFFER_SIZE: usize = 100;

/// Settings shared by every connection handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Handler {
    buffer_size: usize,
    compute: ComputeMode,
    max_index: Option<i64>,
}

/// Counters reported when a connection closes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectionStats {
    /// Requests answered (including ones whose reply failed to write).
    pub served: u64,
    /// Requests dropped without a reply.
    pub dropped: u64,
    /// Replies that failed to write.
    pub write_errors: u64,
}

impl Handler {
    pub fn new(buffer_size: usize, compute: ComputeMode, max_index: Option<i64>) -> Self {
        Handler {
            buffer_size,
            compute,
            max_index,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Handler::new(config.buffer_size, config.compute, config.max_index)
    }

    /// Serve one connection until the peer closes it or a read fails.
    ///
    /// The stream is dropped, and so closed, on every return path.
    pub async fn serve<S>(self, mut stream: S) -> ConnectionStats
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let mut buffer = BytesMut::zeroed(self.buffer_size);
        let mut stats = ConnectionStats::default();

        loop {
            let n = match stream.read(&mut buffer[..]).await {
                Ok(0) => {
                    trace!("Connection closed by client");
                    break;
                }
                Ok(n) => n,
                Err(e) => {
                    debug!(error = %e, "Read failed, closing connection");
                    break;
                }
            };

            let request = match Request::parse(&buffer[..n], self.max_index) {
                Ok(request) => request,
                Err(e) => {
                    warn!(error = %e, "Dropping request");
                    stats.dropped += 1;
                    continue;
                }
            };

            trace!(n = request.n, "Computing");
            let value = match self.compute.run(request.n).await {
                Ok(value) => value,
                Err(e) => {
                    error!(n = request.n, error = %e, "Computation failed");
                    stats.dropped += 1;
                    continue;
                }
            };

            stats.served += 1;
            if let Err(e) = stream.write_all(&Response::value(value)).await {
                // Keep the connection: only the read side decides when it ends.
                error!(error = %e, "Error while writing to the socket");
                stats.write_errors += 1;
            }
        }

        drop(stream);
        debug!(
            served = stats.served,
            dropped = stats.dropped,
            write_errors = stats.write_errors,
            "Connection closed"
        );
        stats
    }
}

impl Default for Handler {
    fn default() -> Self {
        Handler::new(DEFAULT_BUFFER_SIZE, ComputeMode::Inline, None)
    }
}
