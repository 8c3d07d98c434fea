use async_trait::async_trait;

use crate::{protocol::Outgoing, Result};

/// Hexagonal port for the chat connection.
///
/// The ingest loop only needs "read whatever bytes are ready" and "send one
/// line"; the TCP implementation lives in the `chanlog-irc` adapter crate.
#[async_trait]
pub trait Connection: Send {
    /// Read available bytes into `buf`. `Ok(0)` means the peer closed the stream.
    ///
    /// Must be cancel-safe: the ingest loop drops pending reads when its
    /// snapshot tick fires.
    async fn recv(&mut self, buf: &mut [u8]) -> std::io::Result<usize>;

    async fn send(&mut self, msg: &Outgoing) -> Result<()>;
}
