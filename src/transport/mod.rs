//! The transport abstraction (§3): a duplex byte channel the session
//! layer frames messages over. SSH negotiation, authentication, and key
//! handling are an external collaborator's job — this module only needs
//! something that implements [`tokio::io::AsyncRead`] +
//! [`tokio::io::AsyncWrite`], the same way the teacher's
//! `SocketMessageHandler` treats its `DuplexStream` as an opaque byte
//! pipe and leaves connection setup to its caller.

use async_trait::async_trait;
use tokio::io::{split, AsyncRead, AsyncWrite, AsyncWriteExt, ReadHalf, WriteHalf};
use tokio::sync::Mutex as AsyncMutex;
use tracing::trace;

use crate::framing::{chunked, eom, FramingError, FramingVersion, StreamReader};

/// A framed duplex channel. Implementations own exactly one underlying
/// byte stream; `receive` must never be called concurrently from two
/// tasks (the session engine upholds this by running its background
/// receive loop as the sole caller).
#[async_trait]
pub trait Transport: Send + Sync {
    /// Frames `payload` per the current version and writes it atomically.
    async fn send(&self, payload: &[u8]) -> std::io::Result<()>;

    /// Reads one complete framed message per the current version.
    async fn receive(&self) -> Result<Vec<u8>, FramingError>;

    /// Changes the framing version used by subsequent `send`/`receive`
    /// calls. Called once, by the session engine, right after the hello
    /// exchange determines whether the peer supports chunked framing.
    fn set_version(&self, version: FramingVersion);

    /// Closes the underlying stream. Causes any task blocked in
    /// `receive` to observe an I/O error or EOF shortly afterward.
    async fn close(&self) -> std::io::Result<()>;
}

/// A [`Transport`] over any split-able duplex byte stream — a
/// `tokio::io::DuplexStream` in tests, or a real SSH channel in
/// production.
pub struct DuplexTransport<R> {
    reader: AsyncMutex<StreamReader<ReadHalf<R>>>,
    writer: AsyncMutex<WriteHalf<R>>,
    version: std::sync::Mutex<FramingVersion>,
}

impl<R> DuplexTransport<R>
where
    R: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    /// Wraps `inner`, starting in version 1.0 (end-of-message) framing,
    /// as every session must before its hello exchange completes.
    pub fn new(inner: R) -> Self {
        Self::with_block_size(inner, crate::framing::reader::DEFAULT_BLOCK_SIZE)
    }

    pub fn with_block_size(inner: R, block_size: usize) -> Self {
        let (read_half, write_half) = split(inner);
        Self {
            reader: AsyncMutex::new(StreamReader::with_block_size(read_half, block_size)),
            writer: AsyncMutex::new(write_half),
            version: std::sync::Mutex::new(FramingVersion::V10),
        }
    }

    fn current_version(&self) -> FramingVersion {
        *self.version.lock().expect("transport version mutex poisoned")
    }
}

#[async_trait]
impl<R> Transport for DuplexTransport<R>
where
    R: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    async fn send(&self, payload: &[u8]) -> std::io::Result<()> {
        let framed = match self.current_version() {
            FramingVersion::V10 => eom::encode(payload),
            FramingVersion::V11 => chunked::encode(payload),
        };
        trace!(bytes = framed.len(), "writing framed message");
        let mut writer = self.writer.lock().await;
        writer.write_all(&framed).await?;
        writer.flush().await
    }

    async fn receive(&self) -> Result<Vec<u8>, FramingError> {
        let version = self.current_version();
        let mut reader = self.reader.lock().await;
        reader.receive(version).await
    }

    fn set_version(&self, version: FramingVersion) {
        *self.version.lock().expect("transport version mutex poisoned") = version;
    }

    async fn close(&self) -> std::io::Result<()> {
        let mut writer = self.writer.lock().await;
        writer.shutdown().await
    }
}
