//! Buffered streaming reader shared by both framings.
//!
//! Mirrors the teacher's `SocketMessageHandler`: reads arrive in fixed
//! blocks and whatever is left over after a message boundary is found
//! stays in `residual` for the next call, rather than being shared or
//! re-read from the socket. Exactly one receive task may drive a given
//! `StreamReader` at a time (see `crate::transport::Transport`).

use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::trace;

use super::{chunked, eom, FramingError, FramingVersion};

/// Default block size suggested by the NETCONF client core (§4.1).
pub const DEFAULT_BLOCK_SIZE: usize = 4096;

/// A buffered reader over an async byte stream that reassembles framed
/// NETCONF messages, carrying residual bytes between calls.
pub struct StreamReader<R> {
    inner: R,
    residual: Vec<u8>,
    block_size: usize,
}

impl<R: AsyncRead + Unpin> StreamReader<R> {
    pub fn new(inner: R) -> Self {
        Self::with_block_size(inner, DEFAULT_BLOCK_SIZE)
    }

    pub fn with_block_size(inner: R, block_size: usize) -> Self {
        Self {
            inner,
            residual: Vec::new(),
            block_size,
        }
    }

    /// Reads one framed message using the given framing version.
    pub async fn receive(&mut self, version: FramingVersion) -> Result<Vec<u8>, FramingError> {
        match version {
            FramingVersion::V10 => self.receive_eom().await,
            FramingVersion::V11 => self.receive_chunked().await,
        }
    }

    async fn receive_eom(&mut self) -> Result<Vec<u8>, FramingError> {
        loop {
            if let Some((body_len, consumed)) = eom::find_separator(&self.residual) {
                let body = self.residual[..body_len].to_vec();
                self.residual.drain(..consumed);
                return Ok(body);
            }
            if self.read_block().await? == 0 {
                return Err(FramingError::UnexpectedEof);
            }
        }
    }

    async fn receive_chunked(&mut self) -> Result<Vec<u8>, FramingError> {
        loop {
            match chunked::parse(&self.residual, false)? {
                chunked::ChunkParse::Complete { consumed, body } => {
                    self.residual.drain(..consumed);
                    return Ok(body);
                }
                chunked::ChunkParse::Incomplete => {}
            }
            if self.read_block().await? == 0 {
                return match chunked::parse(&self.residual, true)? {
                    chunked::ChunkParse::Complete { consumed, body } => {
                        self.residual.drain(..consumed);
                        Ok(body)
                    }
                    chunked::ChunkParse::Incomplete => Err(FramingError::UnexpectedEof),
                };
            }
        }
    }

    /// Reads up to `block_size` bytes from the transport into `residual`,
    /// returning the number of bytes read (0 on EOF).
    async fn read_block(&mut self) -> Result<usize, FramingError> {
        let mut block = vec![0u8; self.block_size];
        let n = self.inner.read(&mut block).await?;
        trace!(bytes = n, "read block from transport");
        if n > 0 {
            self.residual.extend_from_slice(&block[..n]);
        }
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[tokio::test]
    async fn eom_reads_two_messages_from_one_block() {
        let data = b"first]]>]]>second]]>]]>".to_vec();
        let mut reader = StreamReader::new(Cursor::new(data));
        assert_eq!(reader.receive(FramingVersion::V10).await.unwrap(), b"first");
        assert_eq!(reader.receive(FramingVersion::V10).await.unwrap(), b"second");
    }

    #[tokio::test]
    async fn eom_separator_straddling_block_boundary() {
        let data = b"hello]]>]]>".to_vec();
        let mut reader = StreamReader::with_block_size(Cursor::new(data), 3);
        assert_eq!(reader.receive(FramingVersion::V10).await.unwrap(), b"hello");
    }

    #[tokio::test]
    async fn eom_mid_message_eof_is_an_error() {
        let data = b"no terminator here".to_vec();
        let mut reader = StreamReader::new(Cursor::new(data));
        assert!(matches!(
            reader.receive(FramingVersion::V10).await,
            Err(FramingError::UnexpectedEof)
        ));
    }

    #[tokio::test]
    async fn chunked_reads_message_from_literal_example() {
        let data = b"\n#12\nhello world!\n##\n".to_vec();
        let mut reader = StreamReader::new(Cursor::new(data));
        assert_eq!(
            reader.receive(FramingVersion::V11).await.unwrap(),
            b"hello world!"
        );
    }

    #[tokio::test]
    async fn chunked_small_block_size_forces_many_reads() {
        let data = b"\n#5\nhello\n#6\n world\n##\n".to_vec();
        let mut reader = StreamReader::with_block_size(Cursor::new(data), 2);
        assert_eq!(
            reader.receive(FramingVersion::V11).await.unwrap(),
            b"hello world"
        );
    }
}
