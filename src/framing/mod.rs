//! Message framing as specified in RFC 6242 §4.
//!
//! This module implements the two on-the-wire framings a NETCONF session
//! can negotiate during the hello exchange:
//!
//! - [`eom`] — version 1.0, end-of-message framing (`]]>]]>`).
//! - [`chunked`] — version 1.1, chunked framing (`\n#<size>\n<bytes>` …
//!   `\n##\n`).
//!
//! [`reader::StreamReader`] is the buffered receive side shared by both:
//! it reads from a transport in blocks and retains any bytes that arrive
//! past the end of one message for the next `Receive` call, exactly as
//! the teacher's `protocol::rpc::wire::read_fragment` retains leftover
//! bytes in a duplex stream between calls.

pub mod chunked;
pub mod eom;
pub mod reader;

pub use reader::StreamReader;

/// The two NETCONF framing versions negotiated during the hello exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramingVersion {
    /// RFC 6242 §4.1 — end-of-message framing, used for the hello exchange
    /// and for sessions whose peer does not advertise `base:1.1`.
    V10,
    /// RFC 6242 §4.2 — chunked framing.
    V11,
}

/// Errors that can occur while encoding or decoding framed messages.
///
/// Per the design, a framing error should be treated as fatal: once byte
/// alignment on the wire is lost there is no way to resynchronize, so the
/// session that owns the transport transitions to failed (see
/// `crate::session::Session`).
#[derive(Debug, thiserror::Error)]
pub enum FramingError {
    /// The transport was closed (or returned EOF) while a complete message
    /// was still being assembled.
    #[error("transport closed before a complete message was received")]
    UnexpectedEof,

    /// The chunked-framing byte stream did not conform to RFC 6242 §4.2.
    #[error("bad chunk: {0}")]
    BadChunk(&'static str),

    /// Underlying transport I/O failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
