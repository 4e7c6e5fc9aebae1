//! RFC 6242 §4.2 — chunked framing.
//!
//! A message is a sequence of chunks, each `\n#<size>\n<size bytes>`,
//! followed by the end-of-chunks token `\n##\n`. `size` is a decimal
//! integer in `1..=2^31-1` with at most 10 digits.
//!
//! [`parse`] is a byte-count driven state machine, not a textual search
//! for the end-of-chunks token: each chunk's payload is consumed by the
//! exact length its header declared, so arbitrary bytes inside a chunk
//! (including a literal `\n##\n`) can never be mistaken for the
//! terminator. This is the same approach as the `SplitChunked`
//! `bufio.SplitFunc` in the original client (as opposed to that client's
//! `transportIO.Chunked`, which re-scans for the literal token and is
//! documented there as unsafe for exactly this reason); we follow the
//! safe one.

use crate::framing::FramingError;

const MAX_SIZE_DIGITS: usize = 10;
const MAX_CHUNK_SIZE: u64 = (1u64 << 31) - 1;

/// Outcome of attempting to parse a chunked-framing message out of a
/// byte buffer that may not yet contain the whole thing.
pub enum ChunkParse {
    /// A complete message was decoded. `consumed` is the number of bytes
    /// (across all chunks and the end-of-chunks token) to drain from the
    /// front of the input buffer; `body` is the reassembled payload.
    Complete { consumed: usize, body: Vec<u8> },
    /// Not enough bytes are buffered yet to reach a verdict; the caller
    /// should read more from the transport and try again.
    Incomplete,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum State {
    /// Expecting `\n#` to start the next chunk header, or `\n##\n` to end
    /// the message.
    HeaderStart,
    /// Accumulating the decimal size digits of a chunk header.
    HeaderSize { digits_start: usize },
    /// Consuming `remaining` more payload bytes of the current chunk.
    Data { remaining: u64 },
}

/// Attempts to parse one chunked-framing message from the front of `buf`.
///
/// `at_eof` must be `true` once the transport has signalled EOF and no
/// further bytes will ever arrive; it lets the parser turn an otherwise
/// ambiguous "need more data" state into a definitive framing error
/// (missing newline in a size field, or a chunk truncated by EOF) instead
/// of looping forever.
pub fn parse(buf: &[u8], at_eof: bool) -> Result<ChunkParse, FramingError> {
    let mut pos = 0usize;
    let len = buf.len();
    let mut state = State::HeaderStart;
    let mut chunk_count = 0usize;
    let mut body = Vec::new();

    loop {
        match state {
            State::HeaderStart => {
                if pos >= len {
                    return incomplete_or_clean_eof(pos, at_eof);
                }
                if buf[pos] != b'\n' {
                    return Err(FramingError::BadChunk("expected '\\n' to start chunk header"));
                }
                if pos + 1 >= len {
                    return incomplete(at_eof, "truncated chunk header");
                }
                if buf[pos + 1] != b'#' {
                    return Err(FramingError::BadChunk("expected '#' after newline in chunk header"));
                }
                pos += 2;
                if pos >= len {
                    return incomplete(at_eof, "truncated chunk header");
                }
                if buf[pos] == b'#' {
                    pos += 1;
                    if pos >= len {
                        return incomplete(at_eof, "truncated end-of-chunks marker");
                    }
                    if buf[pos] != b'\n' {
                        return Err(FramingError::BadChunk("malformed end-of-chunks marker"));
                    }
                    pos += 1;
                    if chunk_count == 0 {
                        return Err(FramingError::BadChunk(
                            "end-of-chunks token encountered with zero chunks received",
                        ));
                    }
                    return Ok(ChunkParse::Complete { consumed: pos, body });
                }
                if !buf[pos].is_ascii_digit() {
                    return Err(FramingError::BadChunk("chunk size field is non-numeric"));
                }
                state = State::HeaderSize { digits_start: pos };
            }
            State::HeaderSize { digits_start } => {
                while pos < len && buf[pos] != b'\n' {
                    if pos - digits_start >= MAX_SIZE_DIGITS {
                        return Err(FramingError::BadChunk("chunk size field exceeds 10 digits"));
                    }
                    if !buf[pos].is_ascii_digit() {
                        return Err(FramingError::BadChunk("chunk size field is non-numeric"));
                    }
                    pos += 1;
                }
                if pos >= len {
                    return incomplete(at_eof, "chunk size field missing trailing newline");
                }
                let digits = std::str::from_utf8(&buf[digits_start..pos])
                    .map_err(|_| FramingError::BadChunk("chunk size field is non-numeric"))?;
                let size: u64 = digits
                    .parse()
                    .map_err(|_| FramingError::BadChunk("chunk size field is non-numeric"))?;
                if size == 0 {
                    return Err(FramingError::BadChunk("chunk size field is zero"));
                }
                if size > MAX_CHUNK_SIZE {
                    return Err(FramingError::BadChunk("chunk size field exceeds 2^31-1"));
                }
                pos += 1; // consume the trailing '\n'
                state = State::Data { remaining: size };
            }
            State::Data { remaining } => {
                let available = (len - pos) as u64;
                if available >= remaining {
                    let end = pos + remaining as usize;
                    body.extend_from_slice(&buf[pos..end]);
                    pos = end;
                    chunk_count += 1;
                    state = State::HeaderStart;
                } else {
                    if at_eof {
                        return Err(FramingError::BadChunk(
                            "chunk shorter than its declared size",
                        ));
                    }
                    body.extend_from_slice(&buf[pos..]);
                    return Ok(ChunkParse::Incomplete);
                }
            }
        }
    }
}

fn incomplete(at_eof: bool, message: &'static str) -> Result<ChunkParse, FramingError> {
    if at_eof {
        Err(FramingError::BadChunk(message))
    } else {
        Ok(ChunkParse::Incomplete)
    }
}

fn incomplete_or_clean_eof(pos: usize, at_eof: bool) -> Result<ChunkParse, FramingError> {
    // pos == 0 at HeaderStart means we have not consumed any bytes of a
    // new message yet; EOF there is an ordinary closed connection, not a
    // framing error.
    if at_eof && pos > 0 {
        Err(FramingError::BadChunk("truncated chunk header"))
    } else {
        Ok(ChunkParse::Incomplete)
    }
}

/// Encodes `payload` as a single chunk followed by the end-of-chunks
/// token, which is all a sender ever needs to emit (see RFC 6242 §4.3
/// example 2; a sender is not required to split a message into multiple
/// chunks).
pub fn encode(payload: &[u8]) -> Vec<u8> {
    let mut framed = Vec::with_capacity(payload.len() + 16);
    framed.extend_from_slice(format!("\n#{}\n", payload.len()).as_bytes());
    framed.extend_from_slice(payload);
    framed.extend_from_slice(b"\n##\n");
    framed
}
