//! Shared test scaffolding: an in-memory duplex pair standing in for a
//! real SSH channel, plus small helpers for driving the server side of a
//! hello exchange and reading/writing framed messages by hand.

use netconf_mamont::framing::{chunked, eom, FramingVersion};
use std::sync::Once;
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};

static TRACING: Once = Once::new();

/// Installs a `tracing-subscriber` writer once per test binary, the same
/// subscriber setup the teacher's `demo_fs`/`mirror_fs` binaries install
/// at startup, so failing tests can be re-run with visible `tracing`
/// output instead of a silent assertion failure.
pub fn init_tracing() {
    TRACING.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(std::io::stderr)
            .init();
    });
}

pub fn new_pair() -> (DuplexStream, DuplexStream) {
    tokio::io::duplex(65536)
}

pub fn hello_bytes(capabilities: &[&str], session_id: u32) -> Vec<u8> {
    let caps: String = capabilities
        .iter()
        .map(|c| format!("<capability>{c}</capability>"))
        .collect();
    format!(
        r#"<hello xmlns="urn:ietf:params:xml:ns:netconf:base:1.0"><capabilities>{caps}</capabilities><session-id>{session_id}</session-id></hello>]]>]]>"#
    )
    .into_bytes()
}

/// Writes `message` framed per `version` to `io`.
pub async fn write_framed(io: &mut DuplexStream, version: FramingVersion, message: &[u8]) {
    let framed = match version {
        FramingVersion::V10 => eom::encode(message),
        FramingVersion::V11 => chunked::encode(message),
    };
    io.write_all(&framed).await.unwrap();
}

/// Reads whatever bytes are immediately available, up to `cap`. Used by
/// the server side of a test to consume a client-sent request without
/// needing to frame-decode it.
pub async fn read_some(io: &mut DuplexStream, cap: usize) -> Vec<u8> {
    let mut buf = vec![0u8; cap];
    let n = io.read(&mut buf).await.unwrap();
    buf.truncate(n);
    buf
}

/// Extracts the `message-id="..."` attribute value from a raw `<rpc>` request
/// the server side just read, so the test can reply with a matching
/// `rpc-reply`.
pub fn extract_message_id(raw: &[u8]) -> String {
    let text = String::from_utf8_lossy(raw);
    let start = text.find("message-id=\"").expect("request missing message-id") + "message-id=\"".len();
    let end = text[start..].find('"').expect("unterminated message-id attribute");
    text[start..start + end].to_string()
}
