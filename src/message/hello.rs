//! The `hello` message (RFC 6241 §8.1), exchanged before a session
//! negotiates a framing version and therefore always sent and received
//! under end-of-message framing (see `crate::session` design notes).

use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::Reader;

use super::xml_util::BASE_NS;
use super::ProtocolError;

/// The default capability set this crate advertises: both framing
/// versions, letting the server choose 1.1 if it supports it.
pub const DEFAULT_CAPABILITIES: &[&str] = &[
    "urn:ietf:params:netconf:base:1.0",
    "urn:ietf:params:netconf:base:1.1",
];

/// A parsed or about-to-be-sent `hello` message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hello {
    pub capabilities: Vec<String>,
    pub session_id: Option<u32>,
}

impl Hello {
    pub fn new(capabilities: Vec<String>) -> Self {
        Hello {
            capabilities,
            session_id: None,
        }
    }

    /// Whether any advertised capability names NETCONF base 1.1, which
    /// selects chunked framing for the rest of the session.
    pub fn supports_chunked_framing(&self) -> bool {
        self.capabilities.iter().any(|c| c.contains("base:1.1"))
    }

    /// Serializes this hello to the bytes sent over the wire (framing is
    /// applied separately by the caller).
    pub fn marshal(&self) -> Vec<u8> {
        let mut body = format!(r#"<hello xmlns="{BASE_NS}"><capabilities>"#);
        for cap in &self.capabilities {
            body.push_str(&format!("<capability>{cap}</capability>"));
        }
        body.push_str("</capabilities>");
        if let Some(id) = self.session_id {
            body.push_str(&format!("<session-id>{id}</session-id>"));
        }
        body.push_str("</hello>");
        body.into_bytes()
    }
}

/// Parses a received `hello` message body into capabilities and an
/// optional session-id. The remote always supplies a session-id; it is
/// optional here only because construction of an outgoing `Hello` (which
/// reuses this type) never has one.
pub fn parse(raw: &[u8]) -> Result<Hello, ProtocolError> {
    let text = std::str::from_utf8(raw).map_err(|e| ProtocolError::Xml(e.to_string()))?;
    let mut reader = Reader::from_str(text);
    let mut buf = Vec::new();

    let mut capabilities = Vec::new();
    let mut session_id = None;
    // Path of currently-open element local names, used to tell
    // `<capabilities><capability>` apart from a bare `<session-id>`.
    let mut path: Vec<String> = Vec::new();
    let mut pending_text = String::new();

    loop {
        match reader
            .read_event_into(&mut buf)
            .map_err(|e| ProtocolError::Xml(e.to_string()))?
        {
            Event::Start(start) => {
                path.push(local_name(&start));
                pending_text.clear();
            }
            Event::Text(text) => {
                pending_text.push_str(&decode_text(&text));
            }
            Event::End(_) => {
                let closing = path.pop().unwrap_or_default();
                if closing == "capability" {
                    capabilities.push(pending_text.trim().to_string());
                } else if closing == "session-id" {
                    session_id = pending_text.trim().parse::<u32>().ok();
                }
                pending_text.clear();
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !path.is_empty() {
        return Err(ProtocolError::Xml("unbalanced hello element".to_string()));
    }
    if capabilities.is_empty() {
        return Err(ProtocolError::Xml(
            "hello carried no capabilities".to_string(),
        ));
    }

    Ok(Hello {
        capabilities,
        session_id,
    })
}

fn local_name(start: &BytesStart) -> String {
    String::from_utf8_lossy(start.local_name().as_ref()).into_owned()
}

fn decode_text(text: &BytesText) -> String {
    text.unescape().map(|c| c.into_owned()).unwrap_or_default()
}
