//! Parsing of inbound messages: an `rpc-reply` or a `notification`.
//!
//! The original client unmarshals straight into a tagged struct per
//! message kind (`message/rpc.go::RPCReply`, `message/notification.go`)
//! and separately stashes the raw bytes it was given (`RawReply`/
//! `RawReply` fields) because that raw XML — not the handful of fields
//! the struct pulls out — is usually what a caller actually wants (the
//! `<data>` of a `get-config` reply, say). We do the same, but through
//! `quick_xml`'s event reader rather than serde, because the shape of an
//! inbound message (how many `rpc-error`s, whether there's a
//! `push-update`) isn't known up front the way a request's shape is.

use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::Reader;
use thiserror::Error;

/// Errors raised while classifying or parsing an inbound message.
///
/// Per the session engine's contract these are logged and the receive
/// loop continues — an unparseable or unrecognized message never panics
/// and never kills the session by itself (a raw framing error does; see
/// `crate::framing::FramingError`).
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("unknown received message: unexpected root element {0:?}")]
    UnknownRoot(String),
    #[error("xml parse failure: {0}")]
    Xml(String),
}

/// A reply to an RPC, or an asynchronous notification — whichever the
/// receive loop classified the inbound message as.
#[derive(Debug, Clone)]
pub enum Reply {
    RpcReply(RpcReply),
    Notification(Notification),
}

/// An `<rpc-reply>`.
#[derive(Debug, Clone)]
pub struct RpcReply {
    /// The `message-id` attribute, used by the dispatcher to correlate
    /// this reply with the request that produced it.
    pub message_id: Option<String>,
    /// Whether the reply carried a bare `<ok/>` marker.
    pub ok: bool,
    /// Zero or more `<rpc-error>` children.
    pub errors: Vec<RpcError>,
    /// The raw XML found between the `<rpc-reply>` tags.
    pub raw_inner: String,
    /// The complete, unmodified message as received.
    pub raw_full: String,
}

impl RpcReply {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// One `<rpc-error>` child of an `<rpc-reply>`.
///
/// Implements [`std::error::Error`] so a `Vec<RpcError>` can be surfaced
/// directly as the cause of a higher-level failure (see
/// `crate::Error::RpcErrors`).
#[derive(Debug, Clone, Default, Error)]
#[error("netconf rpc [{severity}] '{message}'")]
pub struct RpcError {
    pub error_type: String,
    pub tag: String,
    pub severity: String,
    pub path: String,
    pub message: String,
    pub info: String,
}

/// A `<notification>` (RFC 5277 §4, RFC 8639 push updates).
#[derive(Debug, Clone)]
pub struct Notification {
    pub event_time: String,
    /// The subscription this notification belongs to, if the payload
    /// carried one. Absent for a plain `create-subscription` stream,
    /// where the session instead dispatches under the well-known default
    /// stream key (see `crate::dispatch::DEFAULT_NOTIFICATION_STREAM`).
    pub subscription_id: Option<String>,
    pub raw_inner: String,
    pub raw_full: String,
}

/// Parses one complete inbound message and classifies it by root element.
pub fn parse(raw: &[u8]) -> Result<Reply, ProtocolError> {
    let text = std::str::from_utf8(raw).map_err(|e| ProtocolError::Xml(e.to_string()))?;
    let root = root_element_name(text)?;
    match root.as_str() {
        "rpc-reply" => Ok(Reply::RpcReply(parse_rpc_reply(text)?)),
        "notification" => Ok(Reply::Notification(parse_notification(text)?)),
        other => Err(ProtocolError::UnknownRoot(other.to_string())),
    }
}

fn root_element_name(text: &str) -> Result<String, ProtocolError> {
    let mut reader = Reader::from_str(text);
    let mut buf = Vec::new();
    loop {
        match reader
            .read_event_into(&mut buf)
            .map_err(|e| ProtocolError::Xml(e.to_string()))?
        {
            Event::Start(start) | Event::Empty(start) => return Ok(local_name(&start)),
            Event::Eof => return Err(ProtocolError::Xml("empty message".to_string())),
            _ => {}
        }
        buf.clear();
    }
}

/// Extracts the raw XML strictly between `<root_name ...>` and
/// `</root_name>`, mirroring the original's `innerxml` capture. A
/// self-closing root has no inner content.
fn raw_inner_xml(text: &str, root_name: &str) -> String {
    let open_end = match text.find('>') {
        Some(i) => i + 1,
        None => return String::new(),
    };
    let close_tag = format!("</{root_name}>");
    match text.rfind(&close_tag) {
        Some(i) if i >= open_end => text[open_end..i].trim().to_string(),
        _ => String::new(),
    }
}

#[derive(Default)]
struct RpcErrorBuilder {
    error_type: String,
    tag: String,
    severity: String,
    path: String,
    message: String,
    info: String,
}

impl RpcErrorBuilder {
    fn build(self) -> RpcError {
        RpcError {
            error_type: self.error_type,
            tag: self.tag,
            severity: self.severity,
            path: self.path,
            message: self.message,
            info: self.info,
        }
    }
}

fn parse_rpc_reply(text: &str) -> Result<RpcReply, ProtocolError> {
    let mut reader = Reader::from_str(text);
    let mut buf = Vec::new();
    let mut path: Vec<String> = Vec::new();
    let mut pending = String::new();
    let mut message_id = None;
    let mut ok = false;
    let mut errors = Vec::new();
    let mut current: Option<RpcErrorBuilder> = None;

    loop {
        match reader
            .read_event_into(&mut buf)
            .map_err(|e| ProtocolError::Xml(e.to_string()))?
        {
            Event::Start(start) => {
                let name = local_name(&start);
                if path.is_empty() && name == "rpc-reply" {
                    message_id = find_attr(&start, "message-id");
                }
                if name == "rpc-error" {
                    current = Some(RpcErrorBuilder::default());
                }
                path.push(name);
                pending.clear();
            }
            Event::Empty(start) => {
                let name = local_name(&start);
                if name == "ok" {
                    ok = true;
                }
                if path.is_empty() && name == "rpc-reply" {
                    message_id = find_attr(&start, "message-id");
                }
            }
            Event::Text(t) => pending.push_str(&decode_text(&t)),
            Event::CData(t) => pending.push_str(&String::from_utf8_lossy(&t)),
            Event::End(_) => {
                let name = path.pop().unwrap_or_default();
                match name.as_str() {
                    "ok" => ok = true,
                    "error-type" => set_current(&mut current, |c| c.error_type = pending.trim().to_string()),
                    "error-tag" => set_current(&mut current, |c| c.tag = pending.trim().to_string()),
                    "error-severity" => set_current(&mut current, |c| c.severity = pending.trim().to_string()),
                    "error-path" => set_current(&mut current, |c| c.path = pending.trim().to_string()),
                    "error-message" => set_current(&mut current, |c| c.message = pending.trim().to_string()),
                    "error-info" => set_current(&mut current, |c| c.info = pending.trim().to_string()),
                    "rpc-error" => {
                        if let Some(c) = current.take() {
                            errors.push(c.build());
                        }
                    }
                    _ => {}
                }
                pending.clear();
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(RpcReply {
        message_id,
        ok,
        errors,
        raw_inner: raw_inner_xml(text, "rpc-reply"),
        raw_full: text.trim().to_string(),
    })
}

fn set_current(current: &mut Option<RpcErrorBuilder>, f: impl FnOnce(&mut RpcErrorBuilder)) {
    if let Some(c) = current.as_mut() {
        f(c);
    }
}

fn parse_notification(text: &str) -> Result<Notification, ProtocolError> {
    let mut reader = Reader::from_str(text);
    let mut buf = Vec::new();
    let mut path: Vec<String> = Vec::new();
    let mut pending = String::new();
    let mut event_time = None;
    let mut push_update_id = None;
    let mut push_update_subscription_id = None;

    loop {
        match reader
            .read_event_into(&mut buf)
            .map_err(|e| ProtocolError::Xml(e.to_string()))?
        {
            Event::Start(start) => {
                path.push(local_name(&start));
                pending.clear();
            }
            Event::Text(t) => pending.push_str(&decode_text(&t)),
            Event::End(_) => {
                let name = path.pop().unwrap_or_default();
                let mut full_path = path.clone();
                full_path.push(name);
                match full_path.join("/").as_str() {
                    "notification/eventTime" => event_time = Some(pending.trim().to_string()),
                    "notification/push-update/id" => push_update_id = Some(pending.trim().to_string()),
                    "notification/push-update/subscription-id" => {
                        push_update_subscription_id = Some(pending.trim().to_string())
                    }
                    _ => {}
                }
                pending.clear();
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    let event_time = event_time
        .ok_or_else(|| ProtocolError::Xml("notification missing eventTime".to_string()))?;
    let subscription_id = push_update_id
        .filter(|s| !s.is_empty())
        .or_else(|| push_update_subscription_id.filter(|s| !s.is_empty()));

    Ok(Notification {
        event_time,
        subscription_id,
        raw_inner: raw_inner_xml(text, "notification"),
        raw_full: text.trim().to_string(),
    })
}

fn local_name(start: &BytesStart) -> String {
    String::from_utf8_lossy(start.local_name().as_ref()).into_owned()
}

fn decode_text(text: &BytesText) -> String {
    text.unescape().map(|c| c.into_owned()).unwrap_or_default()
}

fn find_attr(start: &BytesStart, name: &str) -> Option<String> {
    start
        .attributes()
        .filter_map(|a| a.ok())
        .find(|a| a.key.as_ref() == name.as_bytes())
        .map(|a| String::from_utf8_lossy(&a.value).into_owned())
}
