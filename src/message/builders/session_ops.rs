//! `close-session` and `kill-session` (RFC 6241 §7.8), grouped together
//! as they are in the original client's `message/session.go`.

use crate::message::id::generate_message_id;
use crate::message::request::{ConstructionError, OperationKind, Request};
use crate::message::xml_util::rpc_envelope;

pub fn build_close_session() -> Result<Request, ConstructionError> {
    let message_id = generate_message_id();
    Ok(Request {
        message_id: message_id.clone(),
        operation: OperationKind::CloseSession,
        payload: rpc_envelope(&message_id, "<close-session/>"),
    })
}

pub fn build_kill_session(session_id: &str) -> Result<Request, ConstructionError> {
    let message_id = generate_message_id();
    let body = format!("<kill-session><session-id>{session_id}</session-id></kill-session>");
    Ok(Request {
        message_id: message_id.clone(),
        operation: OperationKind::KillSession,
        payload: rpc_envelope(&message_id, &body),
    })
}
