use crate::message::id::generate_message_id;
use crate::message::request::{ConstructionError, OperationKind, Request};
use crate::message::xml_util::rpc_envelope;

/// Builds a `commit` request (RFC 6241 §8.3.4.1).
pub fn build() -> Result<Request, ConstructionError> {
    let message_id = generate_message_id();
    Ok(Request {
        message_id: message_id.clone(),
        operation: OperationKind::Commit,
        payload: rpc_envelope(&message_id, "<commit/>"),
    })
}
