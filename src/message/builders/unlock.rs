use crate::message::id::generate_message_id;
use crate::message::request::{ConstructionError, Datastore, OperationKind, Request};
use crate::message::xml_util::rpc_envelope;

/// Builds an `unlock` request (RFC 6241 §7.6).
pub fn build(target: Datastore) -> Result<Request, ConstructionError> {
    let message_id = generate_message_id();
    let name = target.element_name();
    let body = format!("<unlock><target><{name}></{name}></target></unlock>");
    Ok(Request {
        message_id: message_id.clone(),
        operation: OperationKind::Unlock,
        payload: rpc_envelope(&message_id, &body),
    })
}
