use crate::message::id::generate_message_id;
use crate::message::request::{ConstructionError, Datastore, OperationKind, Request};
use crate::message::xml_util::rpc_envelope;

/// Builds a `validate` request (RFC 6241 §8.6).
pub fn build(source: Datastore) -> Result<Request, ConstructionError> {
    let message_id = generate_message_id();
    let name = source.element_name();
    let body = format!("<validate><source><{name}></{name}></source></validate>");
    Ok(Request {
        message_id: message_id.clone(),
        operation: OperationKind::Validate,
        payload: rpc_envelope(&message_id, &body),
    })
}
