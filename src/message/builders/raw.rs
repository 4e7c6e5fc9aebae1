use crate::message::id::generate_message_id;
use crate::message::request::{ConstructionError, OperationKind, Request};
use crate::message::xml_util::{rpc_envelope, validate_well_formed_xml};

/// Builds a raw, pass-through `<rpc>` whose body is supplied verbatim by
/// the caller, for operations outside the catalog (vendor RPCs, newer
/// standard operations this crate doesn't special-case yet).
pub fn build(body_xml: &str) -> Result<Request, ConstructionError> {
    validate_well_formed_xml(body_xml)?;
    let message_id = generate_message_id();
    Ok(Request {
        message_id: message_id.clone(),
        operation: OperationKind::Raw,
        payload: rpc_envelope(&message_id, body_xml),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_body_is_placed_inside_rpc_envelope_unmodified() {
        let req = build("<discard-changes/>").unwrap();
        let text = String::from_utf8(req.payload).unwrap();
        assert!(text.ends_with("<discard-changes/></rpc>"));
    }

    #[test]
    fn malformed_raw_body_is_rejected() {
        assert!(build("<discard-changes").is_err());
    }
}
