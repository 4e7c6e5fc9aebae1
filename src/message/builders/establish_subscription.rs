use crate::message::id::generate_message_id;
use crate::message::request::{ConstructionError, OperationKind, Request};
use crate::message::xml_util::{rpc_envelope, validate_well_formed_xml, SUBSCRIBED_NOTIFICATIONS_NS};

/// Builds an `establish-subscription` request (RFC 8639 §2.4.1).
///
/// Unlike `create-subscription`, there is no fixed set of child elements
/// here: per RFC 8640's `ietf-yang-push` augmentations a caller may ask
/// for an on-change or periodic subscription, a datastore, or a
/// subtree/xpath filter, so this accepts the caller's already-serialized
/// inner XML (e.g. `<stream>NETCONF</stream><stream-filter-name>…`) and
/// only validates that it parses, exactly as the catalog table specifies.
pub fn build(inner_xml: &str) -> Result<Request, ConstructionError> {
    validate_well_formed_xml(inner_xml)?;

    let message_id = generate_message_id();
    let body = format!(
        r#"<establish-subscription xmlns="{SUBSCRIBED_NOTIFICATIONS_NS}">{inner_xml}</establish-subscription>"#
    );

    Ok(Request {
        message_id: message_id.clone(),
        operation: OperationKind::EstablishSubscription,
        payload: rpc_envelope(&message_id, &body),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn establish_subscription_wraps_inner_xml() {
        let req = build("<stream>NETCONF</stream>").unwrap();
        let text = String::from_utf8(req.payload).unwrap();
        assert!(text.contains(&format!(
            r#"<establish-subscription xmlns="{SUBSCRIBED_NOTIFICATIONS_NS}"><stream>NETCONF</stream></establish-subscription>"#
        )));
    }

    #[test]
    fn malformed_inner_xml_is_rejected() {
        assert!(build("<stream>").is_err());
    }
}
