use crate::message::id::generate_message_id;
use crate::message::request::{ConstructionError, Datastore, DefaultOperation, OperationKind, Request};
use crate::message::xml_util::{rpc_envelope, validate_well_formed_xml};

/// Builds an `edit-config` request (RFC 6241 §7.2).
pub fn build(
    target: Datastore,
    default_operation: Option<DefaultOperation>,
    config: &str,
) -> Result<Request, ConstructionError> {
    if config.trim().is_empty() {
        return Err(ConstructionError::EmptyConfig);
    }
    validate_well_formed_xml(config)?;

    let message_id = generate_message_id();
    let target_name = target.element_name();

    let default_op_xml = match default_operation {
        Some(op) => format!("<default-operation>{}</default-operation>", op.attr_value()),
        None => String::new(),
    };

    let body = format!(
        "<edit-config><target><{target_name}></{target_name}></target>{default_op_xml}<config>{config}</config></edit-config>"
    );

    Ok(Request {
        message_id: message_id.clone(),
        operation: OperationKind::EditConfig,
        payload: rpc_envelope(&message_id, &body),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"<top xmlns="http://example.com/schema/1.2/config"><users/></top>"#;

    #[test]
    fn merge_edit_config_matches_literal_scenario() {
        let req = build(Datastore::Running, Some(DefaultOperation::Merge), CONFIG).unwrap();
        let text = String::from_utf8(req.payload).unwrap();
        assert!(text.contains("<edit-config><target><running></running></target><default-operation>merge</default-operation><config>"));
        assert!(text.contains(CONFIG));
        assert!(text.ends_with("</config></edit-config></rpc>"));
    }

    #[test]
    fn empty_config_is_rejected() {
        assert!(matches!(
            build(Datastore::Running, Some(DefaultOperation::Merge), ""),
            Err(ConstructionError::EmptyConfig)
        ));
    }

    #[test]
    fn malformed_config_is_rejected() {
        assert!(build(Datastore::Running, None, "<top>").is_err());
    }
}
