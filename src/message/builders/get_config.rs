use crate::message::id::generate_message_id;
use crate::message::request::{ConstructionError, Datastore, FilterType, OperationKind, Request};
use crate::message::xml_util::{rpc_envelope, validate_well_formed_xml};

/// Builds a `get-config` request (RFC 6241 §7.1).
pub fn build(
    source: Datastore,
    filter: Option<(FilterType, &str)>,
) -> Result<Request, ConstructionError> {
    let message_id = generate_message_id();
    let source_name = source.element_name();

    let filter_xml = match filter {
        Some((FilterType::Subtree, xml)) if !xml.is_empty() => {
            validate_well_formed_xml(xml)?;
            format!(r#"<filter type="subtree">{xml}</filter>"#)
        }
        _ => String::new(),
    };

    let body = format!(
        "<get-config><source><{source_name}></{source_name}></source>{filter_xml}</get-config>"
    );

    Ok(Request {
        message_id: message_id.clone(),
        operation: OperationKind::GetConfig,
        payload: rpc_envelope(&message_id, &body),
    })
}
