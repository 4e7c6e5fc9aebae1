use crate::message::request::{ConstructionError, FilterType, OperationKind, Request};
use crate::message::xml_util::{rpc_envelope, validate_well_formed_xml};
use crate::message::id::generate_message_id;

/// Builds a `get` request (RFC 6241 §7.7).
///
/// `filter` is `(filter-type, filter-xml)`; `None` requests the entire
/// datastore. An empty `filter-xml` is treated the same as `None` — an
/// empty filter adds nothing for the server to filter on.
pub fn build(filter: Option<(FilterType, &str)>) -> Result<Request, ConstructionError> {
    let message_id = generate_message_id();

    let body = match filter {
        Some((FilterType::Subtree, xml)) if !xml.is_empty() => {
            validate_well_formed_xml(xml)?;
            format!(r#"<get><filter type="subtree">{xml}</filter></get>"#)
        }
        _ => "<get/>".to_string(),
    };

    Ok(Request {
        message_id: message_id.clone(),
        operation: OperationKind::Get,
        payload: rpc_envelope(&message_id, &body),
    })
}
