use crate::message::id::generate_message_id;
use crate::message::request::{ConstructionError, OperationKind, Request};
use crate::message::xml_util::{rpc_envelope, validate_well_formed_xml, NOTIFICATION_NS};

/// Parameters accepted by `create-subscription` (RFC 5277 §2.1.1); every
/// field is optional — an all-`None` call subscribes to every event on
/// the default stream from now until the session closes.
#[derive(Debug, Clone, Default)]
pub struct CreateSubscriptionParams<'a> {
    pub stream: Option<&'a str>,
    pub start_time: Option<&'a str>,
    pub stop_time: Option<&'a str>,
    pub filter: Option<&'a str>,
}

pub fn build(params: CreateSubscriptionParams<'_>) -> Result<Request, ConstructionError> {
    if let Some(filter) = params.filter {
        if !filter.is_empty() {
            validate_well_formed_xml(filter)?;
        }
    }

    let message_id = generate_message_id();
    let mut inner = String::new();
    if let Some(stream) = params.stream {
        inner.push_str(&format!("<stream>{stream}</stream>"));
    }
    if let Some(start) = params.start_time {
        inner.push_str(&format!("<startTime>{start}</startTime>"));
    }
    if let Some(stop) = params.stop_time {
        inner.push_str(&format!("<stopTime>{stop}</stopTime>"));
    }
    if let Some(filter) = params.filter.filter(|f| !f.is_empty()) {
        inner.push_str(&format!("<filter>{filter}</filter>"));
    }

    let body = format!(r#"<create-subscription xmlns="{NOTIFICATION_NS}">{inner}</create-subscription>"#);

    Ok(Request {
        message_id: message_id.clone(),
        operation: OperationKind::CreateSubscription,
        payload: rpc_envelope(&message_id, &body),
    })
}
