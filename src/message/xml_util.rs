//! Shared XML helpers for the message catalog.
//!
//! Request payloads are assembled by hand rather than through serde,
//! because the catalog only ever nests a handful of fixed elements
//! around an opaque, already-serialized XML fragment (a filter or a
//! config body) — there is nothing a derive would buy here that string
//! assembly doesn't already give more directly, and it keeps full control
//! over attribute order, which the end-to-end wire-format scenarios in
//! the spec pin down exactly. Reply parsing (`message::reply`) is the
//! inverse problem — shape is unknown until the root element is seen —
//! and uses `quick_xml`'s event reader instead.

use quick_xml::events::Event;
use quick_xml::Reader;

use super::ConstructionError;

/// The default NETCONF base namespace (RFC 6241 §3).
pub const BASE_NS: &str = "urn:ietf:params:xml:ns:netconf:base:1.0";

/// The notifications namespace (RFC 5277 §2, RFC 8639).
pub const NOTIFICATION_NS: &str = "urn:ietf:params:xml:ns:netconf:notification:1.0";

/// The subscribed-notifications YANG module namespace used by
/// `establish-subscription` (RFC 8639 / RFC 8640).
pub const SUBSCRIBED_NOTIFICATIONS_NS: &str =
    "urn:ietf:params:xml:ns:yang:ietf-subscribed-notifications";

/// Wraps `body` in the standard `<rpc>` envelope with the given
/// `message_id`, producing the exact bytes that are written to the wire.
pub fn rpc_envelope(message_id: &str, body: &str) -> Vec<u8> {
    format!(r#"<rpc xmlns="{BASE_NS}" message-id="{message_id}">{body}</rpc>"#).into_bytes()
}

/// Validates that `fragment` is well-formed XML (balanced tags, no parse
/// errors), mirroring the original client's practice of round-tripping a
/// fragment through `encoding/xml` purely to surface a parse error before
/// a request is ever sent.
pub fn validate_well_formed_xml(fragment: &str) -> Result<(), ConstructionError> {
    let mut reader = Reader::from_str(fragment);
    let mut buf = Vec::new();
    let mut depth: i32 = 0;
    let mut saw_root = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(_)) => {
                depth += 1;
                saw_root = true;
            }
            Ok(Event::Empty(_)) => {
                saw_root = true;
            }
            Ok(Event::End(_)) => {
                depth -= 1;
                if depth < 0 {
                    return Err(ConstructionError::MalformedXml(
                        "unbalanced closing tag".to_string(),
                    ));
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(ConstructionError::MalformedXml(e.to_string())),
        }
        buf.clear();
    }

    if !saw_root || depth != 0 {
        return Err(ConstructionError::MalformedXml(
            "no well-formed root element found".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_fragment() {
        validate_well_formed_xml(r#"<top xmlns="http://example.com/schema/1.2/config"><users/></top>"#)
            .unwrap();
    }

    #[test]
    fn accepts_multiple_top_level_elements() {
        validate_well_formed_xml("<stream>NETCONF</stream><stopTime>2021-01-01T00:00:00Z</stopTime>")
            .unwrap();
    }

    #[test]
    fn rejects_malformed_fragment() {
        let err = validate_well_formed_xml("<<top></top>").unwrap_err();
        assert!(matches!(err, ConstructionError::MalformedXml(_)));
    }

    #[test]
    fn rejects_unbalanced_fragment() {
        let err = validate_well_formed_xml("<top></top></top>").unwrap_err();
        assert!(matches!(err, ConstructionError::MalformedXml(_)));
    }

    #[test]
    fn envelope_matches_expected_shape() {
        let bytes = rpc_envelope("abc-123", "<commit/>");
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(
            text,
            r#"<rpc xmlns="urn:ietf:params:xml:ns:netconf:base:1.0" message-id="abc-123"><commit/></rpc>"#
        );
    }
}
