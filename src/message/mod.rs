//! The message catalog (C2): building request XML and parsing reply and
//! notification XML.
//!
//! Grounded on the original client's `message/` package — one Go file
//! per message type, each with a constructor and an XML-tagged struct —
//! but reshaped around a single [`Request`] value (rather than one type
//! per operation) because every request collapses to the same wire shape
//! once built, and around hand-assembled XML (rather than struct tags)
//! because the catalog only ever nests a handful of fixed elements.

pub mod builders;
mod hello;
mod id;
mod reply;
mod request;
mod xml_util;

pub use hello::{parse as parse_hello, Hello, DEFAULT_CAPABILITIES};
pub use id::generate_message_id;
pub use reply::{parse as parse_reply, Notification, ProtocolError, Reply, RpcError, RpcReply};
pub use request::{ConstructionError, Datastore, DefaultOperation, FilterType, OperationKind, Request};
pub use xml_util::{BASE_NS, NOTIFICATION_NS, SUBSCRIBED_NOTIFICATIONS_NS};
