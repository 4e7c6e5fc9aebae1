//! The request catalog: one builder per RFC 6241/5277/8639 operation,
//! each returning a fully-formed [`crate::message::Request`] or a
//! [`crate::message::ConstructionError`]. This mirrors the original
//! client's one-file-per-message-type layout under `message/`.

pub mod commit;
pub mod create_subscription;
pub mod edit_config;
pub mod establish_subscription;
pub mod get;
pub mod get_config;
pub mod lock;
pub mod raw;
pub mod session_ops;
pub mod unlock;
pub mod validate;

pub use create_subscription::CreateSubscriptionParams;
