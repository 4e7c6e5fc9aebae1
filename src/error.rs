//! Crate-wide error types.
//!
//! The protocol distinguishes four error classes (see module docs on
//! `framing`, `message`, `session`, and `message::reply::RpcError`). This
//! module only unifies them for the handful of call sites that need a
//! single return type; most APIs return their own narrower error enum.

use crate::framing::FramingError;
use crate::message::{ConstructionError, ProtocolError};

/// Top-level error returned by the high-level [`crate::session::Session`] API.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Framing(#[from] FramingError),

    #[error(transparent)]
    Construction(#[from] ConstructionError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),

    #[error("timeout while executing request")]
    Timeout,

    #[error("session is closed")]
    Closed,

    #[error("a notification stream is already active on this session")]
    NotificationStreamAlreadyActive,

    #[error("rpc reply carried one or more rpc-error elements: {0:?}")]
    RpcErrors(Vec<crate::message::RpcError>),
}
