//! The outgoing request model: a fully-built `<rpc>` body plus enough
//! metadata (its message-id, its kind) for the dispatcher and the session
//! layer to route it and match its reply.
//!
//! Requests are built, never mutated: each catalog function in
//! [`crate::message::builders`] validates its arguments and returns either
//! a finished [`Request`] or a [`ConstructionError`] — there is no partial
//! or invalid `Request` value to observe.

use thiserror::Error;

/// Which catalog operation produced a [`Request`].
///
/// Mirrors the original client's per-message Go types (`GetReq`,
/// `EditConfigReq`, …); kept here as a plain tag rather than one type per
/// operation because every request collapses to the same wire shape (a
/// message-id and a body) once built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Get,
    GetConfig,
    EditConfig,
    Lock,
    Unlock,
    Validate,
    Commit,
    CloseSession,
    KillSession,
    CreateSubscription,
    EstablishSubscription,
    Raw,
}

/// A datastore target, as used by `get-config`, `edit-config`, `lock`,
/// `unlock`, and `validate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Datastore {
    Running,
    Candidate,
}

impl Datastore {
    pub(crate) fn element_name(self) -> &'static str {
        match self {
            Datastore::Running => "running",
            Datastore::Candidate => "candidate",
        }
    }
}

impl std::str::FromStr for Datastore {
    type Err = ConstructionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "running" => Ok(Datastore::Running),
            "candidate" => Ok(Datastore::Candidate),
            other => Err(ConstructionError::UnsupportedDatastore(other.to_string())),
        }
    }
}

/// The filter mechanism used by `get` and `get-config`.
///
/// RFC 6241 also defines an `xpath` filter type, gated on the server
/// advertising the `:xpath` capability; it is out of scope here (see
/// non-goals) and so only `subtree` is representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    Subtree,
}

impl std::str::FromStr for FilterType {
    type Err = ConstructionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "subtree" => Ok(FilterType::Subtree),
            other => Err(ConstructionError::UnsupportedFilterType(other.to_string())),
        }
    }
}

/// The `default-operation` attribute of an `edit-config` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultOperation {
    Merge,
    Replace,
    None,
}

impl DefaultOperation {
    pub(crate) fn attr_value(self) -> &'static str {
        match self {
            DefaultOperation::Merge => "merge",
            DefaultOperation::Replace => "replace",
            DefaultOperation::None => "none",
        }
    }
}

impl std::str::FromStr for DefaultOperation {
    type Err = ConstructionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "merge" => Ok(DefaultOperation::Merge),
            "replace" => Ok(DefaultOperation::Replace),
            "none" => Ok(DefaultOperation::None),
            other => Err(ConstructionError::UnsupportedDefaultOperation(
                other.to_string(),
            )),
        }
    }
}

/// A fully-built outgoing request: an `<rpc>`-wrapped XML body tagged with
/// the message-id that the dispatcher will use to correlate the reply.
#[derive(Debug, Clone)]
pub struct Request {
    pub message_id: String,
    pub operation: OperationKind,
    pub payload: Vec<u8>,
}

/// Errors raised while building a [`Request`]. These are all caller
/// mistakes (an unsupported datastore, a malformed filter or config
/// fragment) detected before anything is sent — a `Request` that failed
/// construction is never returned, so there is nothing partial to clean up.
#[derive(Debug, Error)]
pub enum ConstructionError {
    #[error("unsupported datastore: {0:?}")]
    UnsupportedDatastore(String),

    #[error("unsupported filter type: {0:?}")]
    UnsupportedFilterType(String),

    #[error("unsupported default-operation: {0:?}")]
    UnsupportedDefaultOperation(String),

    #[error("xml fragment does not parse: {0}")]
    MalformedXml(String),

    #[error("edit-config requires a non-empty config fragment")]
    EmptyConfig,
}
