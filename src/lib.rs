//! A NETCONF client library core.
//!
//! This crate implements the client-side session management, message
//! catalog, transport framing, and notification dispatch defined by
//! RFC 6241 (NETCONF), RFC 5277 (notifications), RFC 8639/8641
//! (subscribed notifications), and RFC 6242 (transport framing).
//!
//! ## Main components
//!
//! - [`framing`]: the two wire framings a session can negotiate
//!   (end-of-message and chunked) and the buffered reader shared by both.
//! - [`message`]: the request catalog (one builder per operation) and the
//!   reply/notification/hello parsers.
//! - [`dispatch`]: the correlation registry that routes an inbound
//!   `rpc-reply` or notification to the call site that is waiting on it.
//! - [`transport`]: the `Transport` trait and its default implementation
//!   over any duplex byte stream; this crate does not establish SSH
//!   connections itself (see non-goals in the design notes) — callers
//!   supply an already-authenticated channel.
//! - [`session`]: the `Session` engine that ties the above together:
//!   hello negotiation, the background receive loop, and the
//!   synchronous/asynchronous RPC and notification-subscription façade.
//!
//! ## Usage
//!
//! ```no_run
//! use std::time::Duration;
//! use netconf_mamont::message::{builders::get_config, Datastore};
//! use netconf_mamont::session::{Session, SessionOptions};
//!
//! # async fn example(io: tokio::net::TcpStream) -> Result<(), netconf_mamont::Error> {
//! let session = Session::connect(io, SessionOptions::default()).await?;
//! let request = get_config::build(Datastore::Running, None)?;
//! let reply = session.sync_rpc(request, Duration::from_secs(30)).await?;
//! assert!(reply.is_ok());
//! # Ok(())
//! # }
//! ```

pub mod dispatch;
mod error;
pub mod framing;
pub mod message;
pub mod session;
pub mod transport;

pub use error::Error;
