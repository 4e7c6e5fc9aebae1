//! The session engine (C4) and operations façade (C5).
//!
//! A `Session` owns exactly one transport and exactly one dispatcher
//! (§3). Construction performs the hello exchange and spawns the
//! background receive task; from then on `send`-side calls
//! (`async_rpc`/`sync_rpc`/`create_notification_stream`) may run
//! concurrently with each other and with the receive task, exactly as
//! the teacher's `NFSTcpListener` spawns one task per accepted
//! connection while the listener itself keeps accepting — here there is
//! one long-lived connection and the split is between the (many) sender
//! call sites and the (one) background receiver instead.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info, instrument, warn};

use crate::dispatch::{DispatchKind, Dispatcher, DispatchedMessage, DEFAULT_NOTIFICATION_STREAM};
use crate::framing::FramingVersion;
use crate::message::builders::{self, CreateSubscriptionParams};
use crate::message::{self, Hello, Notification, Request, Reply, RpcReply, DEFAULT_CAPABILITIES};
use crate::transport::{DuplexTransport, Transport};
use crate::Error;

/// Construction-time and per-session tuning. Grounded on the original
/// client's variadic `SessionOption` constructors (`WithCapabilities`,
/// and friends) — here expressed as ordinary struct fields since Rust
/// favors a builder/`Default` struct over a variadic-options list.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Capabilities advertised in the local hello. Defaults to both
    /// framing versions so the peer may pick whichever it supports.
    pub capabilities: Vec<String>,
    /// How long to wait for the hello exchange to complete before giving
    /// up on the connection.
    pub hello_timeout: Duration,
    /// Block size used by the transport's streaming reader.
    pub read_block_size: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            capabilities: DEFAULT_CAPABILITIES.iter().map(|s| s.to_string()).collect(),
            hello_timeout: Duration::from_secs(10),
            read_block_size: crate::framing::reader::DEFAULT_BLOCK_SIZE,
        }
    }
}

/// The session lifecycle (§4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    New,
    HelloWait,
    Operational,
    Closed,
    Failed,
}

/// A single NETCONF session: one transport, one dispatcher, one
/// background receive task.
pub struct Session {
    transport: Arc<dyn Transport>,
    dispatcher: Arc<Dispatcher>,
    state: Arc<Mutex<SessionState>>,
    session_id: Option<u32>,
    remote_capabilities: Vec<String>,
    has_notification_stream: AtomicBool,
    receive_task: Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl Session {
    /// Establishes a session over a raw duplex byte stream (e.g. an SSH
    /// channel), wrapping it in the default [`DuplexTransport`].
    pub async fn connect<R>(io: R, options: SessionOptions) -> Result<Self, Error>
    where
        R: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let transport = Arc::new(DuplexTransport::with_block_size(io, options.read_block_size));
        Self::new(transport, options).await
    }

    /// Establishes a session over an already-constructed [`Transport`]
    /// (test doubles use this directly; `connect` is the production
    /// entry point).
    #[instrument(skip(transport, options))]
    pub async fn new(transport: Arc<dyn Transport>, options: SessionOptions) -> Result<Self, Error> {
        let hello_deadline = options.hello_timeout;
        let (remote_hello, negotiated_version) =
            tokio::time::timeout(hello_deadline, Self::exchange_hello(&*transport, &options))
                .await
                .map_err(|_| Error::Timeout)??;

        transport.set_version(negotiated_version);
        info!(
            session_id = ?remote_hello.session_id,
            framing = ?negotiated_version,
            "netconf session operational"
        );

        let dispatcher = Arc::new(Dispatcher::new());
        let state = Arc::new(Mutex::new(SessionState::Operational));
        let receive_task = spawn_receive_loop(transport.clone(), dispatcher.clone(), state.clone());

        Ok(Self {
            transport,
            dispatcher,
            state,
            session_id: remote_hello.session_id,
            remote_capabilities: remote_hello.capabilities,
            has_notification_stream: AtomicBool::new(false),
            receive_task: Mutex::new(Some(receive_task)),
        })
    }

    /// Performs the hello exchange. The local hello is always sent under
    /// v1.0 (end-of-message) framing, before either side has had a
    /// chance to act on the other's capabilities — the source
    /// sometimes sends hello from the transport layer and sometimes
    /// from the session layer, but the canonical contract centralizes
    /// it here.
    async fn exchange_hello(
        transport: &dyn Transport,
        options: &SessionOptions,
    ) -> Result<(Hello, FramingVersion), Error> {
        let raw = transport.receive().await?;
        let remote_hello = message::parse_hello(&raw)?;

        let local_hello = Hello::new(options.capabilities.clone());
        transport.send(&local_hello.marshal()).await?;

        let version = if remote_hello.supports_chunked_framing() {
            FramingVersion::V11
        } else {
            FramingVersion::V10
        };
        Ok((remote_hello, version))
    }

    pub fn state(&self) -> SessionState {
        *self.state.lock().expect("session state mutex poisoned")
    }

    pub fn session_id(&self) -> Option<u32> {
        self.session_id
    }

    pub fn remote_capabilities(&self) -> &[String] {
        &self.remote_capabilities
    }

    fn ensure_operational(&self) -> Result<(), Error> {
        if self.state() == SessionState::Operational {
            Ok(())
        } else {
            Err(Error::Closed)
        }
    }

    /// Registers `callback` under the request's message-id and sends it,
    /// returning immediately. The callback fires exactly once, from the
    /// background receive task, when the matching `rpc-reply` arrives.
    pub async fn async_rpc<F>(&self, request: Request, callback: F) -> Result<(), Error>
    where
        F: Fn(RpcReply) + Send + Sync + 'static,
    {
        self.ensure_operational()?;
        let key = request.message_id.clone();
        self.dispatcher.register(key.clone(), move |message| {
            if let DispatchedMessage::RpcReply(reply) = message {
                callback(reply);
            }
        });

        if let Err(err) = self.transport.send(&request.payload).await {
            self.dispatcher.remove(&key);
            return Err(Error::Transport(err));
        }
        Ok(())
    }

    /// Equivalent to [`Session::async_rpc`] but waits for the reply (or
    /// `timeout` to elapse) before returning. The timeout is measured
    /// from send, not from registration.
    ///
    /// On timeout, the dispatcher entry is deliberately left in place:
    /// per the design notes, if the reply later arrives it will still
    /// fire (into a channel nobody is listening on anymore) and then
    /// remove itself, same as an ordinary rpc-reply dispatch. The
    /// channel has bounded (one-shot) capacity, so this cannot leak.
    pub async fn sync_rpc(&self, request: Request, timeout: Duration) -> Result<RpcReply, Error> {
        self.ensure_operational()?;
        let (tx, rx) = tokio::sync::oneshot::channel();
        let tx = Mutex::new(Some(tx));
        let key = request.message_id.clone();

        self.dispatcher.register(key.clone(), move |message| {
            if let DispatchedMessage::RpcReply(reply) = message {
                if let Some(tx) = tx.lock().expect("sync_rpc oneshot mutex poisoned").take() {
                    let _ = tx.send(reply);
                }
            }
        });

        if let Err(err) = self.transport.send(&request.payload).await {
            self.dispatcher.remove(&key);
            return Err(Error::Transport(err));
        }

        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(reply)) => Ok(reply),
            Ok(Err(_)) => Err(Error::Closed),
            Err(_) => Err(Error::Timeout),
        }
    }

    /// Subscribes to notifications, enforcing the single-active-stream
    /// restriction (§9): the source cannot attribute a plain
    /// `create-subscription` delivery to a specific subscription, so only
    /// one may be active per session at a time.
    pub async fn create_notification_stream<F>(
        &self,
        params: CreateSubscriptionParams<'_>,
        callback: F,
        timeout: Duration,
    ) -> Result<(), Error>
    where
        F: Fn(Notification) + Send + Sync + 'static,
    {
        self.ensure_operational()?;
        if self.has_notification_stream.swap(true, Ordering::SeqCst) {
            return Err(Error::NotificationStreamAlreadyActive);
        }

        self.dispatcher
            .register(DEFAULT_NOTIFICATION_STREAM, move |message| {
                if let DispatchedMessage::Notification(notification) = message {
                    callback(notification);
                }
            });

        let request = builders::create_subscription::build(params)?;
        match self.sync_rpc(request, timeout).await {
            Ok(reply) if reply.is_ok() => Ok(()),
            Ok(reply) => {
                self.dispatcher.remove(DEFAULT_NOTIFICATION_STREAM);
                self.has_notification_stream.store(false, Ordering::SeqCst);
                Err(Error::RpcErrors(reply.errors))
            }
            Err(err) => {
                self.dispatcher.remove(DEFAULT_NOTIFICATION_STREAM);
                self.has_notification_stream.store(false, Ordering::SeqCst);
                Err(err)
            }
        }
    }

    /// Marks the session closed and closes the underlying transport,
    /// which causes the receive task's next I/O to fail and the task to
    /// exit shortly afterward.
    pub async fn close(&self) -> Result<(), Error> {
        *self.state.lock().expect("session state mutex poisoned") = SessionState::Closed;
        self.transport.close().await.map_err(Error::Transport)?;
        if let Some(handle) = self.receive_task.lock().expect("receive task mutex poisoned").take() {
            let _ = handle.await;
        }
        Ok(())
    }

    /// Polls the dispatcher until it drains or `max_wait` elapses. Used
    /// at shutdown to give in-flight async callbacks a chance to fire.
    pub async fn wait_for_messages(&self, max_wait: Duration) {
        self.dispatcher.wait_for_messages(max_wait).await;
    }
}

fn spawn_receive_loop(
    transport: Arc<dyn Transport>,
    dispatcher: Arc<Dispatcher>,
    state: Arc<Mutex<SessionState>>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if *state.lock().expect("session state mutex poisoned") == SessionState::Closed {
                break;
            }
            match transport.receive().await {
                Ok(raw) => match message::parse_reply(&raw) {
                    Ok(Reply::RpcReply(reply)) => {
                        let key = reply.message_id.clone().unwrap_or_default();
                        dispatcher.dispatch(&key, DispatchKind::RpcReply, DispatchedMessage::RpcReply(reply));
                    }
                    Ok(Reply::Notification(notification)) => {
                        let key = notification
                            .subscription_id
                            .clone()
                            .unwrap_or_else(|| DEFAULT_NOTIFICATION_STREAM.to_string());
                        dispatcher.dispatch(
                            &key,
                            DispatchKind::Notification,
                            DispatchedMessage::Notification(notification),
                        );
                    }
                    Err(err) => {
                        warn!(error = %err, "dropping unparseable or unrecognized inbound message");
                    }
                },
                Err(err) => {
                    debug!(error = %err, "receive loop terminating");
                    let mut state = state.lock().expect("session state mutex poisoned");
                    if *state != SessionState::Closed {
                        *state = SessionState::Failed;
                    }
                    break;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::builders::get_config;
    use crate::message::Datastore;
    use crate::transport::DuplexTransport;
    use std::sync::atomic::AtomicUsize;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    fn hello_bytes(capabilities: &[&str], session_id: u32) -> Vec<u8> {
        let caps: String = capabilities
            .iter()
            .map(|c| format!("<capability>{c}</capability>"))
            .collect();
        format!(
            r#"<hello xmlns="urn:ietf:params:xml:ns:netconf:base:1.0"><capabilities>{caps}</capabilities><session-id>{session_id}</session-id></hello>]]>]]>"#
        )
        .into_bytes()
    }

    async fn established_pair(
        server_caps: &[&str],
    ) -> (Session, tokio::io::DuplexStream) {
        let (client_io, mut server_io) = tokio::io::duplex(65536);
        let server_hello = hello_bytes(server_caps, 4);

        let server_side = tokio::spawn(async move {
            server_io.write_all(&server_hello).await.unwrap();
            let mut buf = vec![0u8; 4096];
            let n = server_io.read(&mut buf).await.unwrap();
            buf.truncate(n);
            server_io
        });

        let session = Session::connect(client_io, SessionOptions::default()).await.unwrap();
        let server_io = server_side.await.unwrap();
        (session, server_io)
    }

    #[tokio::test]
    async fn hello_exchange_negotiates_chunked_framing_when_advertised() {
        let (session, _server_io) = established_pair(&[
            "urn:ietf:params:netconf:base:1.0",
            "urn:ietf:params:netconf:base:1.1",
        ])
        .await;
        assert_eq!(session.state(), SessionState::Operational);
        assert_eq!(session.session_id(), Some(4));
    }

    #[tokio::test]
    async fn hello_exchange_stays_on_eom_framing_without_1_1() {
        let (session, _server_io) =
            established_pair(&["urn:ietf:params:netconf:base:1.0"]).await;
        assert_eq!(session.state(), SessionState::Operational);
    }

    #[tokio::test]
    async fn sync_rpc_round_trips_a_reply() {
        let (session, mut server_io) = established_pair(&[
            "urn:ietf:params:netconf:base:1.0",
            "urn:ietf:params:netconf:base:1.1",
        ])
        .await;

        let request = get_config::build(Datastore::Running, None).unwrap();
        let message_id = request.message_id.clone();

        let responder = tokio::spawn(async move {
            let mut buf = vec![0u8; 4096];
            // Chunked framing negotiated: read header, chunk, terminator.
            let n = server_io.read(&mut buf).await.unwrap();
            buf.truncate(n);
            let reply = format!(
                r#"<rpc-reply message-id="{message_id}"><ok/></rpc-reply>"#
            );
            let framed = crate::framing::chunked::encode(reply.as_bytes());
            server_io.write_all(&framed).await.unwrap();
        });

        let reply = session
            .sync_rpc(request, Duration::from_secs(2))
            .await
            .unwrap();
        assert!(reply.ok);
        responder.await.unwrap();
    }

    #[tokio::test]
    async fn async_rpc_fires_callback_once() {
        let (session, mut server_io) = established_pair(&[
            "urn:ietf:params:netconf:base:1.0",
            "urn:ietf:params:netconf:base:1.1",
        ])
        .await;

        let request = get_config::build(Datastore::Running, None).unwrap();
        let message_id = request.message_id.clone();
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();

        let responder = tokio::spawn(async move {
            let mut buf = vec![0u8; 4096];
            let n = server_io.read(&mut buf).await.unwrap();
            buf.truncate(n);
            let reply = format!(r#"<rpc-reply message-id="{message_id}"><ok/></rpc-reply>"#);
            let framed = crate::framing::chunked::encode(reply.as_bytes());
            server_io.write_all(&framed).await.unwrap();
        });

        session
            .async_rpc(request, move |_reply| {
                calls_clone.fetch_add(1, Ordering::SeqCst);
            })
            .await
            .unwrap();

        session.wait_for_messages(Duration::from_secs(2)).await;
        responder.await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn second_notification_stream_is_rejected_while_one_is_active() {
        let (session, mut server_io) = established_pair(&[
            "urn:ietf:params:netconf:base:1.0",
            "urn:ietf:params:netconf:base:1.1",
        ])
        .await;

        let responder = tokio::spawn(async move {
            let mut buf = vec![0u8; 4096];
            loop {
                let n = server_io.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                // Respond to whichever message-id was used; parse it crudely.
                let text = String::from_utf8_lossy(&buf[..n]).into_owned();
                let start = text.find("message-id=\"").map(|i| i + 12);
                let message_id = start
                    .and_then(|s| text[s..].find('"').map(|e| text[s..s + e].to_string()));
                if let Some(message_id) = message_id {
                    let reply = format!(r#"<rpc-reply message-id="{message_id}"><ok/></rpc-reply>"#);
                    let framed = crate::framing::chunked::encode(reply.as_bytes());
                    server_io.write_all(&framed).await.unwrap();
                }
            }
        });

        session
            .create_notification_stream(
                CreateSubscriptionParams::default(),
                |_notification| {},
                Duration::from_secs(2),
            )
            .await
            .unwrap();

        let second = session
            .create_notification_stream(
                CreateSubscriptionParams::default(),
                |_notification| {},
                Duration::from_secs(2),
            )
            .await;
        assert!(matches!(second, Err(Error::NotificationStreamAlreadyActive)));

        session.close().await.unwrap();
        let _ = responder.await;
    }
}
