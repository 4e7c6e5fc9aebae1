//! The correlation dispatcher (C3): a registry keyed by message-id (for
//! RPC replies) or by subscription identifier (for notifications) that
//! routes inbound messages to the caller that originated them.
//!
//! Grounded on the teacher's `protocol::rpc::transaction_tracker::TransactionTracker`
//! (a `std::sync::Mutex`-guarded `HashMap` with a housekeeping pass run
//! inline on each access) — the same shape, generalized from
//! retransmission bookkeeping to callback routing.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{debug, trace, warn};

use crate::message::{Notification, RpcReply};

/// The correlation key used when a notification carries no
/// subscription-id of its own — the single-stream restriction (see
/// `crate::session` design notes) means there can only ever be one
/// registrant under this key at a time.
pub const DEFAULT_NOTIFICATION_STREAM: &str = "__default_notification_stream__";

/// A message handed to a dispatched callback, already classified.
#[derive(Debug, Clone)]
pub enum DispatchedMessage {
    RpcReply(RpcReply),
    Notification(Notification),
}

/// Which dispatch rule applies: `RpcReply` dispatches remove their
/// registry entry immediately after invoking the callback; `Notification`
/// dispatches leave the entry in place so it keeps receiving future
/// messages under the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchKind {
    RpcReply,
    Notification,
}

type Callback = Arc<dyn Fn(DispatchedMessage) + Send + Sync + 'static>;

/// The dispatcher. One instance is owned by each `crate::session::Session`.
#[derive(Default)]
pub struct Dispatcher {
    entries: Mutex<HashMap<String, Callback>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Registers `callback` under `key`. Per the single-entry invariant,
    /// a prior registration under the same key is silently replaced — a
    /// session-level precondition (e.g. the single-notification-stream
    /// check in `crate::session`) is responsible for guarding against
    /// that being a mistake.
    pub fn register<F>(&self, key: impl Into<String>, callback: F)
    where
        F: Fn(DispatchedMessage) + Send + Sync + 'static,
    {
        let key = key.into();
        let mut entries = self.entries.lock().expect("dispatcher mutex poisoned");
        entries.insert(key, Arc::new(callback));
    }

    /// Removes any registration under `key`, returning whether one existed.
    pub fn remove(&self, key: &str) -> bool {
        let mut entries = self.entries.lock().expect("dispatcher mutex poisoned");
        entries.remove(key).is_some()
    }

    /// Looks up `key`, drops the lock, then invokes the callback outside
    /// the critical section — recursive registration from within a
    /// callback must not deadlock. A miss is a silent no-op: the message
    /// is logged and discarded, matching sessions that receive a reply
    /// for a request nobody is waiting on anymore (e.g. after a SyncRPC
    /// timeout already consumed the entry).
    pub fn dispatch(&self, key: &str, kind: DispatchKind, message: DispatchedMessage) {
        let callback = {
            let mut entries = self.entries.lock().expect("dispatcher mutex poisoned");
            match kind {
                DispatchKind::RpcReply => entries.remove(key),
                DispatchKind::Notification => entries.get(key).cloned(),
            }
        };

        match callback {
            Some(callback) => {
                trace!(key, ?kind, "dispatching message to registered callback");
                callback(message);
            }
            None => {
                debug!(key, ?kind, "no registered callback for inbound message, discarding");
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().expect("dispatcher mutex poisoned").is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("dispatcher mutex poisoned").len()
    }

    /// Polls until the registry drains or `max_wait` elapses, backing off
    /// up to one second between polls. Used at shutdown to give
    /// in-flight callbacks a chance to fire before the transport closes;
    /// there is no way to be notified synchronously, so this is a
    /// deliberate poll loop rather than a condvar (mirrors the source,
    /// which has the same limitation — see crate-level design notes).
    pub async fn wait_for_messages(&self, max_wait: Duration) {
        let start = tokio::time::Instant::now();
        let mut backoff = Duration::from_millis(10);
        while !self.is_empty() {
            if start.elapsed() >= max_wait {
                warn!(
                    remaining = self.len(),
                    "wait_for_messages timed out with entries still registered"
                );
                return;
            }
            tokio::time::sleep(backoff).await;
            backoff = (backoff * 2).min(Duration::from_secs(1));
        }
    }
}
