use std::collections::HashMap;
use std::sync::mpsc::{sync_channel, Receiver, SyncSender};
use std::sync::{Mutex, PoisonError};

use rpclink_proto::ResponseError;
use serde_json::Value;

/// The (result, error) pair delivered into a pending call's slot.
#[derive(Debug)]
pub(crate) struct Reply {
    pub result: Option<Value>,
    pub error: Option<ResponseError>,
}

/// Correlation table: id → one-shot reply channel.
///
/// Each entry is created before its request is sent and removed by
/// exactly one of: delivery, timeout cleanup, or shutdown. Insert and
/// remove go through one lock, so a late delivery and a timeout can
/// never both consume the same entry. No two in-flight calls share an
/// id; the table holds at most one sender per id.
#[derive(Default)]
pub(crate) struct PendingCalls {
    slots: Mutex<HashMap<u64, SyncSender<Reply>>>,
}

impl PendingCalls {
    /// Register a waiter for `id`. Must happen before the request is
    /// sent, or a fast reply could find nobody to wake.
    pub fn register(&self, id: u64) -> Receiver<Reply> {
        let (tx, rx) = sync_channel(1);
        self.lock().insert(id, tx);
        rx
    }

    /// Deliver a reply to the waiter for `id`.
    ///
    /// Returns `false` when no entry exists — the call already timed
    /// out, or the response was unsolicited. The reply is discarded
    /// permanently in that case; late responses are never stored.
    pub fn complete(&self, id: u64, reply: Reply) -> bool {
        let sender = match self.lock().remove(&id) {
            Some(sender) => sender,
            None => return false,
        };
        // The slot holds capacity for the single reply; a send only
        // fails if the waiter already gave up, which is the same
        // silent-drop outcome.
        let _ = sender.try_send(reply);
        true
    }

    /// Remove a stale entry on the timeout or send-failure path.
    pub fn forget(&self, id: u64) {
        self.lock().remove(&id);
    }

    /// Drop every sender so all blocked waiters wake immediately.
    pub fn abort_all(&self) {
        self.lock().clear();
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<u64, SyncSender<Reply>>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
