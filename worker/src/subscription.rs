use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use camwall_core::{ConnectionState, LogEntry};
use tokio::sync::broadcast::{self, error::RecvError};

/// Change notification published by the dashboard worker.
#[derive(Debug, Clone)]
pub enum Update {
    /// Status, banner, slots or feed nonce changed.
    Wall,
    Connection(ConnectionState),
    Appended(LogEntry),
    /// The subscriber may have missed updates and should re-read snapshots.
    Resync,
}

/// A live view on dashboard updates.
///
/// The first update is always [`Update::Resync`], so a fresh subscriber
/// starts from a full snapshot.
pub struct Subscription {
    receiver: broadcast::Receiver<Update>,
    viewers: Arc<AtomicUsize>,
    primed: bool,
}

impl Subscription {
    pub(crate) fn new(receiver: broadcast::Receiver<Update>, viewers: Arc<AtomicUsize>) -> Self {
        viewers.fetch_add(1, Ordering::SeqCst);

        Self {
            receiver,
            viewers,
            primed: false,
        }
    }

    /// `None` once the worker is gone.
    pub async fn recv(&mut self) -> Option<Update> {
        if !self.primed {
            self.primed = true;
            return Some(Update::Resync);
        }

        match self.receiver.recv().await {
            Ok(update) => Some(update),
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!("subscription lagged by {skipped} updates, resyncing");
                Some(Update::Resync)
            }
            Err(RecvError::Closed) => None,
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.viewers.fetch_sub(1, Ordering::SeqCst);
    }
}
