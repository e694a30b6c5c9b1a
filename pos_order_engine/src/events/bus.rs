use std::{
    collections::HashMap,
    fmt::Display,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
        PoisonError,
        RwLock,
    },
};

use log::*;
use tokio_util::sync::CancellationToken;

use crate::events::{SessionQueue, StatusEvent};

pub const DEFAULT_SUBSCRIBER_QUEUE_SIZE: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(u64);

impl Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

impl SessionId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// A live-view subscription. Clones refer to the same subscription.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    id: SessionId,
    queue: Arc<SessionQueue>,
    cancel: CancellationToken,
}

impl SessionHandle {
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// The number of events discarded because this subscriber fell too far behind.
    pub fn dropped_events(&self) -> u64 {
        self.queue.dropped()
    }

    /// The number of events waiting to be delivered.
    pub fn pending_events(&self) -> usize {
        self.queue.len()
    }

    /// `false` once the session has been unsubscribed, torn down after a fault, or the bus has shut down.
    pub fn is_alive(&self) -> bool {
        !self.cancel.is_cancelled()
    }

    /// Takes the next queued event, if any.
    pub fn next_event(&self) -> Option<StatusEvent> {
        self.queue.pop()
    }

    pub(crate) fn queue(&self) -> &SessionQueue {
        &self.queue
    }

    /// Resolves when the session ends.
    pub async fn closed(&self) {
        self.cancel.cancelled().await
    }
}

struct BusInner {
    sessions: RwLock<HashMap<SessionId, SessionHandle>>,
    queue_capacity: usize,
    next_id: AtomicU64,
    shutdown: CancellationToken,
}

/// An in-process publish/subscribe hub for [`StatusEvent`]s.
///
/// Every subscriber owns a bounded queue. Publishing copies the event onto every queue without waiting for anyone;
/// a slow subscriber only ever loses its own oldest events.
///
/// Cloning the bus is cheap and all clones share the same set of subscribers.
#[derive(Clone)]
pub struct StatusEventBus {
    inner: Arc<BusInner>,
}

impl std::fmt::Debug for StatusEventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "StatusEventBus ({} subscribers)", self.subscriber_count())
    }
}

impl Default for StatusEventBus {
    fn default() -> Self {
        Self::new(DEFAULT_SUBSCRIBER_QUEUE_SIZE)
    }
}

impl StatusEventBus {
    pub fn new(queue_capacity: usize) -> Self {
        let inner = BusInner {
            sessions: RwLock::new(HashMap::new()),
            queue_capacity: queue_capacity.max(1),
            next_id: AtomicU64::new(1),
            shutdown: CancellationToken::new(),
        };
        Self { inner: Arc::new(inner) }
    }

    pub fn queue_capacity(&self) -> usize {
        self.inner.queue_capacity
    }

    /// Registers a new subscriber. It receives every event published after this call returns, and none from before.
    pub fn subscribe(&self) -> SessionHandle {
        let id = SessionId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        let handle = SessionHandle {
            id,
            queue: Arc::new(SessionQueue::new(self.inner.queue_capacity)),
            cancel: self.inner.shutdown.child_token(),
        };
        let mut sessions = self.inner.sessions.write().unwrap_or_else(PoisonError::into_inner);
        if self.inner.shutdown.is_cancelled() {
            warn!("📡️ {id} subscribed after the event bus shut down. It will never receive events.");
        } else {
            sessions.insert(id, handle.clone());
        }
        debug!("📡️ {id} subscribed. {} live subscribers", sessions.len());
        handle
    }

    /// Removes a subscriber and ends its session. Calling this more than once for the same session is harmless.
    pub fn unsubscribe(&self, handle: &SessionHandle) {
        let removed = self.inner.sessions.write().unwrap_or_else(PoisonError::into_inner).remove(&handle.id);
        handle.cancel.cancel();
        if removed.is_some() {
            debug!("📡️ {} unsubscribed. {} events were dropped for it.", handle.id, handle.dropped_events());
        }
    }

    /// Enqueues `event` for every current subscriber and returns how many subscribers it was queued for.
    ///
    /// Never blocks on a subscriber and never fails.
    pub fn publish(&self, event: StatusEvent) -> usize {
        // Holding the read lock for the whole fan-out keeps subscribe from interleaving with it.
        let sessions = self.inner.sessions.read().unwrap_or_else(PoisonError::into_inner);
        for handle in sessions.values() {
            if handle.queue.push(event.clone()) {
                warn!(
                    "📡️ {} is not keeping up. Dropped its oldest event ({} dropped so far)",
                    handle.id,
                    handle.dropped_events()
                );
            }
        }
        trace!("📡️ Event for order {} ({}) published to {} subscribers", event.order_id, event.status, sessions.len());
        sessions.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.sessions.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Ends every session and refuses new ones.
    pub fn shutdown(&self) {
        let mut sessions = self.inner.sessions.write().unwrap_or_else(PoisonError::into_inner);
        self.inner.shutdown.cancel();
        info!("📡️ Event bus shutting down. Closing {} sessions.", sessions.len());
        sessions.clear();
    }
}
