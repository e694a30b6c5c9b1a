use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicU64, Ordering},
        Mutex,
        MutexGuard,
        PoisonError,
    },
};

use tokio::sync::Notify;

use crate::events::StatusEvent;

/// A bounded FIFO of events waiting to be written to a single subscriber.
///
/// Pushing never blocks. When the queue is full, the oldest queued event is discarded to make room and the drop
/// counter goes up by one.
#[derive(Debug)]
pub struct SessionQueue {
    events: Mutex<VecDeque<StatusEvent>>,
    capacity: usize,
    dropped: AtomicU64,
    ready: Notify,
}

impl SessionQueue {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: Mutex::new(VecDeque::with_capacity(capacity.min(1024))),
            capacity,
            dropped: AtomicU64::new(0),
            ready: Notify::new(),
        }
    }

    /// Appends an event. Returns `true` if an older event had to be dropped to make room.
    pub fn push(&self, event: StatusEvent) -> bool {
        let evicted = {
            let mut events = self.lock();
            let evicted = if events.len() >= self.capacity { events.pop_front().is_some() } else { false };
            events.push_back(event);
            evicted
        };
        if evicted {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
        self.ready.notify_one();
        evicted
    }

    pub fn pop(&self) -> Option<StatusEvent> {
        self.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Resolves once an event has been pushed since the last time this future resolved.
    pub async fn wait_for_events(&self) {
        self.ready.notified().await
    }

    // A poisoned lock still guards a valid VecDeque.
    fn lock(&self) -> MutexGuard<'_, VecDeque<StatusEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
