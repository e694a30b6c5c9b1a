//! Live-view subscriber sessions.
//!
//! A session pairs a bus subscription with a [`Transport`] and a delivery task. The task writes queued events to the
//! transport one at a time, in the order they were published. The first failed write, or the transport closing,
//! ends the session and removes it from the bus. Nothing about a failed session is ever reported to publishers.
use std::future::Future;

use log::*;
use tokio::sync::mpsc;

use crate::events::{SessionFault, SessionHandle, StatusEvent, StatusEventBus};

/// The outbound half of a subscriber's connection.
pub trait Transport {
    /// Writes a single event to the subscriber.
    fn deliver(&mut self, event: &StatusEvent) -> impl Future<Output = Result<(), SessionFault>> + Send;

    /// Resolves once the subscriber has gone away. Transports that cannot tell never resolve, and the disconnect is
    /// detected on the next failed write instead.
    fn closed(&self) -> impl Future<Output = ()> + Send {
        std::future::pending()
    }
}

/// A transport that forwards events into a tokio channel. Dropping the receiver disconnects the subscriber.
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    sender: mpsc::Sender<StatusEvent>,
}

impl ChannelTransport {
    pub fn new(sender: mpsc::Sender<StatusEvent>) -> Self {
        Self { sender }
    }

    /// Creates a transport and the receiver that its events arrive on.
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<StatusEvent>) {
        let (sender, receiver) = mpsc::channel(buffer.max(1));
        (Self::new(sender), receiver)
    }
}

impl Transport for ChannelTransport {
    fn deliver(&mut self, event: &StatusEvent) -> impl Future<Output = Result<(), SessionFault>> + Send {
        let event = event.clone();
        async move { self.sender.send(event).await.map_err(|_| SessionFault::Disconnected) }
    }

    fn closed(&self) -> impl Future<Output = ()> + Send {
        self.sender.closed()
    }
}

/// Attaches and detaches live-view subscribers, running one delivery task per subscriber.
#[derive(Debug, Clone, Default)]
pub struct SessionManager {
    bus: StatusEventBus,
}

impl SessionManager {
    pub fn new(bus: StatusEventBus) -> Self {
        Self { bus }
    }

    pub fn bus(&self) -> &StatusEventBus {
        &self.bus
    }

    /// Subscribes to the bus and spawns the delivery loop for `transport`. Must be called from within a tokio runtime.
    pub fn attach<T>(&self, transport: T) -> SessionHandle
    where T: Transport + Send + 'static {
        let handle = self.bus.subscribe();
        info!("📡️ {} attached", handle.id());
        tokio::spawn(run_delivery_loop(transport, handle.clone(), self.bus.clone()));
        handle
    }

    /// Ends a session. Safe to call on a session that has already ended.
    pub fn detach(&self, handle: &SessionHandle) {
        self.bus.unsubscribe(handle);
    }

    pub fn session_count(&self) -> usize {
        self.bus.subscriber_count()
    }
}

async fn run_delivery_loop<T: Transport>(mut transport: T, handle: SessionHandle, bus: StatusEventBus) {
    let id = handle.id();
    trace!("📡️ Delivery loop for {id} started");
    'session: loop {
        while let Some(event) = handle.next_event() {
            if !handle.is_alive() {
                break 'session;
            }
            let outcome = tokio::select! {
                outcome = transport.deliver(&event) => outcome,
                _ = handle.closed() => break 'session,
            };
            if let Err(fault) = outcome {
                warn!("📡️ {id} faulted while delivering the event for order {}. {fault}", event.order_id);
                break 'session;
            }
            trace!("📡️ {id} received the {} event for order {}", event.status, event.order_id);
        }
        tokio::select! {
            _ = handle.queue().wait_for_events() => {},
            _ = handle.closed() => break 'session,
            _ = transport.closed() => {
                debug!("📡️ {id} transport closed");
                break 'session;
            },
        }
    }
    bus.unsubscribe(&handle);
    info!("📡️ {id} detached. {} events were dropped for it.", handle.dropped_events());
}
