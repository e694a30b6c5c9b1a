//! Live order status broadcasting
//!
//! Every successful order commit or status change produces one [`StatusEvent`]. Events are published onto the
//! [`StatusEventBus`], which copies them into a bounded queue per subscriber. The [`SessionManager`] pairs each
//! subscription with a [`Transport`] and runs a delivery task that drains the queue onto it.
//!
//! Publishers never wait for subscribers, and a subscriber that stalls or fails only affects itself.
mod bus;
mod event_types;
mod queue;
mod sessions;

pub use bus::{SessionHandle, SessionId, StatusEventBus, DEFAULT_SUBSCRIBER_QUEUE_SIZE};
pub use event_types::{SessionFault, StatusEvent};
pub use queue::SessionQueue;
pub use sessions::{ChannelTransport, SessionManager, Transport};
