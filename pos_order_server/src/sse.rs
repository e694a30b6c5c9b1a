//! Server-Sent Events transport for live order updates.
//!
//! Each event is written as a single `data: <json>\n\n` frame. The frames are handed to the HTTP response body through
//! a channel. When the client disconnects, actix drops the body, which closes the channel and ends the session.
use std::future::Future;

use bytes::Bytes;
use futures::{stream, Stream};
use pos_order_engine::events::{SessionFault, StatusEvent, Transport};
use tokio::sync::mpsc;

pub const SSE_FRAME_BUFFER: usize = 16;

pub struct SseTransport {
    sender: mpsc::Sender<Bytes>,
}

impl SseTransport {
    /// Creates a transport and the stream of frames to use as the response body.
    pub fn channel(buffer: usize) -> (Self, impl Stream<Item = Result<Bytes, actix_web::Error>>) {
        let (sender, frames) = mpsc::channel(buffer.max(1));
        let body = stream::unfold(frames, |mut frames| async move {
            frames.recv().await.map(|frame| (Ok(frame), frames))
        });
        (Self { sender }, body)
    }
}

impl Transport for SseTransport {
    fn deliver(&mut self, event: &StatusEvent) -> impl Future<Output = Result<(), SessionFault>> + Send {
        let frame = encode_frame(event);
        async move {
            let frame = frame?;
            self.sender.send(frame).await.map_err(|_| SessionFault::Disconnected)
        }
    }

    fn closed(&self) -> impl Future<Output = ()> + Send {
        self.sender.closed()
    }
}

pub fn encode_frame(event: &StatusEvent) -> Result<Bytes, SessionFault> {
    let json = serde_json::to_string(event).map_err(|e| SessionFault::Encoding(e.to_string()))?;
    Ok(Bytes::from(format!("data: {json}\n\n")))
}
