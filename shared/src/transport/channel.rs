use async_trait::async_trait;
use tokio::sync::mpsc::{self, Receiver, Sender};

use super::{Endpoint, MessageReceiver, MessageSender};
use crate::error::TransportError;

/// Creates a connected pair of in-memory transport endpoints.
///
/// Used by tests and by hosts that multiplex a client and a server onto the
/// same process.
pub fn message_channel() -> (Endpoint, Endpoint) {
    let (a_tx, b_rx) = mpsc::channel(64);
    let (b_tx, a_rx) = mpsc::channel(64);
    (
        (
            Box::new(ChannelSender { sender: Some(a_tx) }),
            Box::new(ChannelReceiver { receiver: a_rx }),
        ),
        (
            Box::new(ChannelSender { sender: Some(b_tx) }),
            Box::new(ChannelReceiver { receiver: b_rx }),
        ),
    )
}

struct ChannelSender {
    sender: Option<Sender<Vec<u8>>>,
}

#[async_trait]
impl MessageSender for ChannelSender {
    async fn send(&mut self, frame: Vec<u8>) -> Result<(), TransportError> {
        let Some(sender) = &self.sender else {
            return Err(TransportError::Closed);
        };
        sender.send(frame).await.map_err(|_| TransportError::Closed)
    }

    async fn close(&mut self) {
        // dropping the sender ends the peer's recv stream
        self.sender = None;
    }
}

struct ChannelReceiver {
    receiver: Receiver<Vec<u8>>,
}

#[async_trait]
impl MessageReceiver for ChannelReceiver {
    async fn recv(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        Ok(self.receiver.recv().await)
    }
}
