//! Message transport abstraction.
//!
//! The protocol needs only an ordered, reliable, message-framed
//! bidirectional channel: send one frame, receive one frame, observe
//! closure. Frames have no size bound and no internal structure at this
//! layer.

mod channel;
mod tcp;

pub use channel::message_channel;
pub use tcp::{framed_tcp, TcpMessageReceiver, TcpMessageSender};

use async_trait::async_trait;

use crate::error::TransportError;

/// Sending half of a message transport.
#[async_trait]
pub trait MessageSender: Send {
    async fn send(&mut self, frame: Vec<u8>) -> Result<(), TransportError>;
    /// Closes the connection; subsequent sends fail with
    /// [`TransportError::Closed`].
    async fn close(&mut self);
}

/// Receiving half of a message transport.
#[async_trait]
pub trait MessageReceiver: Send {
    /// Receives the next frame, or `None` once the peer has closed.
    async fn recv(&mut self) -> Result<Option<Vec<u8>>, TransportError>;
}

/// One endpoint of a bidirectional message transport.
pub type Endpoint = (Box<dyn MessageSender>, Box<dyn MessageReceiver>);
