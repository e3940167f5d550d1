use async_trait::async_trait;
use log::debug;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

use super::{Endpoint, MessageReceiver, MessageSender};
use crate::error::TransportError;

/// Splits a connected TCP stream into a message-framed transport endpoint.
///
/// Frames are length-prefixed with a u32 (little-endian); TCP supplies
/// ordering and reliability.
pub fn framed_tcp(stream: TcpStream) -> Endpoint {
    let (read, write) = stream.into_split();
    (
        Box::new(TcpMessageSender { write: Some(write) }),
        Box::new(TcpMessageReceiver { read }),
    )
}

pub struct TcpMessageSender {
    write: Option<OwnedWriteHalf>,
}

#[async_trait]
impl MessageSender for TcpMessageSender {
    async fn send(&mut self, frame: Vec<u8>) -> Result<(), TransportError> {
        let Some(write) = &mut self.write else {
            return Err(TransportError::Closed);
        };
        let len = u32::try_from(frame.len())
            .map_err(|_| TransportError::Io("frame exceeds u32 length prefix".to_string()))?;
        write.write_all(&len.to_le_bytes()).await?;
        write.write_all(&frame).await?;
        write.flush().await?;
        Ok(())
    }

    async fn close(&mut self) {
        if let Some(mut write) = self.write.take() {
            let _ = write.shutdown().await;
        }
    }
}

pub struct TcpMessageReceiver {
    read: OwnedReadHalf,
}

#[async_trait]
impl MessageReceiver for TcpMessageReceiver {
    async fn recv(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        let mut len_bytes = [0u8; 4];
        match self.read.read_exact(&mut len_bytes).await {
            Ok(_) => {}
            Err(err) if err.kind() == std::io::ErrorKind::UnexpectedEof => {
                debug!("TCP peer closed the connection");
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        }
        let len = u32::from_le_bytes(len_bytes) as usize;
        let mut frame = vec![0u8; len];
        self.read.read_exact(&mut frame).await?;
        Ok(Some(frame))
    }
}
