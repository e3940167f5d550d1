use log::warn;

use simlink_shared::{
    decode_frame, encode_frame, Endpoint, MessageReceiver, MessageSender, RemoteEndpoint,
    WorldSnapshot,
};

use crate::error::ClientError;
use crate::mirror::WorldMirror;

/// Drives one remote world session over a message transport.
///
/// The mirror is built from the server's initial snapshot; every
/// [`WorldClient::step`] afterwards performs one request/snapshot exchange
/// and returns the simulated time that elapsed on the owner.
pub struct WorldClient {
    sender: Box<dyn MessageSender>,
    receiver: Box<dyn MessageReceiver>,
    mirror: WorldMirror,
}

impl WorldClient {
    /// Awaits the server's initial snapshot and constructs the mirror from
    /// it. An undecodable initial frame closes the connection.
    pub async fn connect(endpoint: Endpoint) -> Result<Self, ClientError> {
        let (mut sender, mut receiver) = endpoint;
        let frame = match receiver.recv().await? {
            Some(frame) => frame,
            None => return Err(ClientError::Disconnected),
        };
        let snapshot: WorldSnapshot = match decode_frame(&frame) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!("Disconnecting: initial snapshot undecodable: {}", err);
                sender.close().await;
                return Err(err.into());
            }
        };
        Ok(Self {
            sender,
            receiver,
            mirror: WorldMirror::from_snapshot(snapshot),
        })
    }

    pub fn world(&self) -> &WorldMirror {
        &self.mirror
    }

    pub fn world_mut(&mut self) -> &mut WorldMirror {
        &mut self.mirror
    }

    /// Performs one exchange: sends the next request (which always asks the
    /// owner to advance), awaits the resulting snapshot, folds it into the
    /// mirror, and returns the simulated time that elapsed since the last
    /// step (covering every real step completed in between).
    pub async fn step(&mut self) -> Result<f64, ClientError> {
        let request = RemoteEndpoint::pack(&mut self.mirror);
        let frame = encode_frame(&request)?;
        self.sender.send(frame).await?;

        let inbound = match self.receiver.recv().await? {
            Some(frame) => frame,
            None => return Err(ClientError::Disconnected),
        };
        match decode_frame::<WorldSnapshot>(&inbound) {
            Ok(snapshot) => {
                RemoteEndpoint::depack(&mut self.mirror, snapshot);
                Ok(self.mirror.drain_step_dt())
            }
            Err(err) => {
                warn!("Disconnecting: snapshot undecodable: {}", err);
                self.sender.close().await;
                Err(err.into())
            }
        }
    }

    /// Requests a close of the remote masked world, delivers it, and shuts
    /// the transport down.
    pub async fn close(mut self) -> Result<(), ClientError> {
        self.mirror.close();
        let request = RemoteEndpoint::pack(&mut self.mirror);
        let frame = encode_frame(&request)?;
        self.sender.send(frame).await?;
        self.sender.close().await;
        Ok(())
    }
}
