use thiserror::Error;

use simlink_shared::{CodecError, TransportError};

#[derive(Debug, Error)]
pub enum ClientError {
    /// The server closed the connection.
    #[error("Disconnected from server")]
    Disconnected,

    /// A server frame failed to decode; the connection is torn down.
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}
