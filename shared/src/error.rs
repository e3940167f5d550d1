use thiserror::Error;

/// Errors produced while encoding or decoding wire messages and blobs.
///
/// A decode failure is never fatal to the process, only to the connection
/// that produced the malformed bytes: the affected session is disconnected
/// and cleaned up.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Wire frame did not deserialize into the expected message type
    #[error("Malformed message frame ({0} bytes)")]
    MalformedFrame(usize),

    /// Message serialization failed (should not happen for valid values)
    #[error("Failed to serialize message: {0}")]
    SerializeFailed(String),

    /// Blob payload failed to decompress
    #[error("Failed to decompress blob payload ({payload_size} bytes)")]
    DecompressionFailed { payload_size: usize },

    /// Blob compression failed
    #[error("Failed to compress blob payload ({payload_size} bytes)")]
    CompressionFailed { payload_size: usize },

    /// Blob uses an encoding this build does not support
    #[error("Blob encoding {encoding} is not supported by this build")]
    UnsupportedEncoding { encoding: &'static str },

    /// Shape descriptor blob did not decode into a valid `Space`
    #[error("Malformed shape descriptor blob")]
    MalformedDescriptor,
}

/// Errors surfaced by a message transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The peer closed the connection
    #[error("Connection closed by peer")]
    Closed,

    /// Frame could not be sent or received
    #[error("Transport I/O failure: {0}")]
    Io(String),
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        TransportError::Io(err.to_string())
    }
}

/// Errors surfaced by an endpoint's `tick()`.
///
/// A failing tick disconnects only its own session; other sessions' cycles
/// are unaffected.
#[derive(Debug, Error)]
pub enum EndpointError {
    /// The underlying simulation failed to advance
    #[error("Simulation step failed: {0}")]
    Step(String),
}
