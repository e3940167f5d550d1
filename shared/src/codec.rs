//! Wire frame codec.
//!
//! Messages travel as compact, schema-less postcard records; the transport
//! provides message boundaries, so no extra framing happens here.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::CodecError;

/// Serializes one message into a wire frame.
pub fn encode_frame<M: Serialize>(message: &M) -> Result<Vec<u8>, CodecError> {
    postcard::to_allocvec(message).map_err(|err| CodecError::SerializeFailed(err.to_string()))
}

/// Deserializes one wire frame.
///
/// A failure here is fatal to the connection that produced the frame, never
/// to the process.
pub fn decode_frame<M: DeserializeOwned>(frame: &[u8]) -> Result<M, CodecError> {
    postcard::from_bytes(frame).map_err(|_| CodecError::MalformedFrame(frame.len()))
}
