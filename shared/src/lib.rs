//! # Simlink Shared
//! Common functionality shared between simlink-server & simlink-client crates.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

#[macro_use]
extern crate cfg_if;

mod codec;
mod contract;
mod error;
mod interface;
mod messages;
mod registry;
mod space;
mod transport;
mod types;

pub use codec::{decode_frame, encode_frame};
pub use contract::RemoteEndpoint;
pub use error::{CodecError, EndpointError, TransportError};
pub use interface::{Actor, ObservationFrame, Sensor, StepError, World};
pub use messages::{
    ActorRequest, ActorSnapshot, Blob, BlobEncoding, SensorRequest, SensorSnapshot, WorldRequest,
    WorldSnapshot,
};
pub use registry::HandleRegistry;
pub use space::{ActionValue, Space};
pub use transport::{
    framed_tcp, message_channel, Endpoint, MessageReceiver, MessageSender,
};
pub use types::{Handle, SessionKey};
