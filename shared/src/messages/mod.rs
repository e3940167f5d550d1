//! Paired outbound-snapshot / inbound-request message types for every
//! synchronizable kind, plus the tagged blob payload they carry.

mod actor;
mod blob;
mod sensor;
mod world;

pub use actor::{ActorRequest, ActorSnapshot};
pub use blob::{Blob, BlobEncoding};
pub use sensor::{SensorRequest, SensorSnapshot};
pub use world::{WorldRequest, WorldSnapshot};
