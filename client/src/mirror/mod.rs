//! Client-side mirror hierarchy: local shadow objects reconstructed and
//! incrementally updated purely from received snapshots.

mod actor;
mod sensor;
mod world;

pub use actor::ActorMirror;
pub use sensor::SensorMirror;
pub use world::WorldMirror;
