//! Server-side wrapper hierarchy: one concrete wrapper per synchronizable
//! role, no nesting. Each wrapper composes its outbound snapshot and applies
//! the just-received inbound request, recursing through its handle
//! registries.

mod actor;
mod sensor;
mod world;

pub use actor::ActorWrapper;
pub use sensor::SensorWrapper;
pub use world::WorldWrapper;
