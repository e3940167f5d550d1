//! # Simlink Server
//! Owns the single real simulation world, hands out per-session masked
//! views, and syncs wrapped actors/sensors to connected clients.

pub mod manager;
pub mod masked_world;
pub mod service;
pub mod shared_view;
pub mod wrapper;

pub use manager::{ManagerConfig, SessionPhase, WorldEvent, WorldManager};
pub use masked_world::MaskedWorld;
pub use service::StreamingService;
pub use shared_view::{SharedActorView, SharedSensorView};
pub use wrapper::{ActorWrapper, SensorWrapper, WorldWrapper};

pub use simlink_shared as shared;
