//! Collaborator contract: the surface a simulator binding must expose for
//! its world, actors and sensors to be synchronized remotely.
//!
//! Actor and sensor implementations are shared (`Arc`) across sessions and
//! must be internally synchronized against their own engine thread. The
//! world itself is mutated only under the manager's shared lock.

use std::sync::Arc;

use thiserror::Error;

use crate::space::{ActionValue, Space};

/// One typed observation as produced by a sensor binding. The payload is
/// opaque to the protocol; `tag` identifies how to reinterpret it.
#[derive(Clone, Debug, PartialEq)]
pub struct ObservationFrame {
    pub tag: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum StepError {
    /// The simulator refused or failed to advance.
    #[error("Simulator step failed: {0}")]
    Simulator(String),

    /// The world was closed while a step was in flight.
    #[error("World closed")]
    Closed,
}

/// A read-only source of periodic observations.
pub trait Sensor: Send + Sync {
    fn name(&self) -> String;
    fn control_timestep(&self) -> f64;
    fn observation_spec(&self) -> Space;
    /// Pulls the freshest observation from the engine, or `None` when the
    /// sensor has not produced one yet.
    fn pull_observation(&self) -> Option<ObservationFrame>;
    fn close(&self);
    fn is_closed(&self) -> bool;
}

/// A controllable entity owning zero or more sensors and accepting a
/// structured action.
pub trait Actor: Send + Sync {
    fn name(&self) -> String;
    fn control_timestep(&self) -> f64;
    fn sensors(&self) -> Vec<Arc<dyn Sensor>>;
    fn action_spec(&self) -> Space;
    /// Applies an already shape-validated action. Returns whether the engine
    /// accepted it.
    fn apply_action(&self, action: &ActionValue) -> bool;
    fn close(&self);
    fn is_closed(&self) -> bool;
}

/// The root container of actors/sensors plus a steppable simulation clock.
pub trait World: Send {
    fn actors(&self) -> Vec<Arc<dyn Actor>>;
    fn sensors(&self) -> Vec<Arc<dyn Sensor>>;
    /// Advances the simulation clock by one step and reports the elapsed
    /// simulated time.
    fn step(&mut self) -> Result<f64, StepError>;
    /// Whether the world advances on its own rather than on step requests.
    fn is_asynchronous(&self) -> bool;
}
