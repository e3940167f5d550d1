use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::actor::{ActorRequest, ActorSnapshot};
use super::sensor::{SensorRequest, SensorSnapshot};
use crate::types::Handle;

/// Owner-authored description of one masked world's current state, produced
/// once per tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub is_closed: bool,
    pub actors: BTreeMap<Handle, ActorSnapshot>,
    pub sensors: BTreeMap<Handle, SensorSnapshot>,
    /// Simulation time elapsed since this session last drained it; covers
    /// every real step that completed in between.
    pub last_step_dt: f64,
    pub is_asynchronous: bool,
}

/// Peer-authored mutation request for one masked world, read once per tick.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldRequest {
    pub close: bool,
    /// Ask the owner to advance the simulation clock. The mirror raises
    /// this on every request it sends.
    pub step: bool,
    pub actors: BTreeMap<Handle, ActorRequest>,
    pub sensors: BTreeMap<Handle, SensorRequest>,
}
