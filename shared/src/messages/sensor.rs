use serde::{Deserialize, Serialize};

use super::blob::Blob;

/// Owner-authored description of one sensor's current state, produced once
/// per tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SensorSnapshot {
    pub name: Option<String>,
    pub control_timestep: f64,
    pub is_closed: bool,
    /// Latest observation, as a tagged payload. Absent when the sensor has
    /// not produced one yet this session.
    pub observation: Option<Blob>,
    /// Observation shape descriptor. Sent only while the peer's
    /// `need_observation_spec` flag is raised, so the (potentially large)
    /// descriptor is not re-sent every tick.
    pub observation_spec: Option<Blob>,
}

/// Peer-authored mutation request for one sensor, read once per tick.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorRequest {
    pub close: bool,
    pub need_observation_spec: bool,
}
