use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::blob::Blob;
use super::sensor::{SensorRequest, SensorSnapshot};
use crate::space::ActionValue;
use crate::types::Handle;

/// Owner-authored description of one actor's current state, produced once
/// per tick. Owned sensors recurse as handle→snapshot entries.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActorSnapshot {
    pub name: Option<String>,
    pub control_timestep: f64,
    pub is_closed: bool,
    pub sensors: BTreeMap<Handle, SensorSnapshot>,
    /// Action shape descriptor. Sent only while the peer's
    /// `need_action_spec` flag is raised.
    pub action_spec: Option<Blob>,
}

/// Peer-authored mutation request for one actor, read once per tick.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ActorRequest {
    pub close: bool,
    pub need_action_spec: bool,
    /// Next action to apply, present only when a new action was submitted
    /// since the previous request went out.
    pub action: Option<ActionValue>,
    pub sensors: BTreeMap<Handle, SensorRequest>,
}
