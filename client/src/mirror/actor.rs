use std::collections::BTreeMap;

use log::warn;

use simlink_shared::{ActionValue, ActorRequest, ActorSnapshot, Handle, Space};

use super::sensor::SensorMirror;

/// Local shadow of a remote actor: owned sensor mirrors, the cached action
/// shape descriptor, and at most one action queued for the next request.
pub struct ActorMirror {
    name: Option<String>,
    control_timestep: f64,
    closed: bool,
    close_requested: bool,
    sensors: BTreeMap<Handle, SensorMirror>,
    action_spec: Option<Space>,
    pending_action: Option<ActionValue>,
}

impl ActorMirror {
    pub(crate) fn from_snapshot(snapshot: ActorSnapshot) -> Self {
        let mut mirror = Self {
            name: None,
            control_timestep: 0.0,
            closed: false,
            close_requested: false,
            sensors: BTreeMap::new(),
            action_spec: None,
            pending_action: None,
        };
        mirror.depack(snapshot);
        mirror
    }

    pub(crate) fn depack(&mut self, snapshot: ActorSnapshot) {
        if snapshot.name.is_some() {
            self.name = snapshot.name;
        }
        self.control_timestep = snapshot.control_timestep;
        self.closed = snapshot.is_closed;

        // merge newly-known sensors, update known ones in place, drop
        // mirrors whose handle the owner no longer reports
        let live: Vec<Handle> = snapshot.sensors.keys().copied().collect();
        for (handle, sensor_snapshot) in snapshot.sensors {
            match self.sensors.get_mut(&handle) {
                Some(sensor) => sensor.depack(sensor_snapshot),
                None => {
                    self.sensors
                        .insert(handle, SensorMirror::from_snapshot(sensor_snapshot));
                }
            }
        }
        self.sensors.retain(|handle, _| live.contains(handle));

        if let Some(blob) = snapshot.action_spec {
            match Space::from_blob(&blob) {
                Ok(space) => self.action_spec = Some(space),
                Err(err) => warn!(
                    "Discarding undecodable action spec for {:?}: {}",
                    self.name, err
                ),
            }
        }
    }

    pub(crate) fn pack(&mut self) -> ActorRequest {
        ActorRequest {
            close: self.close_requested,
            need_action_spec: self.action_spec.is_none(),
            action: self.pending_action.take(),
            sensors: self
                .sensors
                .iter_mut()
                .map(|(handle, sensor)| (*handle, sensor.pack()))
                .collect(),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn control_timestep(&self) -> f64 {
        self.control_timestep
    }

    pub fn action_spec(&self) -> Option<&Space> {
        self.action_spec.as_ref()
    }

    /// Queues `action` for the next request. When the shape descriptor is
    /// already cached the action is validated locally first; an action
    /// failing validation is rejected here rather than silently dropped by
    /// the owner later.
    pub fn apply_action(&mut self, action: ActionValue) -> bool {
        if let Some(spec) = &self.action_spec {
            if !spec.contains(&action) {
                return false;
            }
        }
        self.pending_action = Some(action);
        true
    }

    pub fn sensors(&self) -> impl Iterator<Item = (Handle, &SensorMirror)> {
        self.sensors.iter().map(|(handle, sensor)| (*handle, sensor))
    }

    pub fn sensor(&self, handle: Handle) -> Option<&SensorMirror> {
        self.sensors.get(&handle)
    }

    pub fn sensor_mut(&mut self, handle: Handle) -> Option<&mut SensorMirror> {
        self.sensors.get_mut(&handle)
    }

    pub fn sensor_count(&self) -> usize {
        self.sensors.len()
    }

    /// Asks the owner to close the real actor on the next request.
    pub fn close(&mut self) {
        self.close_requested = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}
