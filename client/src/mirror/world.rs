use std::collections::BTreeMap;

use async_trait::async_trait;

use simlink_shared::{
    EndpointError, Handle, RemoteEndpoint, WorldRequest, WorldSnapshot,
};

use super::actor::ActorMirror;
use super::sensor::SensorMirror;

/// Local shadow of a remote masked world.
///
/// Calling code reads actors/sensors and issues actions against this mirror
/// exactly as it would against a local world; the stream driver keeps it
/// converged with the owner's snapshots.
pub struct WorldMirror {
    actors: BTreeMap<Handle, ActorMirror>,
    sensors: BTreeMap<Handle, SensorMirror>,
    pending_dt: f64,
    is_asynchronous: bool,
    closed: bool,
    close_requested: bool,
}

impl WorldMirror {
    pub fn from_snapshot(snapshot: WorldSnapshot) -> Self {
        let mut mirror = Self {
            actors: BTreeMap::new(),
            sensors: BTreeMap::new(),
            pending_dt: 0.0,
            is_asynchronous: false,
            closed: false,
            close_requested: false,
        };
        RemoteEndpoint::depack(&mut mirror, snapshot);
        mirror
    }

    pub fn is_asynchronous(&self) -> bool {
        self.is_asynchronous
    }

    pub fn actors(&self) -> impl Iterator<Item = (Handle, &ActorMirror)> {
        self.actors.iter().map(|(handle, actor)| (*handle, actor))
    }

    pub fn actor(&self, handle: Handle) -> Option<&ActorMirror> {
        self.actors.get(&handle)
    }

    pub fn actor_mut(&mut self, handle: Handle) -> Option<&mut ActorMirror> {
        self.actors.get_mut(&handle)
    }

    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }

    pub fn sensors(&self) -> impl Iterator<Item = (Handle, &SensorMirror)> {
        self.sensors.iter().map(|(handle, sensor)| (*handle, sensor))
    }

    pub fn sensor_mut(&mut self, handle: Handle) -> Option<&mut SensorMirror> {
        self.sensors.get_mut(&handle)
    }

    pub fn sensor_count(&self) -> usize {
        self.sensors.len()
    }

    /// Simulated time elapsed on the owner since the last drain.
    pub fn drain_step_dt(&mut self) -> f64 {
        std::mem::take(&mut self.pending_dt)
    }

    /// Asks the owner to close the masked world on the next request.
    pub fn close(&mut self) {
        self.close_requested = true;
    }

    /// Whether the owner has reported the masked world closed.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

#[async_trait]
impl RemoteEndpoint for WorldMirror {
    type Inbound = WorldSnapshot;
    type Outbound = WorldRequest;

    fn depack(&mut self, snapshot: WorldSnapshot) {
        self.closed = snapshot.is_closed;
        self.is_asynchronous = snapshot.is_asynchronous;
        self.pending_dt += snapshot.last_step_dt;

        let live_actors: Vec<Handle> = snapshot.actors.keys().copied().collect();
        for (handle, actor_snapshot) in snapshot.actors {
            match self.actors.get_mut(&handle) {
                Some(actor) => actor.depack(actor_snapshot),
                None => {
                    self.actors
                        .insert(handle, ActorMirror::from_snapshot(actor_snapshot));
                }
            }
        }
        self.actors.retain(|handle, _| live_actors.contains(handle));

        let live_sensors: Vec<Handle> = snapshot.sensors.keys().copied().collect();
        for (handle, sensor_snapshot) in snapshot.sensors {
            match self.sensors.get_mut(&handle) {
                Some(sensor) => sensor.depack(sensor_snapshot),
                None => {
                    self.sensors
                        .insert(handle, SensorMirror::from_snapshot(sensor_snapshot));
                }
            }
        }
        self.sensors.retain(|handle, _| live_sensors.contains(handle));
    }

    async fn tick(&mut self) -> Result<(), EndpointError> {
        // the mirror has no owned side effects; the owner performs them
        Ok(())
    }

    fn pack(&mut self) -> WorldRequest {
        WorldRequest {
            close: self.close_requested,
            // the mirror always asks for the next tick
            step: true,
            actors: self
                .actors
                .iter_mut()
                .map(|(handle, actor)| (*handle, actor.pack()))
                .collect(),
            sensors: self
                .sensors
                .iter_mut()
                .map(|(handle, sensor)| (*handle, sensor.pack()))
                .collect(),
        }
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}
