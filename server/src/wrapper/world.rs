use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use log::debug;

use simlink_shared::{
    Actor, ActorSnapshot, BlobEncoding, EndpointError, Handle, HandleRegistry, RemoteEndpoint,
    SensorSnapshot, World, WorldRequest, WorldSnapshot,
};

use crate::masked_world::MaskedWorld;

use super::actor::ActorWrapper;
use super::sensor::SensorWrapper;

/// Server-side wrapper around one session's masked world.
///
/// This is the endpoint a world session's streaming service drives: inbound
/// `WorldRequest`s recurse into the actor/sensor wrappers, `tick()` performs
/// the session's side effects in order (apply actions, await the step
/// barrier, pull observations), and `pack()` composes the next snapshot.
pub struct WorldWrapper<W: World> {
    masked: MaskedWorld<W>,
    encoding: BlobEncoding,
    actors: HandleRegistry<ActorWrapper>,
    sensors: HandleRegistry<SensorWrapper>,
    step_requested: bool,
    pending_dt: f64,
    closing: bool,
}

impl<W: World> WorldWrapper<W> {
    pub fn new(masked: MaskedWorld<W>, encoding: BlobEncoding) -> Self {
        let mut wrapper = Self {
            masked,
            encoding,
            actors: HandleRegistry::new(),
            sensors: HandleRegistry::new(),
            step_requested: false,
            pending_dt: 0.0,
            closing: false,
        };
        wrapper.refresh();
        wrapper
    }

    pub fn masked_world(&self) -> &MaskedWorld<W> {
        &self.masked
    }

    fn refresh(&mut self) {
        let encoding = self.encoding;

        let live_actors: Vec<Arc<dyn Actor>> = self.masked.actors();
        self.actors.refresh(
            &live_actors,
            |wrapper| wrapper.actor(),
            |actor| ActorWrapper::new(actor, encoding),
        );

        let live_sensors = self.masked.sensors();
        self.sensors.refresh(
            &live_sensors,
            |wrapper| wrapper.sensor(),
            |sensor| SensorWrapper::new(sensor, encoding),
        );
    }
}

#[async_trait]
impl<W: World> RemoteEndpoint for WorldWrapper<W> {
    type Inbound = WorldRequest;
    type Outbound = WorldSnapshot;

    fn depack(&mut self, request: WorldRequest) {
        if request.close {
            self.closing = true;
        }
        if request.step {
            self.step_requested = true;
        }

        self.refresh();
        for (handle, actor_request) in request.actors {
            match self.actors.get_mut(handle) {
                Some(actor) => actor.depack(actor_request),
                None => debug!(
                    "Dropping request for retired actor handle {} on {}",
                    handle,
                    self.masked.session_key()
                ),
            }
        }
        for (handle, sensor_request) in request.sensors {
            match self.sensors.get_mut(handle) {
                Some(sensor) => sensor.depack(sensor_request),
                None => debug!(
                    "Dropping request for retired sensor handle {} on {}",
                    handle,
                    self.masked.session_key()
                ),
            }
        }
    }

    async fn tick(&mut self) -> Result<(), EndpointError> {
        // actions land before the step so the engine integrates them
        for (_, actor) in self.actors.iter_mut() {
            actor.apply_pending();
        }

        if self.step_requested {
            self.step_requested = false;
            self.pending_dt += self.masked.step().await;
        }

        // membership may have changed while the world advanced
        self.refresh();
        for (_, actor) in self.actors.iter_mut() {
            actor.pull_observations();
        }
        for (_, sensor) in self.sensors.iter_mut() {
            sensor.tick();
        }

        if self.closing {
            self.masked.close();
        }
        Ok(())
    }

    fn pack(&mut self) -> WorldSnapshot {
        self.refresh();
        let actors: BTreeMap<Handle, ActorSnapshot> = self
            .actors
            .iter_mut()
            .map(|(handle, actor)| (handle, actor.pack()))
            .collect();
        let sensors: BTreeMap<Handle, SensorSnapshot> = self
            .sensors
            .iter_mut()
            .map(|(handle, sensor)| (handle, sensor.pack()))
            .collect();

        WorldSnapshot {
            is_closed: self.masked.is_closed(),
            actors,
            sensors,
            last_step_dt: std::mem::take(&mut self.pending_dt),
            is_asynchronous: self.masked.is_asynchronous(),
        }
    }

    fn is_closed(&self) -> bool {
        self.closing
    }
}
