use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, warn};

use simlink_shared::{
    ActionValue, Actor, ActorRequest, ActorSnapshot, BlobEncoding, EndpointError, Handle,
    HandleRegistry, RemoteEndpoint, SensorSnapshot,
};

use super::sensor::SensorWrapper;

/// Server-side wrapper around one real actor and its sensor registry.
pub struct ActorWrapper {
    actor: Arc<dyn Actor>,
    encoding: BlobEncoding,
    sensors: HandleRegistry<SensorWrapper>,
    pending_action: Option<ActionValue>,
    need_action_spec: bool,
}

impl ActorWrapper {
    pub fn new(actor: Arc<dyn Actor>, encoding: BlobEncoding) -> Self {
        let mut wrapper = Self {
            actor,
            encoding,
            sensors: HandleRegistry::new(),
            pending_action: None,
            need_action_spec: true,
        };
        wrapper.refresh_sensors();
        wrapper
    }

    pub(crate) fn actor(&self) -> &Arc<dyn Actor> {
        &self.actor
    }

    fn refresh_sensors(&mut self) {
        let live = self.actor.sensors();
        let encoding = self.encoding;
        self.sensors.refresh(
            &live,
            |wrapper| wrapper.sensor(),
            |sensor| SensorWrapper::new(sensor, encoding),
        );
    }

    pub fn depack(&mut self, request: ActorRequest) {
        match request.action {
            Some(action) => {
                // an action failing the shape contract is dropped without
                // erroring the tick
                if self.actor.action_spec().contains(&action) {
                    self.pending_action = Some(action);
                } else {
                    debug!(
                        "Dropping action failing shape validation for actor {:?}",
                        self.actor.name()
                    );
                    self.pending_action = None;
                }
            }
            None => self.pending_action = None,
        }

        if request.close && !self.actor.is_closed() {
            self.actor.close();
        }
        self.need_action_spec = request.need_action_spec;

        self.refresh_sensors();
        for (handle, sensor_request) in request.sensors {
            match self.sensors.get_mut(handle) {
                Some(sensor) => sensor.depack(sensor_request),
                None => debug!(
                    "Dropping request for retired sensor handle {} on actor {:?}",
                    handle,
                    self.actor.name()
                ),
            }
        }
    }

    /// Applies the pending validated action, if any. Runs strictly before
    /// this actor's observation pulls, so fetched observations reflect the
    /// just-applied action where the simulation makes that possible.
    pub fn apply_pending(&mut self) {
        if let Some(action) = self.pending_action.take() {
            if !self.actor.apply_action(&action) {
                debug!(
                    "Engine rejected validated action for actor {:?}",
                    self.actor.name()
                );
            }
        }
    }

    /// Pulls a fresh observation on every owned sensor.
    pub fn pull_observations(&mut self) {
        self.refresh_sensors();
        for (_, sensor) in self.sensors.iter_mut() {
            sensor.tick();
        }
    }

    pub fn pack(&mut self) -> ActorSnapshot {
        self.refresh_sensors();
        let sensors: BTreeMap<Handle, SensorSnapshot> = self
            .sensors
            .iter_mut()
            .map(|(handle, sensor)| (handle, sensor.pack()))
            .collect();
        let action_spec = if self.need_action_spec {
            match self.actor.action_spec().to_blob(self.encoding) {
                Ok(blob) => Some(blob),
                Err(err) => {
                    warn!(
                        "Omitting action spec for actor {:?}: {}",
                        self.actor.name(),
                        err
                    );
                    None
                }
            }
        } else {
            None
        };

        ActorSnapshot {
            name: Some(self.actor.name()),
            control_timestep: self.actor.control_timestep(),
            is_closed: self.actor.is_closed(),
            sensors,
            action_spec,
        }
    }
}

/// A single actor can also be streamed as its own session.
#[async_trait]
impl RemoteEndpoint for ActorWrapper {
    type Inbound = ActorRequest;
    type Outbound = ActorSnapshot;

    fn depack(&mut self, inbound: ActorRequest) {
        ActorWrapper::depack(self, inbound);
    }

    async fn tick(&mut self) -> Result<(), EndpointError> {
        self.apply_pending();
        self.pull_observations();
        Ok(())
    }

    fn pack(&mut self) -> ActorSnapshot {
        ActorWrapper::pack(self)
    }

    fn is_closed(&self) -> bool {
        self.actor.is_closed()
    }
}
