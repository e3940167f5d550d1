use std::sync::Arc;

use log::warn;

use simlink_shared::{Blob, BlobEncoding, ObservationFrame, Sensor, SensorRequest, SensorSnapshot};

/// Server-side wrapper around one real sensor.
///
/// Owns the sensor's per-session sync state: the freshest observation pulled
/// this tick and whether the peer still needs the shape descriptor.
pub struct SensorWrapper {
    sensor: Arc<dyn Sensor>,
    encoding: BlobEncoding,
    // the first snapshot always carries the descriptor
    need_observation_spec: bool,
    last_observation: Option<ObservationFrame>,
}

impl SensorWrapper {
    pub fn new(sensor: Arc<dyn Sensor>, encoding: BlobEncoding) -> Self {
        Self {
            sensor,
            encoding,
            need_observation_spec: true,
            last_observation: None,
        }
    }

    pub(crate) fn sensor(&self) -> &Arc<dyn Sensor> {
        &self.sensor
    }

    pub fn depack(&mut self, request: SensorRequest) {
        if request.close && !self.sensor.is_closed() {
            self.sensor.close();
        }
        self.need_observation_spec = request.need_observation_spec;
    }

    /// Pulls the freshest observation from the engine.
    pub fn tick(&mut self) {
        if self.sensor.is_closed() {
            return;
        }
        if let Some(frame) = self.sensor.pull_observation() {
            self.last_observation = Some(frame);
        }
    }

    pub fn pack(&mut self) -> SensorSnapshot {
        let observation = self.last_observation.as_ref().and_then(|frame| {
            match Blob::pack(&frame.tag, &frame.bytes, self.encoding) {
                Ok(blob) => Some(blob),
                Err(err) => {
                    warn!(
                        "Omitting observation for sensor {:?}: {}",
                        self.sensor.name(),
                        err
                    );
                    None
                }
            }
        });
        let observation_spec = if self.need_observation_spec {
            match self.sensor.observation_spec().to_blob(self.encoding) {
                Ok(blob) => Some(blob),
                Err(err) => {
                    warn!(
                        "Omitting observation spec for sensor {:?}: {}",
                        self.sensor.name(),
                        err
                    );
                    None
                }
            }
        } else {
            None
        };

        SensorSnapshot {
            name: Some(self.sensor.name()),
            control_timestep: self.sensor.control_timestep(),
            is_closed: self.sensor.is_closed(),
            observation,
            observation_spec,
        }
    }
}
