use log::warn;

use simlink_shared::{ObservationFrame, SensorRequest, SensorSnapshot, Space};

/// Local shadow of a remote sensor, reconstructed purely from snapshots.
///
/// Created lazily on the first snapshot that mentions its handle and updated
/// in place thereafter, so cached state (the resolved shape descriptor, the
/// last decoded observation) survives across ticks.
pub struct SensorMirror {
    name: Option<String>,
    control_timestep: f64,
    closed: bool,
    close_requested: bool,
    last_observation: Option<ObservationFrame>,
    observation_spec: Option<Space>,
}

impl SensorMirror {
    pub(crate) fn from_snapshot(snapshot: SensorSnapshot) -> Self {
        let mut mirror = Self {
            name: None,
            control_timestep: 0.0,
            closed: false,
            close_requested: false,
            last_observation: None,
            observation_spec: None,
        };
        mirror.depack(snapshot);
        mirror
    }

    pub(crate) fn depack(&mut self, snapshot: SensorSnapshot) {
        if snapshot.name.is_some() {
            self.name = snapshot.name;
        }
        self.control_timestep = snapshot.control_timestep;
        self.closed = snapshot.is_closed;

        if let Some(blob) = snapshot.observation {
            match blob.unpack() {
                Ok(bytes) => {
                    self.last_observation = Some(ObservationFrame {
                        tag: blob.tag,
                        bytes,
                    });
                }
                Err(err) => warn!("Discarding undecodable observation for {:?}: {}", self.name, err),
            }
        }

        // a snapshot that omits the descriptor leaves the cached one intact
        if let Some(blob) = snapshot.observation_spec {
            match Space::from_blob(&blob) {
                Ok(space) => self.observation_spec = Some(space),
                Err(err) => warn!(
                    "Discarding undecodable observation spec for {:?}: {}",
                    self.name, err
                ),
            }
        }
    }

    pub(crate) fn pack(&mut self) -> SensorRequest {
        SensorRequest {
            close: self.close_requested,
            need_observation_spec: self.observation_spec.is_none(),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn control_timestep(&self) -> f64 {
        self.control_timestep
    }

    /// Latest observation received from the owner, if any.
    pub fn last_observation(&self) -> Option<&ObservationFrame> {
        self.last_observation.as_ref()
    }

    pub fn observation_spec(&self) -> Option<&Space> {
        self.observation_spec.as_ref()
    }

    /// Asks the owner to close the real sensor on the next request.
    pub fn close(&mut self) {
        self.close_requested = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}
