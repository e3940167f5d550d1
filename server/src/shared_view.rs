use std::sync::Arc;

use simlink_shared::{ActionValue, Actor, ObservationFrame, Sensor, Space};

/// Read-only projection of a sensor owned by another session.
///
/// Reads pass through; mutation is refused: `close` is a no-op and the view
/// yields no observations of its own.
pub struct SharedSensorView {
    inner: Arc<dyn Sensor>,
}

impl SharedSensorView {
    pub fn new(inner: Arc<dyn Sensor>) -> Self {
        Self { inner }
    }
}

impl Sensor for SharedSensorView {
    fn name(&self) -> String {
        self.inner.name()
    }

    fn control_timestep(&self) -> f64 {
        self.inner.control_timestep()
    }

    fn observation_spec(&self) -> Space {
        self.inner.observation_spec()
    }

    fn pull_observation(&self) -> Option<ObservationFrame> {
        // observing through a shared view would race the owning session
        None
    }

    fn close(&self) {}

    fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }
}

/// Read-only projection of an actor owned by another session. Actions are
/// rejected, close is a no-op, and owned sensors come back wrapped in
/// [`SharedSensorView`].
pub struct SharedActorView {
    inner: Arc<dyn Actor>,
}

impl SharedActorView {
    pub fn new(inner: Arc<dyn Actor>) -> Self {
        Self { inner }
    }
}

impl Actor for SharedActorView {
    fn name(&self) -> String {
        self.inner.name()
    }

    fn control_timestep(&self) -> f64 {
        self.inner.control_timestep()
    }

    fn sensors(&self) -> Vec<Arc<dyn Sensor>> {
        self.inner
            .sensors()
            .into_iter()
            .map(|sensor| Arc::new(SharedSensorView::new(sensor)) as Arc<dyn Sensor>)
            .collect()
    }

    fn action_spec(&self) -> Space {
        self.inner.action_spec()
    }

    fn apply_action(&self, _action: &ActionValue) -> bool {
        false
    }

    fn close(&self) {}

    fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }
}
