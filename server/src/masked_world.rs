use std::sync::Arc;

use log::{debug, info};
use tokio::sync::watch;

use simlink_shared::{Actor, Sensor, SessionKey, World};

use crate::manager::{ManagerShared, SessionPhase, WorldEvent};
use crate::shared_view::{SharedActorView, SharedSensorView};

/// One session's restricted view of the single real world.
///
/// A masked world sees only the actors and sensors created through its own
/// mutating calls. It is an owning handle: dropping it without an explicit
/// [`MaskedWorld::close`] still tears the session down, releasing the
/// session's real objects.
pub struct MaskedWorld<W: World> {
    key: SessionKey,
    shared: Arc<ManagerShared<W>>,
    step_rx: watch::Receiver<u64>,
    closed: bool,
}

impl<W: World> MaskedWorld<W> {
    pub(crate) fn new(key: SessionKey, shared: Arc<ManagerShared<W>>) -> Self {
        let step_rx = shared.step_gen.subscribe();
        Self {
            key,
            shared,
            step_rx,
            closed: false,
        }
    }

    pub fn session_key(&self) -> SessionKey {
        self.key
    }

    pub fn is_asynchronous(&self) -> bool {
        !self.shared.synchronous
    }

    /// Actors owned by this session, in creation order.
    pub fn actors(&self) -> Vec<Arc<dyn Actor>> {
        let state = self.shared.lock();
        state
            .sessions
            .get(&self.key)
            .map(|session| session.actors.clone())
            .unwrap_or_default()
    }

    /// Sensors owned by this session, in creation order.
    pub fn sensors(&self) -> Vec<Arc<dyn Sensor>> {
        let state = self.shared.lock();
        state
            .sessions
            .get(&self.key)
            .map(|session| session.sensors.clone())
            .unwrap_or_default()
    }

    /// Read-only views of actors owned by other sessions. Views refuse
    /// every mutating call, so a session can observe its neighbors without
    /// being able to steer them.
    pub fn shared_actors(&self) -> Vec<Arc<dyn Actor>> {
        let state = self.shared.lock();
        state
            .sessions
            .iter()
            .filter(|(key, _)| **key != self.key)
            .flat_map(|(_, session)| session.actors.iter())
            .map(|actor| Arc::new(SharedActorView::new(actor.clone())) as Arc<dyn Actor>)
            .collect()
    }

    /// Read-only views of sensors owned by other sessions.
    pub fn shared_sensors(&self) -> Vec<Arc<dyn Sensor>> {
        let state = self.shared.lock();
        state
            .sessions
            .iter()
            .filter(|(key, _)| **key != self.key)
            .flat_map(|(_, session)| session.sensors.iter())
            .map(|sensor| Arc::new(SharedSensorView::new(sensor.clone())) as Arc<dyn Sensor>)
            .collect()
    }

    /// Runs a mutating operation against the real world under the shared
    /// lock.
    ///
    /// The operation reports what it created or removed as [`WorldEvent`]s;
    /// created objects are attributed to this session (the most recent
    /// mutator), removed objects are detached from whichever session owned
    /// them.
    pub fn mutate<R>(&self, operation: impl FnOnce(&mut W) -> (R, Vec<WorldEvent>)) -> R {
        let mut state = self.shared.lock();
        state.last_mutator = Some(self.key);
        let (result, events) = operation(&mut state.world);
        for event in events {
            ManagerShared::route_event(&mut state, event);
        }
        result
    }

    /// Elapsed simulated time accumulated for this session since its last
    /// [`MaskedWorld::step`], without draining it.
    pub fn accumulated_dt(&self) -> f64 {
        let state = self.shared.lock();
        state
            .sessions
            .get(&self.key)
            .map(|session| session.accumulated_dt)
            .unwrap_or(0.0)
    }

    /// Reports this session ready for the next real step, waits for the
    /// step to complete, then drains and returns the elapsed simulated time
    /// accumulated since the last read (covering every step completed in
    /// between).
    pub async fn step(&mut self) -> f64 {
        if self.closed {
            return 0.0;
        }
        {
            let mut state = self.shared.lock();
            let Some(session) = state.sessions.get_mut(&self.key) else {
                return 0.0;
            };
            session.ready = true;
        }
        self.shared.ready_notify.notify_waiters();

        loop {
            // observe the current generation before re-checking the flag, so
            // a step landing in between still wakes the `changed()` below
            self.step_rx.borrow_and_update();
            let still_ready = {
                let state = self.shared.lock();
                state
                    .sessions
                    .get(&self.key)
                    .map(|session| session.ready)
                    .unwrap_or(false)
            };
            if !still_ready {
                break;
            }
            if self.step_rx.changed().await.is_err() {
                // manager dropped; nothing will ever step again
                debug!("Masked world {} lost its manager mid-step", self.key);
                break;
            }
        }

        let mut state = self.shared.lock();
        match state.sessions.get_mut(&self.key) {
            Some(session) => std::mem::take(&mut session.accumulated_dt),
            None => 0.0,
        }
    }

    /// Closes this session: transitions it to `Closing`, closes every actor
    /// and sensor it owns, and removes it from the manager. Idempotent.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        {
            let mut state = self.shared.lock();
            if let Some(session) = state.sessions.get_mut(&self.key) {
                session.phase = SessionPhase::Closing;
            }
            if let Some(mut session) = state.sessions.remove(&self.key) {
                for actor in session.actors.drain(..) {
                    if !actor.is_closed() {
                        actor.close();
                    }
                }
                for sensor in session.sensors.drain(..) {
                    if !sensor.is_closed() {
                        sensor.close();
                    }
                }
            }
            if state.last_mutator == Some(self.key) {
                state.last_mutator = None;
            }
            info!(
                "Deleting masked world {} ({} live)",
                self.key,
                state.sessions.len()
            );
        }
        // a departing session must not stall the step barrier
        self.shared.ready_notify.notify_waiters();
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl<W: World> Drop for MaskedWorld<W> {
    // leak mitigation for handles dropped without an explicit close
    fn drop(&mut self) {
        self.close();
    }
}
