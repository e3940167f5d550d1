use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use log::{info, warn};
use tokio::sync::{watch, Notify};

use simlink_shared::{Actor, Sensor, SessionKey, StepError, World};

use crate::masked_world::MaskedWorld;

/// Configuration for a [`WorldManager`].
#[derive(Clone)]
pub struct ManagerConfig {
    /// In synchronous mode `advance()` gates the real step behind the
    /// readiness barrier; in asynchronous mode it steps immediately.
    pub synchronous: bool,
    /// Upper bound on how long `advance()` waits for slow sessions before
    /// stepping regardless.
    pub max_step_wait: Duration,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            synchronous: true,
            max_step_wait: Duration::from_secs(5),
        }
    }
}

/// A mutation observed on the real world, reported by the code performing it
/// so the manager can attribute the affected object to a session.
pub enum WorldEvent {
    ActorAdded(Arc<dyn Actor>),
    ActorRemoved(Arc<dyn Actor>),
    SensorAdded(Arc<dyn Sensor>),
    SensorRemoved(Arc<dyn Sensor>),
}

/// Lifecycle of a masked world. There is no transition back to `Active`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    Active,
    Closing,
}

pub(crate) struct SessionState {
    pub(crate) phase: SessionPhase,
    pub(crate) actors: Vec<Arc<dyn Actor>>,
    pub(crate) sensors: Vec<Arc<dyn Sensor>>,
    pub(crate) ready: bool,
    pub(crate) accumulated_dt: f64,
}

impl SessionState {
    fn new() -> Self {
        Self {
            phase: SessionPhase::Active,
            actors: Vec::new(),
            sensors: Vec::new(),
            ready: false,
            accumulated_dt: 0.0,
        }
    }
}

pub(crate) struct ManagerState<W> {
    pub(crate) world: W,
    pub(crate) sessions: HashMap<SessionKey, SessionState>,
    /// The masked world that most recently performed a mutating call; newly
    /// created objects are attributed to it.
    pub(crate) last_mutator: Option<SessionKey>,
    next_key: u64,
}

pub(crate) struct ManagerShared<W> {
    pub(crate) state: Mutex<ManagerState<W>>,
    /// Woken by sessions reporting ready (and by closing sessions, so a
    /// departing session cannot stall the barrier).
    pub(crate) ready_notify: Notify,
    /// Bumped once per completed real step; sessions await it in `step()`.
    pub(crate) step_gen: watch::Sender<u64>,
    pub(crate) synchronous: bool,
}

impl<W> ManagerShared<W> {
    pub(crate) fn lock(&self) -> MutexGuard<'_, ManagerState<W>> {
        self.state.lock().expect("world manager lock poisoned")
    }

    pub(crate) fn route_event(state: &mut ManagerState<W>, event: WorldEvent) {
        match event {
            WorldEvent::ActorAdded(actor) => {
                let Some(owner) = state.last_mutator else {
                    return;
                };
                if let Some(session) = state.sessions.get_mut(&owner) {
                    session.actors.push(actor);
                }
            }
            WorldEvent::SensorAdded(sensor) => {
                let Some(owner) = state.last_mutator else {
                    return;
                };
                if let Some(session) = state.sessions.get_mut(&owner) {
                    session.sensors.push(sensor);
                }
            }
            // removals detach from whichever session owns the object, so the
            // at-most-one-owner invariant holds even when another session
            // performed the removal
            WorldEvent::ActorRemoved(actor) => {
                for session in state.sessions.values_mut() {
                    session.actors.retain(|owned| !Arc::ptr_eq(owned, &actor));
                }
            }
            WorldEvent::SensorRemoved(sensor) => {
                for session in state.sessions.values_mut() {
                    session.sensors.retain(|owned| !Arc::ptr_eq(owned, &sensor));
                }
            }
        }
    }
}

/// Owns the single real world and multiplexes it across independent
/// sessions, each seeing only the objects it created itself.
///
/// The owning process drives stepping through [`WorldManager::advance`];
/// sessions report readiness through [`MaskedWorld::step`].
pub struct WorldManager<W: World> {
    shared: Arc<ManagerShared<W>>,
    config: ManagerConfig,
}

impl<W: World> WorldManager<W> {
    pub fn new(world: W, config: ManagerConfig) -> Self {
        let (step_gen, _) = watch::channel(0u64);
        Self {
            shared: Arc::new(ManagerShared {
                state: Mutex::new(ManagerState {
                    world,
                    sessions: HashMap::new(),
                    last_mutator: None,
                    next_key: 0,
                }),
                ready_notify: Notify::new(),
                step_gen,
                synchronous: config.synchronous,
            }),
            config,
        }
    }

    /// Registers a new session and hands back its masked view of the world.
    pub fn get_world(&self) -> MaskedWorld<W> {
        let key = {
            let mut state = self.shared.lock();
            let key = SessionKey(state.next_key);
            state.next_key += 1;
            state.sessions.insert(key, SessionState::new());
            info!(
                "Creating new masked world {} ({} live)",
                key,
                state.sessions.len()
            );
            key
        };
        MaskedWorld::new(key, Arc::clone(&self.shared))
    }

    /// Number of live masked worlds.
    pub fn session_count(&self) -> usize {
        self.shared.lock().sessions.len()
    }

    pub fn is_asynchronous(&self) -> bool {
        !self.config.synchronous
    }

    /// Advances the real world by one step.
    ///
    /// In synchronous mode, waits up to `max_step_wait` for every active
    /// session to report ready, then steps regardless; sessions that missed
    /// the barrier receive a world that advanced without their input this
    /// round. After the step every session's elapsed-time accumulator grows
    /// by the step's duration and its ready flag clears.
    pub async fn advance(&self) -> Result<f64, StepError> {
        if self.config.synchronous {
            self.await_barrier().await;
        }

        let result = {
            let mut state = self.shared.lock();
            let result = state.world.step();
            let dt = *result.as_ref().unwrap_or(&0.0);
            for session in state.sessions.values_mut() {
                session.accumulated_dt += dt;
                session.ready = false;
            }
            result
        };
        // sessions blocked on the barrier are released even when the step
        // failed, so a simulator fault cannot strand them
        self.shared.step_gen.send_modify(|gen| *gen = gen.wrapping_add(1));
        result
    }

    async fn await_barrier(&self) {
        let deadline = tokio::time::Instant::now() + self.config.max_step_wait;
        loop {
            // arm before checking, so a ready report between the check and
            // the await still wakes us
            let notified = self.shared.ready_notify.notified();

            let pending = self.pending_sessions();
            if pending.is_empty() {
                return;
            }

            let now = tokio::time::Instant::now();
            if now >= deadline {
                warn!(
                    "Step barrier timed out; stepping without {} session(s): {:?}",
                    pending.len(),
                    pending
                );
                return;
            }
            let _ = tokio::time::timeout(deadline - now, notified).await;
        }
    }

    fn pending_sessions(&self) -> Vec<SessionKey> {
        let state = self.shared.lock();
        state
            .sessions
            .iter()
            .filter(|(_, session)| session.phase == SessionPhase::Active && !session.ready)
            .map(|(key, _)| *key)
            .collect()
    }
}
