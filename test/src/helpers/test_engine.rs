//! A miniature simulator binding for exercising the sync stack without a
//! real engine. Actors integrate a one-dimensional steer value; their sensor
//! reports the integrated state as a little-endian f64 payload.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use simlink_server::{MaskedWorld, WorldEvent};
use simlink_shared::{
    ActionValue, Actor, ObservationFrame, Sensor, Space, StepError, World,
};

pub struct TestSensor {
    name: String,
    closed: AtomicBool,
    state: Arc<Mutex<f64>>,
}

impl TestSensor {
    pub fn new(name: &str, state: Arc<Mutex<f64>>) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            closed: AtomicBool::new(false),
            state,
        })
    }
}

impl Sensor for TestSensor {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn control_timestep(&self) -> f64 {
        0.05
    }

    fn observation_spec(&self) -> Space {
        Space::Continuous {
            low: vec![f64::MIN],
            high: vec![f64::MAX],
        }
    }

    fn pull_observation(&self) -> Option<ObservationFrame> {
        let state = *self.state.lock().unwrap();
        Some(ObservationFrame {
            tag: "test/state".to_string(),
            bytes: state.to_le_bytes().to_vec(),
        })
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

pub struct TestActor {
    name: String,
    closed: AtomicBool,
    state: Arc<Mutex<f64>>,
    sensor: Arc<TestSensor>,
}

impl TestActor {
    pub fn new(name: &str) -> Arc<Self> {
        let state = Arc::new(Mutex::new(0.0));
        let sensor = TestSensor::new(&format!("{name}/state"), state.clone());
        Arc::new(Self {
            name: name.to_string(),
            closed: AtomicBool::new(false),
            state,
            sensor,
        })
    }

    /// Integrated steer state, for asserting against mirrored observations.
    pub fn state(&self) -> f64 {
        *self.state.lock().unwrap()
    }

    /// Decodes the observation payload this actor's sensor produces.
    pub fn decode_state(frame: &ObservationFrame) -> f64 {
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&frame.bytes);
        f64::from_le_bytes(bytes)
    }
}

impl Actor for TestActor {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn control_timestep(&self) -> f64 {
        0.05
    }

    fn sensors(&self) -> Vec<Arc<dyn Sensor>> {
        vec![self.sensor.clone()]
    }

    fn action_spec(&self) -> Space {
        Space::Continuous {
            low: vec![-1.0],
            high: vec![1.0],
        }
    }

    fn apply_action(&self, action: &ActionValue) -> bool {
        match action {
            ActionValue::Continuous(values) if values.len() == 1 => {
                *self.state.lock().unwrap() += values[0];
                true
            }
            _ => false,
        }
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

pub struct TestWorld {
    pub actors: Vec<Arc<dyn Actor>>,
    pub sensors: Vec<Arc<dyn Sensor>>,
    dt_per_step: f64,
    steps: u32,
}

impl TestWorld {
    pub fn new(dt_per_step: f64) -> Self {
        Self {
            actors: Vec::new(),
            sensors: Vec::new(),
            dt_per_step,
            steps: 0,
        }
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }
}

impl World for TestWorld {
    fn actors(&self) -> Vec<Arc<dyn Actor>> {
        self.actors.clone()
    }

    fn sensors(&self) -> Vec<Arc<dyn Sensor>> {
        self.sensors.clone()
    }

    fn step(&mut self) -> Result<f64, StepError> {
        self.steps += 1;
        Ok(self.dt_per_step)
    }

    fn is_asynchronous(&self) -> bool {
        false
    }
}

/// Spawns a fresh actor into the real world through `masked`, attributing it
/// to that session.
pub fn spawn_test_actor(masked: &MaskedWorld<TestWorld>, name: &str) -> Arc<TestActor> {
    let actor = TestActor::new(name);
    let as_actor: Arc<dyn Actor> = actor.clone();
    masked.mutate(|world| {
        world.actors.push(as_actor.clone());
        ((), vec![WorldEvent::ActorAdded(as_actor.clone())])
    });
    actor
}
