mod test_engine;

pub use test_engine::{spawn_test_actor, TestActor, TestSensor, TestWorld};
