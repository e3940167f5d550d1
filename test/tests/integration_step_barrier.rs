//! Step-barrier concurrency control: readiness gating, bounded waits, and
//! liveness when sessions stall or depart.

use std::time::Duration;

use simlink_server::{ManagerConfig, WorldManager};
use simlink_test::helpers::TestWorld;

const DT: f64 = 0.1;

fn manager(max_step_wait: Duration) -> WorldManager<TestWorld> {
    WorldManager::new(
        TestWorld::new(DT),
        ManagerConfig {
            synchronous: true,
            max_step_wait,
        },
    )
}

#[tokio::test]
async fn step_completes_when_all_sessions_report_ready() {
    let manager = manager(Duration::from_secs(5));
    let mut world_a = manager.get_world();
    let mut world_b = manager.get_world();

    let start = std::time::Instant::now();
    let (dt_a, dt_b, stepped) = tokio::join!(world_a.step(), world_b.step(), async {
        manager.advance().await.unwrap()
    });

    // nobody waited out the barrier
    assert!(start.elapsed() < Duration::from_secs(1));
    assert_eq!(stepped, DT);
    assert_eq!(dt_a, DT);
    assert_eq!(dt_b, DT);
}

#[tokio::test]
async fn silent_session_cannot_block_the_step() {
    let manager = manager(Duration::from_millis(200));
    let mut world_a = manager.get_world();
    let mut world_b = manager.get_world();
    let world_c = manager.get_world(); // never reports ready

    let start = std::time::Instant::now();
    let (dt_a, dt_b, stepped) = tokio::join!(world_a.step(), world_b.step(), async {
        manager.advance().await.unwrap()
    });
    let elapsed = start.elapsed();

    assert!(elapsed >= Duration::from_millis(150));
    assert!(elapsed < Duration::from_secs(1));
    assert_eq!(stepped, DT);
    assert_eq!(dt_a, DT);
    assert_eq!(dt_b, DT);
    // the slow session's accumulator still grew by the step's duration
    assert_eq!(world_c.accumulated_dt(), DT);
}

#[tokio::test]
async fn asynchronous_mode_steps_immediately() {
    let manager = WorldManager::new(
        TestWorld::new(DT),
        ManagerConfig {
            synchronous: false,
            max_step_wait: Duration::from_secs(5),
        },
    );
    let world = manager.get_world(); // never ready

    let start = std::time::Instant::now();
    let stepped = manager.advance().await.unwrap();

    assert!(start.elapsed() < Duration::from_millis(100));
    assert_eq!(stepped, DT);
    assert_eq!(world.accumulated_dt(), DT);
}

#[tokio::test]
async fn departing_session_does_not_stall_the_barrier() {
    let manager = manager(Duration::from_secs(5));
    let mut world_a = manager.get_world();
    let mut world_b = manager.get_world();

    let start = std::time::Instant::now();
    let (dt_a, _, stepped) = tokio::join!(world_a.step(), async { world_b.close() }, async {
        manager.advance().await.unwrap()
    });

    assert!(start.elapsed() < Duration::from_secs(1));
    assert_eq!(stepped, DT);
    assert_eq!(dt_a, DT);
}

#[tokio::test]
async fn accumulator_covers_every_missed_step() {
    let manager = manager(Duration::from_millis(50));
    let mut world = manager.get_world();

    // two steps complete while the session stays silent
    manager.advance().await.unwrap();
    manager.advance().await.unwrap();

    let (dt, _) = tokio::join!(world.step(), async { manager.advance().await.unwrap() });
    assert!((dt - 3.0 * DT).abs() < 1e-9);

    // drained: the next exchange starts from zero
    assert_eq!(world.accumulated_dt(), 0.0);
}

#[tokio::test]
async fn advance_with_no_sessions_steps_directly() {
    let manager = manager(Duration::from_secs(5));
    let start = std::time::Instant::now();
    assert_eq!(manager.advance().await.unwrap(), DT);
    assert!(start.elapsed() < Duration::from_millis(100));
}
