//! Streaming service failure isolation: one session's malformed frames or
//! tick failures never disturb another session's cycle.

use std::time::Duration;

use async_trait::async_trait;

use simlink_server::{ManagerConfig, StreamingService, WorldManager, WorldWrapper};
use simlink_shared::{
    decode_frame, encode_frame, BlobEncoding, EndpointError, RemoteEndpoint, SensorRequest,
    WorldRequest, WorldSnapshot,
};
use simlink_test::helpers::TestWorld;

fn world_manager() -> WorldManager<TestWorld> {
    WorldManager::new(
        TestWorld::new(0.1),
        ManagerConfig {
            synchronous: false,
            max_step_wait: Duration::from_millis(200),
        },
    )
}

#[tokio::test]
async fn malformed_frame_disconnects_only_the_offending_session() {
    let _ = env_logger::builder().is_test(true).try_init();

    let manager = world_manager();
    let mut service = StreamingService::new();

    let (bad_client, bad_server) = simlink_shared::message_channel();
    let (_bad_sender, mut bad_receiver) = bad_client;
    let (bad_server_sender, _bad_server_receiver) = bad_server;
    let bad_key = service.session_connected(
        WorldWrapper::new(manager.get_world(), BlobEncoding::Raw),
        bad_server_sender,
    );

    let (good_client, good_server) = simlink_shared::message_channel();
    let (_good_sender, mut good_receiver) = good_client;
    let (good_server_sender, _good_server_receiver) = good_server;
    let good_key = service.session_connected(
        WorldWrapper::new(manager.get_world(), BlobEncoding::Raw),
        good_server_sender,
    );

    service.tick().await; // initial snapshots
    bad_receiver.recv().await.unwrap().unwrap();
    good_receiver.recv().await.unwrap().unwrap();

    service.message_received(bad_key, &[0xff; 32]).await;
    assert!(!service.is_connected(bad_key));
    assert!(service.is_connected(good_key));
    assert_eq!(service.session_count(), 1);
    // the offending session's masked world was released with its endpoint
    assert_eq!(manager.session_count(), 1);

    // the healthy session still completes a full cycle
    service
        .message_received(good_key, &encode_frame(&WorldRequest::default()).unwrap())
        .await;
    service.tick().await;
    let snapshot: WorldSnapshot =
        decode_frame(&good_receiver.recv().await.unwrap().unwrap()).unwrap();
    assert!(!snapshot.is_closed);

    // the disconnected peer's stream has ended
    assert!(bad_receiver.recv().await.unwrap().is_none());
}

struct FlakyEndpoint {
    fail: bool,
}

#[async_trait]
impl RemoteEndpoint for FlakyEndpoint {
    type Inbound = SensorRequest;
    type Outbound = SensorRequest;

    fn depack(&mut self, _inbound: SensorRequest) {}

    async fn tick(&mut self) -> Result<(), EndpointError> {
        if self.fail {
            Err(EndpointError::Step("engine exploded".to_string()))
        } else {
            Ok(())
        }
    }

    fn pack(&mut self) -> SensorRequest {
        SensorRequest::default()
    }
}

#[tokio::test]
async fn tick_failure_disconnects_only_its_own_session() {
    let mut service = StreamingService::new();

    let (flaky_client, flaky_server) = simlink_shared::message_channel();
    let (_, mut flaky_receiver) = flaky_client;
    let (flaky_sender, _) = flaky_server;
    let flaky_key = service.session_connected(FlakyEndpoint { fail: true }, flaky_sender);

    let (steady_client, steady_server) = simlink_shared::message_channel();
    let (_, mut steady_receiver) = steady_client;
    let (steady_sender, _) = steady_server;
    let steady_key = service.session_connected(FlakyEndpoint { fail: false }, steady_sender);

    service.tick().await;

    assert!(!service.is_connected(flaky_key));
    assert!(service.is_connected(steady_key));

    // the steady session got its frame; the flaky one got a closed stream
    assert!(steady_receiver.recv().await.unwrap().is_some());
    assert!(flaky_receiver.recv().await.unwrap().is_none());
}

#[tokio::test]
async fn frames_for_unknown_sessions_are_ignored() {
    let mut service: StreamingService<FlakyEndpoint> = StreamingService::new();

    let (client, server) = simlink_shared::message_channel();
    let (_, _client_receiver) = client;
    let (sender, _) = server;
    let key = service.session_connected(FlakyEndpoint { fail: false }, sender);
    service.session_disconnected(key).await;

    // no session left; the frame is dropped without effect
    service
        .message_received(key, &encode_frame(&SensorRequest::default()).unwrap())
        .await;
    assert_eq!(service.session_count(), 0);
}
