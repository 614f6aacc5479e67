//! Gateway session integration tests
//!
//! Each test drives a real client session against an in-process mock
//! gateway speaking the wire protocol.
//!
//! Run with: cargo test -p integration-tests --test session_tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use integration_tests::{
    channel_data, guild_data, message_data, wait_until, MockGateway, TestSession, TEST_TOKEN,
};
use pulse_cache::{CacheKey, EntityCache};
use pulse_core::{Presence, Snowflake, StatusType};
use pulse_gateway::{Dispatcher, EventPayload, GatewayError, SessionState};

// ============================================================================
// Handshake
// ============================================================================

#[tokio::test]
async fn test_connect_identify_ready() {
    let mock = MockGateway::start().await.unwrap();
    let harness = TestSession::start(&mock).await.unwrap();

    assert_eq!(mock.connection_count(), 1);
    assert_eq!(mock.identify_count(), 1);
    assert_eq!(harness.session.session_id().as_deref(), Some("sess-1"));
    assert_eq!(harness.session.state(), SessionState::Steady);

    // the identify payload carried the configured token and intents
    let identifies = mock.received_ops(2);
    assert_eq!(identifies.len(), 1);
    assert_eq!(identifies[0]["d"]["token"], TEST_TOKEN);
    assert!(identifies[0]["d"]["intents"].as_u64().unwrap() > 0);
    assert!(identifies[0]["d"]["properties"]["browser"].is_string());

    harness.stop().await.unwrap();
}

#[tokio::test]
async fn test_ready_fires_lifecycle_events_once() {
    let mock = MockGateway::start().await.unwrap();

    let dispatcher = Arc::new(Dispatcher::new());
    let readies = Arc::new(AtomicUsize::new(0));
    let starts = Arc::new(AtomicUsize::new(0));
    {
        let readies = readies.clone();
        dispatcher.register("on_ready", move |_| {
            readies.fetch_add(1, Ordering::SeqCst);
        });
        let starts = starts.clone();
        dispatcher.register("on_start", move |_| {
            starts.fetch_add(1, Ordering::SeqCst);
        });
    }

    let harness = TestSession::spawn_with(&mock, Arc::new(EntityCache::new()), dispatcher);
    tokio::time::timeout(Duration::from_secs(5), harness.session.wait_until_ready())
        .await
        .unwrap();

    // a clean close forces a fresh identify and a second READY
    mock.close_current(1000, "rotate");
    assert!(wait_until(Duration::from_secs(5), || mock.identify_count() == 2).await);
    assert!(wait_until(Duration::from_secs(5), || {
        readies.load(Ordering::SeqCst) == 2
    })
    .await);

    // on_start stays at one across session restarts
    assert_eq!(starts.load(Ordering::SeqCst), 1);

    harness.stop().await.unwrap();
}

// ============================================================================
// Close-code policy
// ============================================================================

#[tokio::test]
async fn test_clean_close_reidentifies() {
    let mock = MockGateway::start().await.unwrap();
    let harness = TestSession::start(&mock).await.unwrap();

    mock.close_current(1000, "");

    assert!(wait_until(Duration::from_secs(5), || mock.connection_count() == 2).await);
    assert!(wait_until(Duration::from_secs(5), || mock.identify_count() == 2).await);
    assert_eq!(mock.resume_count(), 0);

    harness.stop().await.unwrap();
}

#[tokio::test]
async fn test_abnormal_close_resumes() {
    let mock = MockGateway::start().await.unwrap();
    let harness = TestSession::start(&mock).await.unwrap();

    mock.close_current(1011, "server hiccup");

    assert!(wait_until(Duration::from_secs(5), || mock.resume_count() == 1).await);
    assert_eq!(mock.identify_count(), 1);
    assert_eq!(mock.connection_count(), 2);

    // the resume carried the prior session identity
    let resumes = mock.received_ops(6);
    assert_eq!(resumes[0]["d"]["session_id"], "sess-1");
    assert_eq!(resumes[0]["d"]["token"], TEST_TOKEN);

    harness.stop().await.unwrap();
}

#[tokio::test]
async fn test_fatal_close_surfaces_error() {
    let mock = MockGateway::start().await.unwrap();
    let harness = TestSession::start(&mock).await.unwrap();

    mock.close_current(4004, "authentication failed");

    let result = tokio::time::timeout(Duration::from_secs(5), harness.handle)
        .await
        .unwrap()
        .unwrap();

    match result {
        Err(GatewayError::CloseCode { code, .. }) => assert_eq!(code, 4004),
        other => panic!("expected fatal close code, got {other:?}"),
    }
    assert_eq!(mock.connection_count(), 1);
}

#[tokio::test]
async fn test_suppressed_presence_close_code_resumes() {
    let mock = MockGateway::start().await.unwrap();
    let harness = TestSession::start(&mock).await.unwrap();

    // 4001 is the known benign presence artifact: recoverable, not fatal
    mock.close_current(4001, "spurious");

    assert!(wait_until(Duration::from_secs(5), || mock.resume_count() == 1).await);
    assert!(!harness.handle.is_finished());

    harness.stop().await.unwrap();
}

// ============================================================================
// Heartbeats
// ============================================================================

#[tokio::test]
async fn test_heartbeats_follow_hello_interval() {
    let mock = MockGateway::start_with_interval(100).await.unwrap();
    let harness = TestSession::start(&mock).await.unwrap();

    assert!(wait_until(Duration::from_secs(5), || {
        mock.received_ops(1).len() >= 3
    })
    .await);

    // beats carry the last seen sequence
    let beats = mock.received_ops(1);
    assert!(beats.last().unwrap()["d"].is_u64());

    harness.stop().await.unwrap();
}

#[tokio::test]
async fn test_missed_ack_triggers_single_resume() {
    let mock = MockGateway::start_with_interval(150).await.unwrap();
    let harness = TestSession::start(&mock).await.unwrap();

    mock.set_ack_heartbeats(false);
    assert!(wait_until(Duration::from_secs(5), || mock.resume_count() == 1).await);
    mock.set_ack_heartbeats(true);

    // exactly one reconnect for the missed ack, and the session recovers
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(mock.resume_count(), 1);
    assert_eq!(mock.identify_count(), 1);
    assert_eq!(mock.connection_count(), 2);

    harness.stop().await.unwrap();
}

// ============================================================================
// Event reconciliation through a live session
// ============================================================================

#[tokio::test]
async fn test_dispatch_reconciles_into_cache() {
    let mock = MockGateway::start().await.unwrap();
    let harness = TestSession::start(&mock).await.unwrap();
    let cache = harness.session.cache().clone();

    mock.dispatch("GUILD_CREATE", guild_data(5));
    mock.dispatch("CHANNEL_CREATE", channel_data(7, 5, "general"));

    assert!(wait_until(Duration::from_secs(5), || {
        cache.channels.get(CacheKey::Id(Snowflake::new(7))).is_some()
    })
    .await);

    // the guild's channel list mirrors the create exactly once
    let guild = cache.guilds.get(CacheKey::Id(Snowflake::new(5))).unwrap();
    assert_eq!(guild.channels.len(), 1);
    assert_eq!(guild.channels[0].name.as_deref(), Some("general"));

    harness.stop().await.unwrap();
}

#[tokio::test]
async fn test_update_delivers_before_and_after() {
    let mock = MockGateway::start().await.unwrap();

    let dispatcher = Arc::new(Dispatcher::new());
    let snapshots = Arc::new(capture::Captured::default());
    {
        let snapshots = snapshots.clone();
        dispatcher.register("on_channel_update", move |payload| {
            if let EventPayload::Pair { before, after } = payload {
                if let (
                    pulse_gateway::events::Entity::Channel(before),
                    pulse_gateway::events::Entity::Channel(after),
                ) = (&**before, &**after)
                {
                    snapshots.push((before.name.clone(), after.name.clone()));
                }
            }
        });
    }

    let harness = TestSession::spawn_with(&mock, Arc::new(EntityCache::new()), dispatcher);
    tokio::time::timeout(Duration::from_secs(5), harness.session.wait_until_ready())
        .await
        .unwrap();

    mock.dispatch("CHANNEL_CREATE", channel_data(7, 5, "old-name"));
    mock.dispatch(
        "CHANNEL_UPDATE",
        serde_json::json!({"id": "7", "name": "new-name"}),
    );

    assert!(wait_until(Duration::from_secs(5), || !snapshots.is_empty()).await);

    let (before, after) = snapshots.first().unwrap();
    assert_eq!(before.as_deref(), Some("old-name"));
    assert_eq!(after.as_deref(), Some("new-name"));

    harness.stop().await.unwrap();
}

#[tokio::test]
async fn test_uncached_message_delete_is_forwarded() {
    let mock = MockGateway::start().await.unwrap();

    let dispatcher = Arc::new(Dispatcher::new());
    let deletes = Arc::new(AtomicUsize::new(0));
    {
        let deletes = deletes.clone();
        dispatcher.register("on_message_delete", move |_| {
            deletes.fetch_add(1, Ordering::SeqCst);
        });
    }

    let harness = TestSession::spawn_with(&mock, Arc::new(EntityCache::new()), dispatcher);
    tokio::time::timeout(Duration::from_secs(5), harness.session.wait_until_ready())
        .await
        .unwrap();

    // delete for a message the session never saw
    mock.dispatch(
        "MESSAGE_DELETE",
        serde_json::json!({"id": "404", "channel_id": "7"}),
    );

    assert!(wait_until(Duration::from_secs(5), || {
        deletes.load(Ordering::SeqCst) == 1
    })
    .await);

    harness.stop().await.unwrap();
}

#[tokio::test]
async fn test_sequence_tracks_dispatch_order() {
    let mock = MockGateway::start().await.unwrap();
    let harness = TestSession::start(&mock).await.unwrap();

    for i in 0..3 {
        mock.dispatch("MESSAGE_CREATE", message_data(100 + i, 7));
    }

    assert!(wait_until(Duration::from_secs(5), || {
        harness.session.sequence().unwrap_or(0) >= 4
    })
    .await);

    harness.stop().await.unwrap();
}

// ============================================================================
// Outbound traffic
// ============================================================================

#[tokio::test]
async fn test_presence_update_reaches_the_wire() {
    let mock = MockGateway::start().await.unwrap();
    let harness = TestSession::start(&mock).await.unwrap();

    harness
        .session
        .update_presence(Presence::new(StatusType::Idle).with_activity("testing", 0))
        .await
        .unwrap();

    assert!(wait_until(Duration::from_secs(5), || {
        !mock.received_ops(3).is_empty()
    })
    .await);

    let frames = mock.received_ops(3);
    assert_eq!(frames[0]["d"]["status"], "idle");
    assert_eq!(frames[0]["d"]["activities"][0]["name"], "testing");

    harness.stop().await.unwrap();
}

#[tokio::test]
async fn test_close_exits_cleanly() {
    let mock = MockGateway::start().await.unwrap();
    let harness = TestSession::start(&mock).await.unwrap();

    harness.stop().await.unwrap();
}

/// Snapshot capture helper used by the before/after test
mod capture {
    use std::sync::Mutex;

    type Snapshot = (Option<String>, Option<String>);

    #[derive(Default)]
    pub struct Captured {
        inner: Mutex<Vec<Snapshot>>,
    }

    impl Captured {
        pub fn push(&self, value: Snapshot) {
            self.inner.lock().unwrap().push(value);
        }

        pub fn is_empty(&self) -> bool {
            self.inner.lock().unwrap().is_empty()
        }

        pub fn first(&self) -> Option<Snapshot> {
            self.inner.lock().unwrap().first().cloned()
        }
    }
}
