//! Test helpers for integration tests
//!
//! Provides an in-process mock gateway server that speaks the wire protocol
//! (HELLO, READY, RESUMED, heartbeat acks) and records every client frame,
//! plus utilities for spawning client sessions against it.

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use pulse_cache::EntityCache;
use pulse_core::Intents;
use pulse_gateway::{Dispatcher, GatewayError, GatewaySession, SessionConfig};
use pulse_rest::{GatewayUrlProvider, RestError};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;

use crate::fixtures::{dispatch_frame, heartbeat_ack_frame, hello_frame, ready_data};

/// Token every test session identifies with
pub const TEST_TOKEN: &str = "test-token";

/// Enable tracing output for a test run, honoring `RUST_LOG`
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Serves the mock gateway URL to the session under test
pub struct StaticUrlProvider(pub String);

#[async_trait]
impl GatewayUrlProvider for StaticUrlProvider {
    async fn gateway_url(&self) -> Result<String, RestError> {
        Ok(self.0.clone())
    }
}

struct MockState {
    heartbeat_interval_ms: u64,
    ack_heartbeats: AtomicBool,
    connections: AtomicUsize,
    identifies: AtomicUsize,
    resumes: AtomicUsize,
    sequence: AtomicU64,
    session_counter: AtomicU64,
    received: Mutex<Vec<Value>>,
    current: Mutex<Option<mpsc::UnboundedSender<Message>>>,
    url: Mutex<String>,
}

/// In-process gateway server for end-to-end session tests
pub struct MockGateway {
    state: Arc<MockState>,
    url: String,
    _accept_task: JoinHandle<()>,
}

impl MockGateway {
    /// Start a mock gateway with a long heartbeat interval
    pub async fn start() -> Result<Self> {
        Self::start_with_interval(30_000).await
    }

    /// Start a mock gateway with a custom heartbeat interval
    pub async fn start_with_interval(heartbeat_interval_ms: u64) -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let url = format!("ws://{}", listener.local_addr()?);

        let state = Arc::new(MockState {
            heartbeat_interval_ms,
            ack_heartbeats: AtomicBool::new(true),
            connections: AtomicUsize::new(0),
            identifies: AtomicUsize::new(0),
            resumes: AtomicUsize::new(0),
            sequence: AtomicU64::new(0),
            session_counter: AtomicU64::new(0),
            received: Mutex::new(Vec::new()),
            current: Mutex::new(None),
            url: Mutex::new(url.clone()),
        });

        let accept_state = state.clone();
        let accept_task = tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    return;
                };
                let state = accept_state.clone();
                tokio::spawn(async move {
                    if let Ok(ws) = tokio_tungstenite::accept_async(stream).await {
                        handle_connection(state, ws).await;
                    }
                });
            }
        });

        Ok(Self {
            state,
            url,
            _accept_task: accept_task,
        })
    }

    /// The ws:// URL of this mock
    pub fn url(&self) -> &str {
        &self.url
    }

    /// URL provider pointing the session at this mock
    pub fn provider(&self) -> Arc<dyn GatewayUrlProvider> {
        Arc::new(StaticUrlProvider(self.url.clone()))
    }

    /// Whether heartbeats receive acks
    pub fn set_ack_heartbeats(&self, ack: bool) {
        self.state.ack_heartbeats.store(ack, Ordering::SeqCst);
    }

    /// Total accepted connections
    pub fn connection_count(&self) -> usize {
        self.state.connections.load(Ordering::SeqCst)
    }

    /// Total IDENTIFY frames received
    pub fn identify_count(&self) -> usize {
        self.state.identifies.load(Ordering::SeqCst)
    }

    /// Total RESUME frames received
    pub fn resume_count(&self) -> usize {
        self.state.resumes.load(Ordering::SeqCst)
    }

    /// Every frame received from clients, in arrival order
    pub fn received(&self) -> Vec<Value> {
        self.state.received.lock().unwrap().clone()
    }

    /// Frames received with the given op code
    pub fn received_ops(&self, op: u64) -> Vec<Value> {
        self.received()
            .into_iter()
            .filter(|frame| frame["op"] == op)
            .collect()
    }

    /// Push a dispatch event to the connected client
    pub fn dispatch(&self, event: &str, data: Value) {
        let seq = self.state.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        self.send_raw(Message::Text(dispatch_frame(event, seq, data)));
    }

    /// Push an arbitrary text frame to the connected client
    pub fn send_text(&self, text: String) {
        self.send_raw(Message::Text(text));
    }

    /// Close the current connection with the given code
    pub fn close_current(&self, code: u16, reason: &str) {
        self.send_raw(Message::Close(Some(CloseFrame {
            code: code.into(),
            reason: reason.to_string().into(),
        })));
    }

    fn send_raw(&self, message: Message) {
        if let Some(sender) = self.state.current.lock().unwrap().as_ref() {
            let _ = sender.send(message);
        }
    }
}

async fn handle_connection(
    state: Arc<MockState>,
    ws: tokio_tungstenite::WebSocketStream<tokio::net::TcpStream>,
) {
    state.connections.fetch_add(1, Ordering::SeqCst);

    let (mut sink, mut source) = ws.split();
    if sink
        .send(Message::Text(hello_frame(state.heartbeat_interval_ms)))
        .await
        .is_err()
    {
        return;
    }

    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();
    *state.current.lock().unwrap() = Some(tx.clone());

    let writer = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            if sink.send(message).await.is_err() {
                return;
            }
        }
    });

    while let Some(Ok(message)) = source.next().await {
        match message {
            Message::Text(text) => {
                let Ok(frame) = serde_json::from_str::<Value>(&text) else {
                    continue;
                };
                state.received.lock().unwrap().push(frame.clone());

                match frame["op"].as_u64() {
                    // IDENTIFY -> READY
                    Some(2) => {
                        state.identifies.fetch_add(1, Ordering::SeqCst);
                        let session =
                            state.session_counter.fetch_add(1, Ordering::SeqCst) + 1;
                        let seq = state.sequence.fetch_add(1, Ordering::SeqCst) + 1;
                        let url = state.url.lock().unwrap().clone();
                        let _ = tx.send(Message::Text(dispatch_frame(
                            "READY",
                            seq,
                            ready_data(&format!("sess-{session}"), &url),
                        )));
                    }
                    // RESUME -> RESUMED
                    Some(6) => {
                        state.resumes.fetch_add(1, Ordering::SeqCst);
                        let seq = state.sequence.fetch_add(1, Ordering::SeqCst) + 1;
                        let _ = tx.send(Message::Text(dispatch_frame(
                            "RESUMED",
                            seq,
                            Value::Null,
                        )));
                    }
                    // HEARTBEAT -> HEARTBEAT_ACK
                    Some(1) => {
                        if state.ack_heartbeats.load(Ordering::SeqCst) {
                            let _ = tx.send(Message::Text(heartbeat_ack_frame()));
                        }
                    }
                    _ => {}
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    writer.abort();
}

/// A client session running against a mock gateway
pub struct TestSession {
    pub session: GatewaySession,
    pub handle: JoinHandle<Result<(), GatewayError>>,
}

impl TestSession {
    /// Spawn a session against the mock and wait for READY
    pub async fn start(mock: &MockGateway) -> Result<Self> {
        let harness = Self::spawn(mock);
        tokio::time::timeout(Duration::from_secs(5), harness.session.wait_until_ready())
            .await?;
        Ok(harness)
    }

    /// Spawn a session without waiting for READY
    pub fn spawn(mock: &MockGateway) -> Self {
        Self::spawn_with(mock, Arc::new(EntityCache::new()), Arc::new(Dispatcher::new()))
    }

    /// Spawn a session over a caller-supplied cache and dispatcher, so tests
    /// can register handlers before the first frame arrives
    pub fn spawn_with(
        mock: &MockGateway,
        cache: Arc<EntityCache>,
        dispatcher: Arc<Dispatcher>,
    ) -> Self {
        let config = SessionConfig::new(TEST_TOKEN, Intents::GUILDS | Intents::GUILD_MESSAGES);
        let session = GatewaySession::new(config, mock.provider(), cache, dispatcher);

        let runner = session.clone();
        let handle = tokio::spawn(async move { runner.run().await });

        Self { session, handle }
    }

    /// Stop the session and wait for a clean exit
    pub async fn stop(self) -> Result<(), GatewayError> {
        self.session.close();
        tokio::time::timeout(Duration::from_secs(5), self.handle)
            .await
            .expect("session did not stop in time")
            .expect("session task panicked")
    }
}

/// Poll a condition until it holds or the timeout elapses
pub async fn wait_for<F, Fut>(timeout: Duration, mut condition: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if condition().await {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Synchronous variant of [`wait_for`]
pub async fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if condition() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
