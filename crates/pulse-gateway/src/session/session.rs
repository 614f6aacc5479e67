//! Gateway session state machine
//!
//! Owns the transport connection, orchestrates identify/resume, runs the
//! steady receive loop, and coordinates the heartbeat task. Two long-lived
//! tasks exist per session: the receive loop (driven by `run`) and the
//! heartbeat loop; both are restarted, not resumed, across reconnects.
//!
//! Reconnects are single-flight behind `reconnect_lock` and execute on the
//! receive-loop task. The heartbeat loop signals a lost connection through
//! `reconnect_request` instead of reconnecting in place, so concurrent
//! failure detections collapse into one attempt.

use super::config::SessionConfig;
use super::heartbeat::Heartbeat;
use super::ratelimit::RateLimiter;
use super::signal::Flag;
use crate::dispatch::{Dispatcher, EventPayload};
use crate::error::GatewayError;
use crate::events::EventReconciler;
use crate::protocol::{CloseBehavior, GatewayMessage, HelloPayload, OpCode, ResumePayload};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use pulse_cache::EntityCache;
use pulse_core::{Presence, ReadyData};
use pulse_rest::GatewayUrlProvider;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

/// Connection lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Resolving the URL and opening the transport
    Connecting,
    /// Blocking on the first frame of the handshake
    AwaitingHello,
    /// IDENTIFY sent, waiting for READY
    Identifying,
    /// RESUME sent, waiting for RESUMED
    Resuming,
    /// Handshake-complete event observed
    Ready,
    /// Steady receive loop; caller-facing requests proceed normally
    Steady,
    /// Re-establishing the connection; outbound application traffic blocks
    Reconnecting,
    /// Session ended
    Closed,
}

struct SessionShared {
    config: SessionConfig,
    rest: Arc<dyn GatewayUrlProvider>,
    reconciler: EventReconciler,
    dispatcher: Arc<Dispatcher>,

    state: parking_lot::Mutex<SessionState>,
    session_id: parking_lot::Mutex<Option<String>>,
    sequence: parking_lot::Mutex<Option<u64>>,
    gateway_url: parking_lot::Mutex<Option<String>>,
    resume_url: parking_lot::Mutex<Option<String>>,
    presence: parking_lot::Mutex<Option<Presence>>,
    started: AtomicBool,

    /// Set once the handshake-complete event has been observed
    ready: Flag,
    /// Set while a usable socket exists; gates application sends
    connected: Flag,
    /// Set to request full shutdown
    stopping: Flag,
    /// Set by the heartbeat loop when liveness is lost
    reconnect_request: Flag,

    heartbeat: Heartbeat,
    ratelimiter: RateLimiter,

    writer: tokio::sync::Mutex<Option<WsSink>>,
    reconnect_lock: tokio::sync::Mutex<()>,
    heartbeat_task: parking_lot::Mutex<Option<JoinHandle<()>>>,
}

/// Client session over a gateway connection
///
/// Cheap to clone; clones share one session.
#[derive(Clone)]
pub struct GatewaySession {
    shared: Arc<SessionShared>,
}

impl GatewaySession {
    /// Create a session over the given collaborators
    #[must_use]
    pub fn new(
        config: SessionConfig,
        rest: Arc<dyn GatewayUrlProvider>,
        cache: Arc<EntityCache>,
        dispatcher: Arc<Dispatcher>,
    ) -> Self {
        let presence = config.presence.clone();
        Self {
            shared: Arc::new(SessionShared {
                reconciler: EventReconciler::new(cache, dispatcher.clone()),
                dispatcher,
                rest,
                state: parking_lot::Mutex::new(SessionState::Connecting),
                session_id: parking_lot::Mutex::new(None),
                sequence: parking_lot::Mutex::new(None),
                gateway_url: parking_lot::Mutex::new(None),
                resume_url: parking_lot::Mutex::new(None),
                presence: parking_lot::Mutex::new(presence),
                started: AtomicBool::new(false),
                ready: Flag::new(false),
                connected: Flag::new(false),
                stopping: Flag::new(false),
                reconnect_request: Flag::new(false),
                heartbeat: Heartbeat::new(),
                ratelimiter: RateLimiter::new(),
                writer: tokio::sync::Mutex::new(None),
                reconnect_lock: tokio::sync::Mutex::new(()),
                heartbeat_task: parking_lot::Mutex::new(None),
                config,
            }),
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        *self.shared.state.lock()
    }

    /// Server-issued session id, once READY has been observed
    pub fn session_id(&self) -> Option<String> {
        self.shared.session_id.lock().clone()
    }

    /// Last server sequence seen
    pub fn sequence(&self) -> Option<u64> {
        *self.shared.sequence.lock()
    }

    /// Heartbeat round-trip latency
    pub fn latency(&self) -> Duration {
        self.shared.heartbeat.latency()
    }

    /// The entity cache this session reconciles into
    pub fn cache(&self) -> &Arc<EntityCache> {
        self.shared.reconciler.cache()
    }

    /// The dispatcher consumers register handlers on
    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.shared.dispatcher
    }

    /// Wait until the session has completed its handshake
    pub async fn wait_until_ready(&self) {
        self.shared.ready.wait().await;
    }

    /// Request a full shutdown; `run` returns after the next frame or wake
    pub fn close(&self) {
        self.shared.stopping.set();
    }

    /// Update the client presence.
    ///
    /// Rate-limited like any send. The service additionally enforces a
    /// budget of roughly 5 per minute; exceeding it can force a disconnect,
    /// which the reconnect path absorbs as a transient failure.
    pub async fn update_presence(&self, presence: Presence) -> Result<(), GatewayError> {
        *self.shared.presence.lock() = Some(presence.clone());
        self.shared
            .send_packet(&GatewayMessage::presence_update(&presence))
            .await
    }

    /// Connect and process frames until fatal failure or shutdown.
    ///
    /// Transient failures (resumable closes, missed heartbeat acks) are
    /// handled internally; only session-fatal conditions return an error.
    pub async fn run(&self) -> Result<(), GatewayError> {
        let shared = &self.shared;
        let mut reader = SessionShared::establish(shared, false, None).await?;

        loop {
            let incoming = tokio::select! {
                () = shared.stopping.wait() => {
                    shared.shutdown().await;
                    return Ok(());
                }
                () = shared.reconnect_request.wait() => {
                    drop(reader);
                    reader = SessionShared::establish(shared, true, None).await?;
                    continue;
                }
                incoming = reader.next() => incoming,
            };

            match incoming {
                Some(Ok(Message::Text(text))) => match GatewayMessage::from_json(&text) {
                    Ok(message) => {
                        if let Some(new_reader) =
                            SessionShared::handle_frame(shared, message).await?
                        {
                            reader = new_reader;
                        }
                    }
                    Err(error) => {
                        tracing::warn!(error = %error, "Dropped undecodable frame");
                    }
                },
                Some(Ok(Message::Close(frame))) => {
                    if shared.stopping.is_set() {
                        shared.shutdown().await;
                        return Ok(());
                    }
                    let code = frame.as_ref().map_or(1006, |f| u16::from(f.code));
                    let reason = frame.map(|f| f.reason.into_owned()).unwrap_or_default();

                    match CloseBehavior::classify(code) {
                        CloseBehavior::Fatal => {
                            shared.set_state(SessionState::Closed);
                            tracing::error!(code, reason = %reason, "Gateway closed with fatal code");
                            return Err(GatewayError::close_code(code, reason));
                        }
                        behavior => {
                            tracing::info!(
                                code,
                                resume = behavior.is_resumable(),
                                "Gateway closed, reconnecting"
                            );
                            drop(reader);
                            reader = SessionShared::establish(
                                shared,
                                behavior.is_resumable(),
                                Some(code),
                            )
                            .await?;
                        }
                    }
                }
                // Empty control frames are keepalive ticks, not errors
                Some(Ok(_)) => {}
                Some(Err(error)) => {
                    if shared.stopping.is_set() {
                        shared.shutdown().await;
                        return Ok(());
                    }
                    tracing::debug!(error = %error, "Transport read failed, resuming");
                    drop(reader);
                    reader = SessionShared::establish(shared, true, None).await?;
                }
                None => {
                    if shared.stopping.is_set() {
                        shared.shutdown().await;
                        return Ok(());
                    }
                    tracing::debug!("Transport stream ended, resuming");
                    drop(reader);
                    reader = SessionShared::establish(shared, true, None).await?;
                }
            }
        }
    }
}

impl SessionShared {
    fn set_state(&self, state: SessionState) {
        *self.state.lock() = state;
    }

    /// Record a server sequence; the counter never moves backwards within a
    /// session.
    fn set_sequence(&self, seq: u64) {
        let mut guard = self.sequence.lock();
        if guard.is_none_or(|current| seq >= current) {
            *guard = Some(seq);
        }
    }

    /// Establish (or re-establish) the connection and complete the
    /// identify/resume handshake. Single-flight: concurrent triggers queue
    /// on `reconnect_lock` rather than double-connecting.
    async fn establish(
        this: &Arc<Self>,
        resumable: bool,
        close_code: Option<u16>,
    ) -> Result<WsSource, GatewayError> {
        let _guard = this.reconnect_lock.lock().await;

        this.reconnect_request.clear();
        this.ready.clear();
        this.connected.clear();

        // cancel the in-flight heartbeat task before it races on fresh state
        this.heartbeat.request_reset();
        if let Some(task) = this.heartbeat_task.lock().take() {
            task.abort();
        }

        {
            let mut writer = this.writer.lock().await;
            if writer.is_some() {
                this.set_state(SessionState::Reconnecting);
            }
            if let Some(mut sink) = writer.take() {
                let frame = CloseFrame {
                    code: close_code.unwrap_or(1000).into(),
                    reason: "".into(),
                };
                let _ = sink.send(Message::Close(Some(frame))).await;
                let _ = sink.close().await;
            }
        }

        // resumes reuse the session-scoped URL; fresh identifies the cached
        // gateway URL, falling back to REST resolution
        let resume = resumable && this.session_id.lock().is_some();
        if !resume {
            // session identity does not survive a non-resumable close; the
            // sequence is retained until a new READY restarts tracking
            *this.session_id.lock() = None;
            *this.resume_url.lock() = None;
        }
        let url = if resume {
            this.resume_url.lock().clone()
        } else {
            None
        };
        let url = match url.or_else(|| this.gateway_url.lock().clone()) {
            Some(url) => url,
            None => {
                let url = this.rest.gateway_url().await?;
                *this.gateway_url.lock() = Some(url.clone());
                url
            }
        };

        this.set_state(SessionState::Connecting);
        let (mut stream, _response) = connect_async(url.as_str()).await?;

        this.set_state(SessionState::AwaitingHello);
        let hello = Self::await_hello(&mut stream).await?;
        this.heartbeat
            .set_interval(Duration::from_millis(hello.heartbeat_interval));
        tracing::debug!(interval_ms = hello.heartbeat_interval, "HELLO");

        let (sink, source) = stream.split();
        *this.writer.lock().await = Some(sink);

        this.heartbeat.prepare();
        let task = tokio::spawn(Self::run_heartbeat(this.clone()));
        *this.heartbeat_task.lock() = Some(task);

        if resume {
            this.set_state(SessionState::Resuming);
            let payload = ResumePayload {
                token: this.config.token.clone(),
                session_id: this.session_id.lock().clone().unwrap_or_default(),
                seq: *this.sequence.lock(),
            };
            this.send_control(&GatewayMessage::resume(&payload)).await?;
            tracing::debug!(session_id = %payload.session_id, seq = ?payload.seq, "RESUME");
        } else {
            this.set_state(SessionState::Identifying);
            let presence = this.presence.lock().clone();
            let payload = this.config.identify_payload(presence);
            this.send_control(&GatewayMessage::identify(&payload)).await?;
            tracing::debug!("IDENTIFY");
        }

        this.connected.set();
        Ok(source)
    }

    /// Block for the first frame of a fresh connection, which must be HELLO.
    /// Any close or unexpected frame here is fatal to this attempt; the
    /// caller owns the retry decision.
    async fn await_hello(stream: &mut WsStream) -> Result<HelloPayload, GatewayError> {
        loop {
            let incoming = stream
                .next()
                .await
                .ok_or_else(|| GatewayError::HandshakeFailure("transport closed before HELLO".into()))?;

            match incoming? {
                Message::Text(text) => {
                    let message = GatewayMessage::from_json(&text)?;
                    return message.as_hello().ok_or_else(|| {
                        GatewayError::HandshakeFailure(format!("expected HELLO, got {}", message.op))
                    });
                }
                Message::Close(frame) => {
                    let code = frame.map_or(1006, |f| u16::from(f.code));
                    return Err(GatewayError::HandshakeFailure(format!(
                        "gateway closed during handshake with code {code}"
                    )));
                }
                _ => {} // keepalive frames may precede HELLO
            }
        }
    }

    /// Handle one decoded frame. Returns a new reader when the frame forced
    /// a reconnect (server RECONNECT / INVALID_SESSION).
    async fn handle_frame(
        this: &Arc<Self>,
        message: GatewayMessage,
    ) -> Result<Option<WsSource>, GatewayError> {
        if let Some(seq) = message.s {
            this.set_sequence(seq);
        }

        match message.op {
            OpCode::Dispatch => {
                this.handle_dispatch(&message);
                Ok(None)
            }
            OpCode::Heartbeat => {
                // the server may request an immediate beat
                this.send_heartbeat().await?;
                Ok(None)
            }
            OpCode::HeartbeatAck => {
                this.heartbeat.ack();
                tracing::trace!("HEARTBEAT_ACK");
                Ok(None)
            }
            OpCode::Reconnect => {
                tracing::debug!("RECONNECT");
                Ok(Some(Self::establish(this, true, None).await?))
            }
            OpCode::InvalidSession => {
                let resumable = message.as_invalid_session_resumable().unwrap_or(false);
                tracing::debug!(resumable, "INVALID_SESSION");
                this.ready.clear();
                Ok(Some(Self::establish(this, resumable, None).await?))
            }
            OpCode::Hello => {
                tracing::debug!("Unexpected HELLO in steady state, ignored");
                Ok(None)
            }
            op => {
                tracing::debug!(op = %op, "Ignoring unexpected client-only op");
                Ok(None)
            }
        }
    }

    fn handle_dispatch(&self, message: &GatewayMessage) {
        let name = message.event_name().unwrap_or_default();
        let data = message.d.clone().unwrap_or(Value::Null);

        match name {
            "READY" => match serde_json::from_value::<ReadyData>(data.clone()) {
                Ok(ready) => {
                    *self.session_id.lock() = Some(ready.session_id.clone());
                    *self.resume_url.lock() = Some(ready.resume_gateway_url.clone());

                    self.set_state(SessionState::Ready);
                    self.ready.set();

                    self.dispatcher.dispatch("on_ready", &EventPayload::Raw(data));
                    if !self.started.swap(true, Ordering::SeqCst) {
                        self.dispatcher.dispatch("on_start", &EventPayload::None);
                    }

                    tracing::debug!(
                        session_id = %ready.session_id,
                        seq = ?*self.sequence.lock(),
                        "READY"
                    );
                    self.set_state(SessionState::Steady);
                }
                Err(error) => {
                    tracing::warn!(error = %error, "Dropped undecodable READY payload");
                }
            },
            "RESUMED" => {
                tracing::debug!(
                    session_id = ?*self.session_id.lock(),
                    seq = ?*self.sequence.lock(),
                    "RESUMED"
                );
                self.ready.set();
                self.set_state(SessionState::Steady);
                self.dispatcher.dispatch("on_resumed", &EventPayload::None);
            }
            _ => self.reconciler.process(name, &data),
        }
    }

    /// Wrapper so a heartbeat-loop failure is loud: a silently dead loop
    /// degrades liveness detection until the server force-closes.
    async fn run_heartbeat(shared: Arc<Self>) {
        if let Err(error) = Self::heartbeat_loop(&shared).await {
            tracing::error!(error = %error, "Heartbeat loop failed, closing session");
            shared.stopping.set();
        }
    }

    async fn heartbeat_loop(shared: &Arc<Self>) -> Result<(), GatewayError> {
        tracing::debug!(
            interval_ms = shared.heartbeat.interval().as_millis() as u64,
            "Heartbeat loop started"
        );

        loop {
            tokio::select! {
                () = shared.heartbeat.reset_signal().wait() => {
                    tracing::debug!("Heartbeat loop reset");
                    return Ok(());
                }
                () = shared.stopping.wait() => return Ok(()),
                () = tokio::time::sleep(shared.heartbeat.interval()) => {}
            }

            if !shared.heartbeat.is_acked() {
                // presumed half-open; hand the resume to the receive loop
                // before sending anything further
                tracing::warn!("HEARTBEAT_ACK missing, requesting reconnect");
                shared.reconnect_request.set();
                return Ok(());
            }

            shared.heartbeat.mark_pending();
            shared.send_heartbeat().await?;
        }
    }

    async fn send_heartbeat(&self) -> Result<(), GatewayError> {
        let seq = *self.sequence.lock();
        // heartbeats bypass the rate limiter: the service enforces their
        // cadence itself, and delaying one risks a false liveness failure
        self.send_frame(&GatewayMessage::heartbeat(seq)).await?;
        tracing::trace!(seq = ?seq, "HEARTBEAT");
        Ok(())
    }

    /// Handshake sends: rate-limited, but not gated on `connected` since
    /// they are what make the connection usable.
    async fn send_control(&self, message: &GatewayMessage) -> Result<(), GatewayError> {
        self.ratelimiter.acquire().await;
        self.send_frame(message).await
    }

    /// Application sends: rate-limited and blocked while a reconnect is in
    /// progress.
    async fn send_packet(&self, message: &GatewayMessage) -> Result<(), GatewayError> {
        if message.op != OpCode::Heartbeat {
            self.ratelimiter.acquire().await;
            self.connected.wait().await;
        }
        self.send_frame(message).await
    }

    async fn send_frame(&self, message: &GatewayMessage) -> Result<(), GatewayError> {
        let json = message.to_json()?;

        let mut guard = self.writer.lock().await;
        let sink = guard.as_mut().ok_or(GatewayError::NotConnected)?;
        sink.send(Message::Text(json)).await?;

        self.heartbeat.record_send();
        Ok(())
    }

    async fn shutdown(&self) {
        self.set_state(SessionState::Closed);

        self.heartbeat.request_reset();
        if let Some(task) = self.heartbeat_task.lock().take() {
            task.abort();
        }

        if let Some(mut sink) = self.writer.lock().await.take() {
            let frame = CloseFrame {
                code: 1000.into(),
                reason: "".into(),
            };
            let _ = sink.send(Message::Close(Some(frame))).await;
            let _ = sink.close().await;
        }

        self.connected.clear();
        self.ready.clear();
        tracing::info!("Gateway session closed");
    }
}

impl std::fmt::Debug for GatewaySession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewaySession")
            .field("state", &*self.shared.state.lock())
            .field("session_id", &*self.shared.session_id.lock())
            .field("sequence", &*self.shared.sequence.lock())
            .finish()
    }
}
