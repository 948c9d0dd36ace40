//! Generic per-task session core: lifecycle state, waiter correlation, and
//! the inbound event dispatch loop shared by all four flavors.
//!
//! # Architecture
//!
//! ```text
//! caller thread                          connection reader task
//! ─────────────                          ──────────────────────
//! start()/send()/stop() ──┐     ┌── TransportEvent stream (wire order)
//!                         ▼     ▼
//!                   ┌───────────────┐
//!                   │  SessionCore  │  state + waiters behind one mutex
//!                   └───────┬───────┘
//!                           │ oneshot resolution
//!                           ▼
//!                   blocked caller unparked
//! ```
//!
//! A waiter is a fresh `oneshot` channel per milestone per task, resolved
//! exactly once: by the matching event, by a task failure, by connection
//! close, or by a transport error. Bounded waits are enforced with
//! `tokio::time::timeout`. The mutex is never held across an await.

use bytes::Bytes;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::core::listener::EventListener;
use crate::core::protocol::envelope::{Envelope, gen_id};
use crate::core::protocol::flavor::{EventKind, FlavorSpec, SendAfterComplete};
use crate::core::protocol::state::{self, Operation, TaskState};
use crate::error::{Result, SpeechError};
use crate::transport::{Connection, TransportError, TransportEvent};

/// Default bound for start/stop/query/verification confirmations.
pub(crate) const CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Gap between binary sends above which the server may consider the task
/// starved; crossing it logs a warning without altering state.
pub(crate) const SEND_GAP_WARNING: Duration = Duration::from_secs(5);

/// How an outstanding waiter was released.
#[derive(Debug)]
enum Resolution {
    /// The awaited milestone event arrived.
    Event,
    /// The server reported a task failure.
    Failed { status: u32, message: String },
    /// The connection closed first.
    Closed { code: u16, reason: String },
    /// The transport failed first.
    Error(String),
}

struct SessionInner {
    state: TaskState,
    task_id: Option<String>,
    ready: Option<oneshot::Sender<Resolution>>,
    complete: Option<oneshot::Sender<Resolution>>,
    complete_rx: Option<oneshot::Receiver<Resolution>>,
    verification: Option<oneshot::Sender<Resolution>>,
    verification_rx: Option<oneshot::Receiver<Resolution>>,
    wake_word_accepted: bool,
    last_send: Option<Instant>,
}

impl SessionInner {
    fn new() -> Self {
        Self {
            state: TaskState::Init,
            task_id: None,
            ready: None,
            complete: None,
            complete_rx: None,
            verification: None,
            verification_rx: None,
            wake_word_accepted: false,
            last_send: None,
        }
    }

    /// Arm a fresh ready waiter, returning the receiver for the caller.
    fn arm_ready(&mut self) -> oneshot::Receiver<Resolution> {
        let (tx, rx) = oneshot::channel();
        self.ready = Some(tx);
        rx
    }

    /// Arm a fresh completion waiter; the receiver is parked until `stop`
    /// or an explicit wait claims it.
    fn arm_complete(&mut self) {
        let (tx, rx) = oneshot::channel();
        self.complete = Some(tx);
        self.complete_rx = Some(rx);
    }

    fn arm_verification(&mut self) {
        let (tx, rx) = oneshot::channel();
        self.verification = Some(tx);
        self.verification_rx = Some(rx);
    }

    /// Release every outstanding waiter. First resolution wins; a waiter
    /// already resolved is simply absent here.
    fn resolve_all(&mut self, make: impl Fn() -> Resolution) {
        for tx in [
            self.ready.take(),
            self.complete.take(),
            self.verification.take(),
        ]
        .into_iter()
        .flatten()
        {
            let _ = tx.send(make());
        }
    }
}

/// The shared per-task protocol engine.
///
/// One instance drives exactly one logical task over one connection. It is
/// internally synchronized between the caller and the connection's reader
/// task, but a task is not meant for concurrent use by multiple callers.
pub(crate) struct SessionCore {
    spec: FlavorSpec,
    conn: Arc<dyn Connection>,
    appkey: Option<String>,
    inner: Mutex<SessionInner>,
}

impl SessionCore {
    pub(crate) fn new(spec: FlavorSpec, conn: Arc<dyn Connection>, appkey: Option<String>) -> Self {
        Self {
            spec,
            conn,
            appkey,
            inner: Mutex::new(SessionInner::new()),
        }
    }

    /// Enter `Connected`; called once the underlying connection is up.
    pub(crate) fn mark_connected(&self) {
        self.inner.lock().state = TaskState::Connected;
        debug!("{} session connected", self.spec.label);
    }

    pub(crate) fn state(&self) -> TaskState {
        self.inner.lock().state
    }

    pub(crate) fn task_id(&self) -> Option<String> {
        self.inner.lock().task_id.clone()
    }

    pub(crate) fn wake_word_accepted(&self) -> bool {
        self.inner.lock().wake_word_accepted
    }

    fn current_task_id(&self) -> String {
        self.task_id().unwrap_or_default()
    }

    /// Send the start request. Binds a fresh task id, arms the lifecycle
    /// waiters, and, for flavors where start confirms synchronously,
    /// blocks until the started event or the bound expires.
    pub(crate) async fn start(&self, request: &mut Envelope) -> Result<()> {
        let (task_id, ready_rx) = {
            let mut inner = self.inner.lock();
            state::check(inner.state, Operation::Start)?;
            let task_id = gen_id();
            inner.task_id = Some(task_id.clone());
            let ready_rx = inner.arm_ready();
            inner.arm_complete();
            if self.spec.verification_event.is_some() {
                inner.arm_verification();
            }
            inner.state = TaskState::RequestSent;
            (task_id, ready_rx)
        };

        request.header.task_id = Some(task_id.clone());
        let text = request.to_json()?;
        debug!(task_id = %task_id, "sending {}", self.spec.start_request);
        if let Err(e) = self.conn.send_text(text).await {
            let mut inner = self.inner.lock();
            if inner.state == TaskState::RequestSent {
                inner.state = TaskState::Connected;
            }
            return Err(e.into());
        }

        if self.spec.start_blocks {
            self.await_resolution(ready_rx, "start", Some(CONFIRMATION_TIMEOUT), false)
                .await?;
        }
        Ok(())
    }

    /// Stream one binary audio chunk, gated by the current state.
    ///
    /// After server-side early completion the chunk is either discarded
    /// quietly or rejected, per the flavor's policy.
    pub(crate) async fn send_audio(&self, data: Bytes) -> Result<()> {
        {
            let inner = self.inner.lock();
            if inner.state == TaskState::Complete
                && self.spec.send_after_complete == SendAfterComplete::Drop
            {
                info!("state is Complete, audio chunk discarded");
                return Ok(());
            }
            if let Some(last) = inner.last_send {
                let gap = last.elapsed();
                if gap > SEND_GAP_WARNING {
                    warn!(
                        "too large binary send interval: {} ms, the server may abandon the task",
                        gap.as_millis()
                    );
                }
            }
            state::check(inner.state, Operation::Send)?;
        }

        if let Err(e) = self.conn.send_binary(data).await {
            error!(
                task_id = %self.current_task_id(),
                "failed to send binary: {}", e
            );
            return Err(e.into());
        }
        self.inner.lock().last_send = Some(Instant::now());
        Ok(())
    }

    /// Whether audio feeding should end because the task completed early
    /// under the Drop policy.
    pub(crate) fn completed_with_drop_policy(&self) -> bool {
        self.spec.send_after_complete == SendAfterComplete::Drop
            && self.inner.lock().state == TaskState::Complete
    }

    /// Send the stop command and wait for the final completion event.
    ///
    /// If the server already concluded the task (silence detection), the
    /// command is discarded without error: the server event and the local
    /// call race by nature.
    pub(crate) async fn stop(&self) -> Result<()> {
        let Some(stop_name) = self.spec.stop_request else {
            return Err(SpeechError::Configuration(format!(
                "{} tasks have no stop command",
                self.spec.label
            )));
        };

        let rx = {
            let mut inner = self.inner.lock();
            if inner.state == TaskState::Complete {
                info!("task is completed before sending stop command, discarded");
                return Ok(());
            }
            state::check(inner.state, Operation::Stop)?;
            let rx = inner.complete_rx.take().ok_or_else(|| {
                SpeechError::Configuration("completion was already awaited".to_string())
            })?;
            inner.state = TaskState::StopSent;
            rx
        };

        let request = self.command(stop_name);
        debug!(task_id = %self.current_task_id(), "sending {}", stop_name);
        if let Err(e) = self.conn.send_text(request.to_json()?).await {
            let mut inner = self.inner.lock();
            if inner.state == TaskState::StopSent {
                inner.state = TaskState::RequestConfirmed;
            }
            return Err(e.into());
        }

        self.await_resolution(rx, "complete", Some(CONFIRMATION_TIMEOUT), false)
            .await
    }

    /// Claim the pending completion waiter and await it.
    ///
    /// With `silent_expiry`, a bounded wait that runs out returns `Ok(())`
    /// instead of a timeout error (the synthesis contract).
    pub(crate) async fn wait_for_complete(
        &self,
        timeout: Option<Duration>,
        silent_expiry: bool,
    ) -> Result<()> {
        let rx = self.inner.lock().complete_rx.take().ok_or_else(|| {
            SpeechError::Configuration("no completion wait is pending; call start first".to_string())
        })?;
        self.await_resolution(rx, "complete", timeout, silent_expiry)
            .await
    }

    /// Send a follow-up request that concludes with its own completion
    /// event (a dialog text turn). Allowed once the session is confirmed,
    /// including again after a previous turn completed.
    pub(crate) async fn execute_turn(&self, request: &mut Envelope) -> Result<()> {
        let (task_id, rx) = {
            let mut inner = self.inner.lock();
            match inner.state {
                TaskState::RequestConfirmed | TaskState::Complete => {}
                other => {
                    return Err(SpeechError::IllegalState {
                        operation: "query",
                        state: other,
                    });
                }
            }
            let task_id = gen_id();
            inner.task_id = Some(task_id.clone());
            inner.arm_complete();
            let rx = inner.complete_rx.take();
            (task_id, rx)
        };
        // arm_complete always parks a receiver
        let Some(rx) = rx else {
            return Err(SpeechError::Configuration(
                "completion waiter unavailable".to_string(),
            ));
        };

        request.header.task_id = Some(task_id.clone());
        debug!(task_id = %task_id, "sending {}", request.name());
        self.conn.send_text(request.to_json()?).await?;
        self.await_resolution(rx, "dialog result", Some(CONFIRMATION_TIMEOUT), false)
            .await
    }

    /// Send a wake-word verification stop command and wait for the
    /// verification milestone.
    pub(crate) async fn stop_verification(&self, name: &'static str) -> Result<()> {
        let rx = {
            let mut inner = self.inner.lock();
            state::check(inner.state, Operation::Stop)?;
            inner.verification_rx.take().ok_or_else(|| {
                SpeechError::Configuration(
                    "wake word verification was already awaited".to_string(),
                )
            })?
        };

        let request = self.command(name);
        self.conn.send_text(request.to_json()?).await?;
        self.await_resolution(rx, "wake word verification", Some(CONFIRMATION_TIMEOUT), false)
            .await
    }

    /// Close the underlying connection.
    pub(crate) async fn close(&self) {
        self.conn.close().await;
    }

    /// Header-only command frame bound to the current task.
    fn command(&self, name: &'static str) -> Envelope {
        let mut request = Envelope::request(self.spec.namespace, name);
        request.payload = None;
        request.context = None;
        request.header.appkey = self.appkey.clone();
        request.header.task_id = self.task_id();
        request
    }

    async fn await_resolution(
        &self,
        rx: oneshot::Receiver<Resolution>,
        milestone: &'static str,
        bound: Option<Duration>,
        silent_expiry: bool,
    ) -> Result<()> {
        let resolution = match bound {
            Some(duration) => match tokio::time::timeout(duration, rx).await {
                Ok(res) => res,
                Err(_) => {
                    if silent_expiry {
                        debug!(
                            "bounded wait for {} expired after {:?}",
                            milestone, duration
                        );
                        return Ok(());
                    }
                    let err = SpeechError::Timeout {
                        milestone,
                        task_id: self.current_task_id(),
                        seconds: duration.as_secs(),
                    };
                    error!("{}", err);
                    return Err(err);
                }
            },
            None => rx.await,
        };

        match resolution {
            Ok(Resolution::Event) => Ok(()),
            Ok(Resolution::Failed { status, message }) => {
                Err(SpeechError::TaskFailed { status, message })
            }
            Ok(Resolution::Closed { code, reason }) => {
                Err(SpeechError::ConnectionClosed { code, reason })
            }
            Ok(Resolution::Error(message)) => {
                Err(SpeechError::Transport(TransportError::Network(message)))
            }
            // Sender dropped without resolving: the event loop is gone.
            Err(_) => Err(SpeechError::ConnectionClosed {
                code: 1006,
                reason: "event loop terminated".to_string(),
            }),
        }
    }

    /// Consume the connection's inbound events sequentially. Spawned once
    /// per task; ends when the transport channel does.
    pub(crate) async fn pump(
        self: Arc<Self>,
        mut events: mpsc::Receiver<TransportEvent>,
        listener: Arc<dyn EventListener>,
    ) {
        while let Some(event) = events.recv().await {
            self.dispatch(event, listener.as_ref()).await;
        }
        debug!("{} event loop ended", self.spec.label);
    }

    async fn dispatch(&self, event: TransportEvent, listener: &dyn EventListener) {
        match event {
            TransportEvent::Text(text) => {
                if text.trim().is_empty() {
                    return;
                }
                debug!("on message: {}", text);
                match Envelope::from_json(&text) {
                    Ok(envelope) => self.on_protocol_event(envelope, listener).await,
                    Err(e) => warn!("failed to parse protocol message: {}", e),
                }
            }
            TransportEvent::Binary(data) => listener.on_binary(data).await,
            TransportEvent::Closed { code, reason } => {
                {
                    let mut inner = self.inner.lock();
                    if !inner.state.is_terminal() {
                        inner.state = TaskState::Closed;
                    }
                    inner.resolve_all(|| Resolution::Closed {
                        code,
                        reason: reason.clone(),
                    });
                }
                info!("connection is closed due to {}, code: {}", reason, code);
                listener.on_closed(code, &reason).await;
            }
            TransportEvent::Error(message) => {
                {
                    let mut inner = self.inner.lock();
                    if !inner.state.is_terminal() {
                        inner.state = TaskState::Closed;
                    }
                    inner.resolve_all(|| Resolution::Error(message.clone()));
                }
                error!("transport error: {}", message);
                listener.on_error(&message).await;
            }
        }
    }

    async fn on_protocol_event(&self, envelope: Envelope, listener: &dyn EventListener) {
        match self.spec.classify(envelope.name()) {
            EventKind::Started => {
                {
                    let mut inner = self.inner.lock();
                    if !inner.state.is_terminal() {
                        inner.state = TaskState::RequestConfirmed;
                    }
                    if let Some(tx) = inner.ready.take() {
                        let _ = tx.send(Resolution::Event);
                    }
                }
                listener.on_started(envelope).await;
            }
            EventKind::Intermediate => listener.on_event(envelope).await,
            EventKind::Completed => {
                {
                    let mut inner = self.inner.lock();
                    if !inner.state.is_terminal() {
                        inner.state = TaskState::Complete;
                    }
                    if let Some(tx) = inner.complete.take() {
                        let _ = tx.send(Resolution::Event);
                    }
                }
                listener.on_completed(envelope).await;
            }
            EventKind::VerificationCompleted => {
                let accepted = listener.on_wake_word_verified(envelope).await;
                let mut inner = self.inner.lock();
                inner.wake_word_accepted = accepted;
                if !accepted && !inner.state.is_terminal() {
                    // Rejected wake word concludes the task early.
                    inner.state = TaskState::Complete;
                }
                if let Some(tx) = inner.verification.take() {
                    let _ = tx.send(Resolution::Event);
                }
            }
            EventKind::TaskFailed => {
                let status = envelope.status().unwrap_or(0);
                let message = envelope.status_text().unwrap_or_default().to_string();
                {
                    let mut inner = self.inner.lock();
                    if !inner.state.is_terminal() {
                        inner.state = TaskState::Fail;
                    }
                    inner.resolve_all(|| Resolution::Failed {
                        status,
                        message: message.clone(),
                    });
                }
                error!("task failed with status {}: {}", status, message);
                listener.on_failed(status, &message).await;
            }
            EventKind::Unknown => {
                warn!("unrecognized event: {}", envelope.name());
            }
        }
    }
}

#[cfg(test)]
impl SessionCore {
    /// Feed one transport event through dispatch; for tests outside this
    /// module.
    pub(crate) async fn dispatch_for_test(&self, event: TransportEvent) {
        self.dispatch(event, &testing::NoopListener).await;
    }
}
