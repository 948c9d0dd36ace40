//! In-process WebSocket mock of the speech gateway.
//!
//! Speaks the real envelope protocol: confirms start requests, acknowledges
//! stop commands with completion events, streams synthesized audio as
//! binary frames, and can be switched to fail every task.

#![allow(dead_code)]

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::{accept_async, tungstenite::Message};

use speechlink::{Envelope, EventListener};

/// How the mock responds to start requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayBehavior {
    /// Confirm requests and complete tasks normally.
    Normal,
    /// Reply to every start request with `TaskFailed`.
    FailTasks,
    /// Accept the connection but never answer anything.
    Silent,
}

pub struct MockGateway {
    addr: SocketAddr,
}

impl MockGateway {
    /// Bind an ephemeral port and serve connections until dropped.
    pub async fn spawn(behavior: GatewayBehavior) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                tokio::spawn(handle_connection(stream, behavior));
            }
        });
        Self { addr }
    }

    pub fn url(&self) -> String {
        format!("ws://{}", self.addr)
    }
}

fn event(namespace: &str, name: &str, task_id: &str, payload: Value) -> Message {
    Message::Text(
        json!({
            "header": {
                "message_id": uuid::Uuid::new_v4().simple().to_string(),
                "namespace": namespace,
                "name": name,
                "task_id": task_id,
                "status": 20000000,
                "status_text": "Gateway:SUCCESS:Success."
            },
            "payload": payload
        })
        .to_string()
        .into(),
    )
}

fn failure(namespace: &str, task_id: &str) -> Message {
    Message::Text(
        json!({
            "header": {
                "message_id": uuid::Uuid::new_v4().simple().to_string(),
                "namespace": namespace,
                "name": "TaskFailed",
                "task_id": task_id,
                "status": 41010101,
                "status_text": "MOCK:FAILED:task rejected"
            }
        })
        .to_string()
        .into(),
    )
}

async fn handle_connection(stream: TcpStream, behavior: GatewayBehavior) {
    let ws_stream = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(_) => return,
    };
    let (mut write, mut read) = ws_stream.split();

    let mut namespace = String::new();
    let mut task_id = String::new();
    let mut audio_chunks = 0u64;

    while let Some(Ok(message)) = read.next().await {
        match message {
            Message::Text(text) => {
                if behavior == GatewayBehavior::Silent {
                    continue;
                }
                let Ok(request) = serde_json::from_str::<Value>(&text) else {
                    continue;
                };
                let header = &request["header"];
                let name = header["name"].as_str().unwrap_or_default().to_string();
                if let Some(ns) = header["namespace"].as_str() {
                    namespace = ns.to_string();
                }
                if let Some(id) = header["task_id"].as_str() {
                    task_id = id.to_string();
                }

                match name.as_str() {
                    "StartRecognition" | "StartTranscription" | "StartSynthesis" => {
                        if behavior == GatewayBehavior::FailTasks {
                            let _ = write.send(failure(&namespace, &task_id)).await;
                            continue;
                        }
                        let started = match name.as_str() {
                            "StartRecognition" => "RecognitionStarted",
                            "StartTranscription" => "TranscriptionStarted",
                            _ => "SynthesisStarted",
                        };
                        let _ = write
                            .send(event(&namespace, started, &task_id, json!({})))
                            .await;

                        if name == "StartSynthesis" {
                            // Push audio then conclude, like the real service.
                            for _ in 0..3 {
                                let _ = write
                                    .send(Message::Binary(vec![0u8; 1024].into()))
                                    .await;
                            }
                            let _ = write
                                .send(event(&namespace, "SynthesisCompleted", &task_id, json!({})))
                                .await;
                        }
                    }
                    "StopRecognition" if namespace.starts_with("DialogAssistant") => {
                        let _ = write
                            .send(event(
                                &namespace,
                                "RecognitionCompleted",
                                &task_id,
                                json!({"result": "turn the lights on"}),
                            ))
                            .await;
                        let _ = write
                            .send(event(
                                &namespace,
                                "DialogResultGenerated",
                                &task_id,
                                json!({"action": "lights_on", "spoken_text": "done"}),
                            ))
                            .await;
                    }
                    "StopRecognition" => {
                        let _ = write
                            .send(event(
                                &namespace,
                                "RecognitionCompleted",
                                &task_id,
                                json!({"result": "hello world"}),
                            ))
                            .await;
                    }
                    "StopTranscription" => {
                        let _ = write
                            .send(event(
                                &namespace,
                                "SentenceEnd",
                                &task_id,
                                json!({"index": 1, "result": "hello world", "time": 1200}),
                            ))
                            .await;
                        let _ = write
                            .send(event(&namespace, "TranscriptionCompleted", &task_id, json!({})))
                            .await;
                    }
                    "ExecuteDialog" => {
                        let query = request["payload"]["query"].as_str().unwrap_or_default();
                        let _ = write
                            .send(event(
                                &namespace,
                                "DialogResultGenerated",
                                &task_id,
                                json!({"action": "answer", "spoken_text": format!("echo: {query}")}),
                            ))
                            .await;
                    }
                    "StopWakeWordVerification" => {
                        let _ = write
                            .send(event(
                                &namespace,
                                "WakeWordVerificationCompleted",
                                &task_id,
                                json!({"accepted": true}),
                            ))
                            .await;
                    }
                    _ => {}
                }
            }
            Message::Binary(_) => {
                audio_chunks += 1;
                // The transcriber streams boundary and partial-result events
                // while audio flows.
                if namespace == "SpeechTranscriber" {
                    if audio_chunks == 1 {
                        let _ = write
                            .send(event(
                                &namespace,
                                "SentenceBegin",
                                &task_id,
                                json!({"index": 1, "time": 0}),
                            ))
                            .await;
                    }
                    let _ = write
                        .send(event(
                            &namespace,
                            "TranscriptionResultChanged",
                            &task_id,
                            json!({"index": 1, "result": "hello"}),
                        ))
                        .await;
                }
            }
            Message::Close(_) => break,
            Message::Ping(data) => {
                let _ = write.send(Message::Pong(data)).await;
            }
            _ => {}
        }
    }
}

/// What the listener observed, in arrival order.
#[derive(Debug)]
pub enum Recorded {
    Started(Envelope),
    Event(Envelope),
    Completed(Envelope),
    WakeWord(Envelope),
    Failed(u32, String),
    Binary(usize),
    Closed(u16),
}

/// Listener that forwards every callback into a channel.
pub struct Recorder {
    events: mpsc::UnboundedSender<Recorded>,
    accept_wake_word: bool,
}

#[async_trait::async_trait]
impl EventListener for Recorder {
    async fn on_started(&self, response: Envelope) {
        let _ = self.events.send(Recorded::Started(response));
    }

    async fn on_event(&self, response: Envelope) {
        let _ = self.events.send(Recorded::Event(response));
    }

    async fn on_completed(&self, response: Envelope) {
        let _ = self.events.send(Recorded::Completed(response));
    }

    async fn on_wake_word_verified(&self, response: Envelope) -> bool {
        let _ = self.events.send(Recorded::WakeWord(response));
        self.accept_wake_word
    }

    async fn on_failed(&self, status: u32, reason: &str) {
        let _ = self.events.send(Recorded::Failed(status, reason.to_string()));
    }

    async fn on_binary(&self, data: bytes::Bytes) {
        let _ = self.events.send(Recorded::Binary(data.len()));
    }

    async fn on_closed(&self, code: u16, _reason: &str) {
        let _ = self.events.send(Recorded::Closed(code));
    }
}

/// Build a recorder plus the receiving end of its channel.
pub fn recorder(accept_wake_word: bool) -> (Arc<Recorder>, mpsc::UnboundedReceiver<Recorded>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        Arc::new(Recorder {
            events: tx,
            accept_wake_word,
        }),
        rx,
    )
}
