// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Scriptable WebSocket backend for tests.
//!
//! Mutations whose payload has `"fail": "transient" | "permanent"` are
//! rejected with that kind; all others are acknowledged and recorded.
//! Queries return `{"key": <key>}`, except `missing` which is a permanent
//! error.

#![allow(clippy::unwrap_used)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;

use crate::protocol::{ClientMessage, ErrorKind, ServerMessage};

pub struct TestServer {
    pub addr: SocketAddr,
    pub applied: Arc<Mutex<Vec<(String, Value)>>>,
}

impl TestServer {
    pub fn url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    pub fn applied_entities(&self) -> Vec<String> {
        self.applied
            .lock()
            .unwrap()
            .iter()
            .map(|(entity, _)| entity.clone())
            .collect()
    }
}

/// Start a server. With `one_shot`, each connection is closed after its
/// first reply.
pub async fn spawn(one_shot: bool) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let applied = Arc::new(Mutex::new(Vec::new()));

    let log = Arc::clone(&applied);
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let log = Arc::clone(&log);
            tokio::spawn(async move {
                let Ok(ws) = tokio_tungstenite::accept_async(stream).await else {
                    return;
                };
                let (mut sink, mut source) = ws.split();
                while let Some(Ok(Message::Text(text))) = source.next().await {
                    let reply = respond(&text, &log);
                    let json = reply.to_json().unwrap();
                    if sink.send(Message::Text(json.into())).await.is_err() {
                        return;
                    }
                    if one_shot {
                        let _ = sink.close().await;
                        return;
                    }
                }
            });
        }
    });

    TestServer { addr, applied }
}

fn respond(text: &str, log: &Mutex<Vec<(String, Value)>>) -> ServerMessage {
    match ClientMessage::from_json(text).unwrap() {
        ClientMessage::Mutation {
            id,
            entity,
            payload,
            ..
        } => match payload["fail"].as_str() {
            Some("transient") => ServerMessage::Error {
                id,
                kind: ErrorKind::Transient,
                message: "backend busy".to_string(),
            },
            Some(_) => ServerMessage::Error {
                id,
                kind: ErrorKind::Permanent,
                message: "validation failed".to_string(),
            },
            None => {
                log.lock().unwrap().push((entity, payload));
                ServerMessage::Ack { id }
            }
        },
        ClientMessage::Query { id, key } if key == "missing" => ServerMessage::Error {
            id,
            kind: ErrorKind::Permanent,
            message: "no such query".to_string(),
        },
        ClientMessage::Query { id, key } => ServerMessage::Result {
            id,
            data: json!({ "key": key }),
        },
    }
}
