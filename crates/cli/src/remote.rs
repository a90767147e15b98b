// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket implementation of the engine's remote API.
//!
//! One connection is opened lazily on the first call and reused. Any
//! transport failure drops it; the next call reconnects. Transport
//! failures are transient, server-reported errors keep the server's
//! classification.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use cs_core::Action;
use cs_engine::{RemoteApi, RemoteError, RemoteFuture};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::protocol::{ClientMessage, ServerMessage};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

struct WebSocketConnection {
    sink: SplitSink<WsStream, Message>,
    stream: SplitStream<WsStream>,
}

/// Remote API client speaking JSON over a WebSocket.
pub struct WebSocketRemote {
    url: String,
    connect_timeout: Duration,
    conn: Mutex<Option<WebSocketConnection>>,
    next_id: AtomicU64,
}

impl WebSocketRemote {
    pub fn new(url: impl Into<String>, connect_timeout: Duration) -> Self {
        WebSocketRemote {
            url: url.into(),
            connect_timeout,
            conn: Mutex::new(None),
            next_id: AtomicU64::new(1),
        }
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    async fn connect(&self) -> Result<WebSocketConnection, RemoteError> {
        let attempt = tokio_tungstenite::connect_async(self.url.as_str());
        let (ws, _) = tokio::time::timeout(self.connect_timeout, attempt)
            .await
            .map_err(|_| RemoteError::Timeout(self.connect_timeout))?
            .map_err(|e| RemoteError::Transient(format!("connection failed: {}", e)))?;
        tracing::debug!(url = %self.url, "connected to remote");

        let (sink, stream) = ws.split();
        Ok(WebSocketConnection { sink, stream })
    }

    /// Send one request and wait for the reply carrying the same id.
    async fn request(&self, msg: ClientMessage) -> Result<ServerMessage, RemoteError> {
        let mut conn = self.conn.lock().await;
        if conn.is_none() {
            *conn = Some(self.connect().await?);
        }
        let Some(ws) = conn.as_mut() else {
            return Err(RemoteError::Transient("not connected".to_string()));
        };

        let result = exchange(ws, &msg).await;
        if let Err(e) = &result {
            tracing::debug!(error = %e, "dropping remote connection");
            *conn = None;
        }
        result
    }
}

async fn exchange(
    ws: &mut WebSocketConnection,
    msg: &ClientMessage,
) -> Result<ServerMessage, RemoteError> {
    let json = msg
        .to_json()
        .map_err(|e| RemoteError::Permanent(format!("failed to encode request: {}", e)))?;

    ws.sink
        .send(Message::Text(json.into()))
        .await
        .map_err(|e| RemoteError::Transient(format!("send failed: {}", e)))?;

    loop {
        match ws.stream.next().await {
            Some(Ok(Message::Text(text))) => {
                let reply = ServerMessage::from_json(&text)
                    .map_err(|e| RemoteError::Transient(format!("invalid response: {}", e)))?;
                if reply.id() == msg.id() {
                    return Ok(reply);
                }
                // Reply to a request whose caller gave up
                tracing::debug!(id = reply.id(), "ignoring stale response");
            }
            Some(Ok(Message::Close(_))) | None => {
                return Err(RemoteError::Transient("connection closed".to_string()));
            }
            Some(Ok(_)) => continue,
            Some(Err(e)) => {
                return Err(RemoteError::Transient(format!("receive failed: {}", e)));
            }
        }
    }
}

fn unexpected(reply: &ServerMessage) -> RemoteError {
    RemoteError::Permanent(format!("unexpected response: {:?}", reply))
}

impl RemoteApi for WebSocketRemote {
    fn apply<'a>(
        &'a self,
        entity: &'a str,
        action: Action,
        payload: &'a Value,
    ) -> RemoteFuture<'a, ()> {
        Box::pin(async move {
            let msg = ClientMessage::Mutation {
                id: self.next_id(),
                entity: entity.to_string(),
                action,
                payload: payload.clone(),
            };
            match self.request(msg).await? {
                ServerMessage::Ack { .. } => Ok(()),
                ServerMessage::Error { kind, message, .. } => Err(kind.into_remote_error(message)),
                reply => Err(unexpected(&reply)),
            }
        })
    }

    fn fetch<'a>(&'a self, key: &'a str) -> RemoteFuture<'a, Value> {
        Box::pin(async move {
            let msg = ClientMessage::Query {
                id: self.next_id(),
                key: key.to_string(),
            };
            match self.request(msg).await? {
                ServerMessage::Result { data, .. } => Ok(data),
                ServerMessage::Error { kind, message, .. } => Err(kind.into_remote_error(message)),
                reply => Err(unexpected(&reply)),
            }
        })
    }
}

#[cfg(test)]
#[path = "remote_tests.rs"]
mod tests;
