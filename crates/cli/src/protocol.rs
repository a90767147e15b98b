// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket messages exchanged with the club backend.
//!
//! Every request carries a client-chosen `id` that the server echoes back:
//! - `mutation` is answered by `ack` or `error`
//! - `query` is answered by `result` or `error`

use cs_core::Action;
use cs_engine::RemoteError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Apply a queued mutation.
    Mutation {
        id: u64,
        entity: String,
        action: Action,
        payload: Value,
    },

    /// Run a read query.
    Query { id: u64, key: String },
}

/// Whether the server expects a retry to succeed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Transient,
    Permanent,
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// The mutation was applied.
    Ack { id: u64 },

    /// Query result.
    Result { id: u64, data: Value },

    /// The request failed.
    Error {
        id: u64,
        kind: ErrorKind,
        message: String,
    },
}

impl ClientMessage {
    pub fn id(&self) -> u64 {
        match self {
            ClientMessage::Mutation { id, .. } | ClientMessage::Query { id, .. } => *id,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

impl ServerMessage {
    pub fn id(&self) -> u64 {
        match self {
            ServerMessage::Ack { id }
            | ServerMessage::Result { id, .. }
            | ServerMessage::Error { id, .. } => *id,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

impl ErrorKind {
    /// Classified engine error for a server-reported failure.
    pub fn into_remote_error(self, message: String) -> RemoteError {
        match self {
            ErrorKind::Transient => RemoteError::Transient(message),
            ErrorKind::Permanent => RemoteError::Permanent(message),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use serde_json::json;

    #[test]
    fn mutation_wire_format() {
        let msg = ClientMessage::Mutation {
            id: 7,
            entity: "members".to_string(),
            action: Action::Update,
            payload: json!({"name": "Ann"}),
        };
        let wire: Value = serde_json::from_str(&msg.to_json().unwrap()).unwrap();
        assert_eq!(
            wire,
            json!({
                "type": "mutation",
                "id": 7,
                "entity": "members",
                "action": "update",
                "payload": {"name": "Ann"}
            })
        );
    }

    #[test]
    fn parses_server_error() {
        let msg = ServerMessage::from_json(
            r#"{"type":"error","id":3,"kind":"permanent","message":"duplicate member"}"#,
        )
        .unwrap();
        assert_eq!(msg.id(), 3);
        let ServerMessage::Error { kind, message, .. } = msg else {
            unreachable!("expected error message");
        };
        let err = kind.into_remote_error(message);
        assert_eq!(err, RemoteError::Permanent("duplicate member".to_string()));
    }

    #[test]
    fn rejects_unknown_type() {
        assert!(ServerMessage::from_json(r#"{"type":"pong","id":1}"#).is_err());
    }
}
