//! JSON message types exchanged with the host.
//!
//! # Message flow
//!
//! ```text
//! Host    → Sidecar: {"event":"runGo","data":{...}}                   EventMessage
//! Sidecar → Host:    {"id":..,"method":"app.broadcast",
//!                     "accessToken":..,"data":{"event":..,"data":..}} DataPacket
//! ```
//!
//! The payload (`data`) is opaque at this layer.  Only the handler that
//! receives an event, or the code that sends one, knows its shape.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Host method every outbound envelope is addressed to.
pub const BROADCAST_METHOD: &str = "app.broadcast";

/// Inbound event sent when the host window closes.
pub const WINDOW_CLOSE_EVENT: &str = "windowClose";

/// Inbound event sent when the host application exits.
pub const APP_CLOSE_EVENT: &str = "appClose";

/// One application-level event, inbound or outbound.
///
/// # Serde representation
///
/// ```json
/// {"event":"pingResult","data":{"result":"PONG"}}
/// ```
///
/// A frame without `data` decodes with `data = null`.  A frame without
/// `event` is rejected: there is nothing to route it by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventMessage {
    /// Event name.
    pub event: String,
    /// Untyped payload.
    #[serde(default)]
    pub data: Value,
}

impl EventMessage {
    /// Creates an event with the given name and payload.
    pub fn new(event: impl Into<String>, data: Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }

    /// Returns `true` if this event is named `name`.
    pub fn is(&self, name: &str) -> bool {
        self.event == name
    }

    /// Returns `true` for the reserved events that end the session
    /// (`windowClose` and `appClose`).
    pub fn is_close_request(&self) -> bool {
        self.is(WINDOW_CLOSE_EVENT) || self.is(APP_CLOSE_EVENT)
    }
}

/// Outbound envelope wrapping an [`EventMessage`] with routing metadata.
///
/// Built once per send and dropped right after serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataPacket {
    /// Unique identifier for this packet.
    pub id: String,
    /// Always [`BROADCAST_METHOD`] for packets built by [`DataPacket::broadcast`].
    pub method: String,
    /// Access token from the startup configuration.
    pub access_token: String,
    /// The wrapped event.
    pub data: EventMessage,
}

impl DataPacket {
    /// Wraps `message` in an `app.broadcast` envelope with a fresh UUID v4 id.
    pub fn broadcast(access_token: impl Into<String>, message: EventMessage) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            method: BROADCAST_METHOD.to_string(),
            access_token: access_token.into(),
            data: message,
        }
    }
}

/// Builds the `{"result": <text>}` payload used for plain-string replies.
pub fn result_payload(text: impl Into<String>) -> Value {
    serde_json::json!({ "result": text.into() })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
