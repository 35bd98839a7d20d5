//! JSON codec for the host WebSocket protocol.
//!
//! Wire format: one JSON document per WebSocket text frame.
//!
//! ```text
//! outbound: {"id":"<uuid>","method":"app.broadcast","accessToken":"<token>","data":{"event":"<name>","data":<payload>}}
//! inbound:  {"event":"<name>","data":<payload>}
//! ```

use serde::de::{DeserializeOwned, Error as _, Unexpected};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::protocol::messages::{DataPacket, EventMessage};

/// Errors that can occur while encoding or decoding frames.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The outbound payload or envelope could not be turned into JSON.
    #[error("failed to serialize outbound packet: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The inbound frame is not a valid event message.
    #[error("malformed inbound frame: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Serializes an already-built envelope into a text frame body.
///
/// # Errors
///
/// Returns [`CodecError::Serialize`] if serialization fails.
pub fn encode_packet(packet: &DataPacket) -> Result<String, CodecError> {
    serde_json::to_string(packet).map_err(CodecError::Serialize)
}

/// Builds an `app.broadcast` envelope around `event`/`payload` and serializes it.
///
/// A fresh packet id is generated on every call.
///
/// # Errors
///
/// Returns [`CodecError::Serialize`] if `payload` cannot be represented as
/// JSON (for example a map with non-string keys).
///
/// # Examples
///
/// ```rust
/// use nlext_core::{encode_broadcast, result_payload};
///
/// let frame = encode_broadcast("token", "pingResult", &result_payload("PONG")).unwrap();
/// let value: serde_json::Value = serde_json::from_str(&frame).unwrap();
/// assert_eq!(value["method"], "app.broadcast");
/// assert_eq!(value["data"]["data"]["result"], "PONG");
/// ```
pub fn encode_broadcast<T>(access_token: &str, event: &str, payload: &T) -> Result<String, CodecError>
where
    T: Serialize + ?Sized,
{
    let data = serde_json::to_value(payload).map_err(CodecError::Serialize)?;
    let packet = DataPacket::broadcast(access_token, EventMessage::new(event, data));
    encode_packet(&packet)
}

/// Parses an inbound text frame into an [`EventMessage`].
///
/// # Errors
///
/// Returns [`CodecError::Decode`] if `raw` is not a JSON object or lacks an
/// `event` field.
pub fn decode_event(raw: &str) -> Result<EventMessage, CodecError> {
    let value: Value = serde_json::from_str(raw).map_err(CodecError::Decode)?;
    from_object(value).map_err(CodecError::Decode)
}

/// Deserializes `T` from `value` only if it is a JSON object.
///
/// Derived struct deserializers also accept positional arrays
/// (`["appClose",""]`); the wire format is keyed, so those are rejected.
///
/// # Errors
///
/// Returns an `invalid type` error for non-objects, or the usual
/// `serde_json` error if the object does not fit `T`.
pub fn from_object<T: DeserializeOwned>(value: Value) -> Result<T, serde_json::Error> {
    if value.is_object() {
        return serde_json::from_value(value);
    }
    let unexpected = match &value {
        Value::Object(_) => Unexpected::Map,
        Value::Array(_) => Unexpected::Seq,
        Value::String(s) => Unexpected::Str(s),
        Value::Bool(b) => Unexpected::Bool(*b),
        Value::Number(_) => Unexpected::Other("number"),
        Value::Null => Unexpected::Unit,
    };
    Err(serde_json::Error::invalid_type(unexpected, &"a JSON object"))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde_json::{json, Value};

    use super::*;
    use crate::protocol::messages::BROADCAST_METHOD;

    #[test]
    fn test_encode_broadcast_wraps_event_and_payload() {
        // Act
        let frame = encode_broadcast("tok", "pingResult", &json!({"result": "X"})).unwrap();

        // Assert
        let value: Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(value["method"], BROADCAST_METHOD);
        assert_eq!(value["accessToken"], "tok");
        assert_eq!(value["data"]["event"], "pingResult");
        assert_eq!(value["data"]["data"]["result"], "X");
        assert!(!value["id"].as_str().unwrap().is_empty());
    }

    #[test]
    fn test_encode_broadcast_accepts_typed_payloads() {
        #[derive(Serialize)]
        struct Progress {
            step: u32,
            total: u32,
        }

        let frame = encode_broadcast("t", "progress", &Progress { step: 3, total: 10 }).unwrap();
        let value: Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(value["data"]["data"], json!({"step": 3, "total": 10}));
    }

    #[test]
    fn test_encode_broadcast_rejects_non_string_map_keys() {
        // JSON objects only have string keys; a tuple key cannot be encoded.
        let mut payload = HashMap::new();
        payload.insert((1, 2), "x");

        let result = encode_broadcast("t", "e", &payload);

        assert!(matches!(result, Err(CodecError::Serialize(_))));
    }

    #[test]
    fn test_encode_packet_preserves_given_id() {
        let mut packet = DataPacket::broadcast("t", EventMessage::new("e", Value::Null));
        packet.id = "fixed-id".to_string();

        let frame = encode_packet(&packet).unwrap();

        assert!(frame.contains(r#""id":"fixed-id""#));
    }

    #[test]
    fn test_decode_event_ok() {
        let msg = decode_event(r#"{"event":"runGo","data":{"function":"longRun"}}"#).unwrap();
        assert_eq!(msg.event, "runGo");
        assert_eq!(msg.data["function"], "longRun");
    }

    #[test]
    fn test_decode_event_invalid_json() {
        assert!(matches!(decode_event("{not json"), Err(CodecError::Decode(_))));
    }

    #[test]
    fn test_decode_event_wrong_shape() {
        assert!(decode_event(r#"["event","data"]"#).is_err());
        assert!(decode_event(r#"{"event":42}"#).is_err());
    }

    #[test]
    fn test_decode_event_rejects_positional_close_request() {
        // Arrange: the fields of a close request, but as an array
        let raw = r#"["appClose",""]"#;

        // Act
        let result = decode_event(raw);

        // Assert
        match result {
            Err(CodecError::Decode(e)) => assert!(e.to_string().contains("a JSON object")),
            other => panic!("expected Decode error, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_event_rejects_scalars() {
        for raw in [r#""appClose""#, "42", "true", "null"] {
            assert!(
                matches!(decode_event(raw), Err(CodecError::Decode(_))),
                "{raw} must be rejected"
            );
        }
    }

    #[test]
    fn test_from_object_accepts_objects_only() {
        let ok: EventMessage = from_object(json!({"event": "e"})).unwrap();
        assert_eq!(ok, EventMessage::new("e", Value::Null));

        assert!(from_object::<EventMessage>(json!(["e", null])).is_err());
    }
}
