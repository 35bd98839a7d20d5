//! Typed commands the frontend can invoke.
//!
//! The frontend asks for a native function by dispatching a `runGo` event
//! whose payload names the function:
//!
//! ```json
//! {"event":"runGo","data":{"function":"ping","parameter":"hi"}}
//! {"event":"runGo","data":{"function":"longRun","parameter":null}}
//! ```
//!
//! The payload is decoded once, at the boundary, into [`ExtensionCommand`].
//! Handlers never probe untyped maps.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use nlext_core::EventMessage;

/// Event name the frontend uses to call a native function.
pub const RUN_FUNCTION_EVENT: &str = "runGo";

const KNOWN_FUNCTIONS: &[&str] = &["ping", "longRun"];

/// Errors produced while decoding a `runGo` payload.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The payload has no string `function` field.
    #[error("run request without a function name")]
    MissingFunction,

    /// The payload names a function this sidecar does not provide.
    #[error("unknown function: {0}")]
    UnknownFunction(String),

    /// The function is known but its arguments do not fit.
    #[error("invalid arguments for {function}: {source}")]
    InvalidArguments {
        function: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A native function call requested by the frontend.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "function", rename_all = "camelCase")]
pub enum ExtensionCommand {
    /// Reply immediately with a PONG that echoes `parameter`.
    Ping {
        /// Arbitrary value supplied by the frontend; `null` when omitted.
        #[serde(default)]
        parameter: Value,
    },

    /// Start a background task that reports progress over time.
    LongRun,
}

impl ExtensionCommand {
    /// Decodes a command from an inbound event.
    ///
    /// Returns `Ok(None)` for events that are not run requests.
    ///
    /// # Errors
    ///
    /// Returns a [`CommandError`] if the event is a run request whose payload
    /// does not describe a known function.
    pub fn from_event(message: &EventMessage) -> Result<Option<Self>, CommandError> {
        if !message.is(RUN_FUNCTION_EVENT) {
            return Ok(None);
        }

        let function = message
            .data
            .get("function")
            .and_then(Value::as_str)
            .ok_or(CommandError::MissingFunction)?;

        if !KNOWN_FUNCTIONS.contains(&function) {
            return Err(CommandError::UnknownFunction(function.to_string()));
        }

        serde_json::from_value(message.data.clone())
            .map(Some)
            .map_err(|source| CommandError::InvalidArguments {
                function: function.to_string(),
                source,
            })
    }

    /// Short name for log messages.
    pub fn name(&self) -> &'static str {
        match self {
            ExtensionCommand::Ping { .. } => "ping",
            ExtensionCommand::LongRun => "longRun",
        }
    }
}

/// Renders a frontend-supplied parameter for display: strings verbatim,
/// `null` as empty, anything else as compact JSON.
pub fn parameter_text(parameter: &Value) -> String {
    match parameter {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
