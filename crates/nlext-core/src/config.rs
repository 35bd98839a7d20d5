//! Startup configuration supplied by the host on standard input.
//!
//! The host writes exactly one JSON object before the sidecar connects:
//!
//! ```json
//! {"nlPort":"51234","nlToken":"...","nlExtensionId":"js.neutralino.sample","nlConnectToken":"..."}
//! ```
//!
//! Reading the stream is the sidecar's job; this module only defines the
//! shape of the object and derives the connection URL from it.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Host the sidecar connects to.  The host shell only listens on loopback.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Errors raised while turning an [`ExtensionConfig`] into a connection URL.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// `nlPort` is missing or is not a valid TCP port number.
    #[error("invalid port: '{0}'")]
    InvalidPort(String),

    /// The host and port did not form a parseable URL.
    #[error("invalid connection url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Connection parameters read from the startup JSON object.
///
/// Every field defaults to an empty string so that a missing or partial
/// object still produces a value; [`connection_url`](Self::connection_url)
/// then fails with a clear error instead of dialling garbage.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtensionConfig {
    /// Port of the host's WebSocket server.
    #[serde(rename = "nlPort")]
    pub port: String,

    /// Access token stamped on every outbound envelope.
    #[serde(rename = "nlToken")]
    pub token: String,

    /// Identifier the host assigned to this extension.
    #[serde(rename = "nlExtensionId")]
    pub extension_id: String,

    /// One-time token proving the connection comes from the spawned process.
    #[serde(rename = "nlConnectToken")]
    pub connect_token: String,
}

impl ExtensionConfig {
    /// Returns `true` when no field was populated.
    pub fn is_empty(&self) -> bool {
        self.port.is_empty()
            && self.token.is_empty()
            && self.extension_id.is_empty()
            && self.connect_token.is_empty()
    }

    /// Builds `ws://<host>:<port>/?extensionId=<id>&connectToken=<token>`.
    ///
    /// Query values are form-urlencoded, so identifiers containing `&`, `=`,
    /// or spaces reach the host intact.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPort`] if `nlPort` is not a number in
    /// `0..=65535`, or [`ConfigError::InvalidUrl`] if `host` is not a valid
    /// URL host.
    ///
    /// # Example
    ///
    /// ```rust
    /// use nlext_core::{ExtensionConfig, DEFAULT_HOST};
    ///
    /// let cfg = ExtensionConfig {
    ///     port: "5000".into(),
    ///     extension_id: "js.ext".into(),
    ///     connect_token: "abc".into(),
    ///     ..Default::default()
    /// };
    /// let url = cfg.connection_url(DEFAULT_HOST).unwrap();
    /// assert_eq!(url.as_str(), "ws://127.0.0.1:5000/?extensionId=js.ext&connectToken=abc");
    /// ```
    pub fn connection_url(&self, host: &str) -> Result<Url, ConfigError> {
        let port: u16 = self
            .port
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidPort(self.port.clone()))?;

        let mut url = Url::parse(&format!("ws://{host}:{port}/"))?;
        url.query_pairs_mut()
            .append_pair("extensionId", &self.extension_id)
            .append_pair("connectToken", &self.connect_token);
        Ok(url)
    }
}

// Tokens stay out of logs.
impl fmt::Debug for ExtensionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionConfig")
            .field("port", &self.port)
            .field("token", &redact(&self.token))
            .field("extension_id", &self.extension_id)
            .field("connect_token", &redact(&self.connect_token))
            .finish()
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<empty>"
    } else {
        "<redacted>"
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
