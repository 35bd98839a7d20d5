//! WebSocket connection to the host.
//!
//! [`ExtensionClient`] is the explicit context object of the sidecar: it
//! owns the write half of the one connection this process ever opens, plus
//! the access token that goes on every envelope.  It is cheap to clone, so
//! the command router and every background task hold their own handle.
//!
//! # Ownership of the two halves
//!
//! ```text
//! connect() ──► (ExtensionClient, FrameStream)
//!                    │                 │
//!      senders ◄─────┘                 └────► dispatch loop (sole reader)
//!   (write half behind an async Mutex)
//! ```
//!
//! Concurrent senders are serialized by the mutex, so frames from two
//! background tasks never interleave on the wire.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::{Error as WsError, Message as WsMessage};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info};

use nlext_core::{encode_broadcast, result_payload, CodecError, ConfigError, ExtensionConfig};

use crate::application::EventSender;
use crate::domain::SidecarOptions;
use crate::infrastructure::echo::{echo_frame, Direction};

/// Concrete WebSocket stream type returned by `connect_async`.
pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Write half of the host connection.
pub type FrameSink = SplitSink<WsStream, WsMessage>;

/// Read half of the host connection, consumed by the dispatch loop.
pub type FrameStream = SplitStream<WsStream>;

/// Errors from the connection layer.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// The startup configuration does not describe a reachable endpoint.
    #[error("invalid startup configuration: {0}")]
    Config(#[from] ConfigError),

    /// The WebSocket handshake failed.
    #[error("failed to connect to {endpoint}: {source}")]
    Connect {
        /// Scheme, host, and port only; the query carries the connect token.
        endpoint: String,
        #[source]
        source: WsError,
    },

    /// The outbound event could not be encoded.
    #[error(transparent)]
    Encode(#[from] CodecError),

    /// Writing a frame to the socket failed.
    #[error("WebSocket write failed: {0}")]
    Write(#[source] WsError),

    /// [`ExtensionClient::close`] was already called.
    #[error("connection already closed")]
    Closed,
}

/// Lifecycle of the connection as seen by senders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connected,
    Closed,
}

/// Cloneable handle for sending events to the host.
#[derive(Clone)]
pub struct ExtensionClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    access_token: String,
    sink: Mutex<FrameSink>,
    echo: bool,
    closed: AtomicBool,
}

impl ExtensionClient {
    /// Opens the single connection to the host.
    ///
    /// One attempt, no retry.  On success the read half is returned
    /// separately so the dispatch loop can own it.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::Config`] if the startup object has no
    /// usable port, or [`ConnectionError::Connect`] if the handshake fails.
    pub async fn connect(
        config: &ExtensionConfig,
        options: &SidecarOptions,
    ) -> Result<(Self, FrameStream), ConnectionError> {
        let url = config.connection_url(&options.host)?;
        let endpoint = url.origin().ascii_serialization();

        debug!("connecting to {endpoint}");

        let (ws_stream, _response) = connect_async(url.as_str())
            .await
            .map_err(|source| ConnectionError::Connect {
                endpoint: endpoint.clone(),
                source,
            })?;

        info!("connected to host at {endpoint}");

        let (sink, stream) = ws_stream.split();
        let client = Self {
            inner: Arc::new(ClientInner {
                access_token: config.token.clone(),
                sink: Mutex::new(sink),
                echo: options.debug,
                closed: AtomicBool::new(false),
            }),
        };
        Ok((client, stream))
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        if self.inner.closed.load(Ordering::Acquire) {
            ConnectionState::Closed
        } else {
            ConnectionState::Connected
        }
    }

    /// Encodes and writes one `app.broadcast` envelope.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::Encode`] if `data` cannot be serialized,
    /// [`ConnectionError::Write`] if the socket write fails, or
    /// [`ConnectionError::Closed`] after [`close`](Self::close).
    pub async fn try_send<T>(&self, event: &str, data: &T) -> Result<(), ConnectionError>
    where
        T: Serialize + ?Sized,
    {
        if self.state() == ConnectionState::Closed {
            return Err(ConnectionError::Closed);
        }

        let frame = encode_broadcast(&self.inner.access_token, event, data)?;
        echo_frame(self.inner.echo, Direction::Sent, &frame);

        let mut sink = self.inner.sink.lock().await;
        sink.send(WsMessage::Text(frame))
            .await
            .map_err(ConnectionError::Write)
    }

    /// Best-effort send: failures are logged and the event is dropped.
    pub async fn send<T>(&self, event: &str, data: &T)
    where
        T: Serialize + ?Sized,
    {
        match self.try_send(event, data).await {
            Ok(()) => {}
            Err(ConnectionError::Encode(e)) => error!("dropping '{event}': {e}"),
            Err(e) => debug!("dropping '{event}': {e}"),
        }
    }

    /// Sends `{"result": text}` as the payload of `event`.
    pub async fn send_message_string(&self, event: &str, text: &str) {
        self.send(event, &result_payload(text)).await;
    }

    /// Sends a Close frame and shuts the write half.
    ///
    /// Only the first call does anything; later calls return `Ok(())`.
    /// Dropping every handle without calling this still releases the socket.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::Write`] if the peer is already gone.
    pub async fn close(&self) -> Result<(), ConnectionError> {
        if self.inner.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        let mut sink = self.inner.sink.lock().await;
        sink.send(WsMessage::Close(None))
            .await
            .map_err(ConnectionError::Write)?;
        sink.close().await.map_err(ConnectionError::Write)
    }
}

#[async_trait]
impl EventSender for ExtensionClient {
    async fn send(&self, event: &str, data: Value) {
        ExtensionClient::send(self, event, &data).await;
    }

    async fn send_message_string(&self, event: &str, text: &str) {
        ExtensionClient::send_message_string(self, event, text).await;
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
