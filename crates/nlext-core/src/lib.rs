//! # nlext-core
//!
//! Shared library for the nlext sidecar containing the startup configuration
//! type, the JSON wire envelope, and the event codec.
//!
//! This crate has zero dependencies on sockets, async runtimes, or OS APIs.
//! Everything here is a pure function of its inputs, which keeps the wire
//! format testable without a running host.
//!
//! # Architecture overview
//!
//! The sidecar is spawned by a desktop shell (the "host").  The host writes a
//! single JSON object to the sidecar's standard input, then the sidecar opens
//! a WebSocket back to the host and exchanges JSON events with it:
//!
//! - **`config`** – The startup object (`nlPort`, `nlToken`, ...) and the
//!   connection URL derived from it.
//!
//! - **`protocol`** – How events travel over the socket.  Outbound events are
//!   wrapped in a [`DataPacket`] envelope addressed to `app.broadcast`;
//!   inbound frames are bare [`EventMessage`]s.

pub mod config;
pub mod protocol;

pub use config::{ConfigError, ExtensionConfig, DEFAULT_HOST};
pub use protocol::codec::{decode_event, encode_broadcast, encode_packet, from_object, CodecError};
pub use protocol::messages::{
    result_payload, DataPacket, EventMessage, APP_CLOSE_EVENT, BROADCAST_METHOD,
    WINDOW_CLOSE_EVENT,
};

/// Version of the sidecar protocol implementation.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
