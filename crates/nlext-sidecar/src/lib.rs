//! nlext-sidecar library crate.
//!
//! This crate is the process a desktop shell spawns to run native Rust code
//! on behalf of its web frontend.  The shell passes connection parameters on
//! standard input; the sidecar connects back over WebSocket, receives events,
//! and replies with `app.broadcast` envelopes.
//!
//! # Architecture
//!
//! ```text
//! Host shell (JSON over WebSocket, loopback only)
//!         ↕
//! [nlext-sidecar]
//!   ├── domain/           SidecarOptions, typed ExtensionCommand
//!   ├── application/      EventHandler/EventSender seams, CommandRouter
//!   └── infrastructure/
//!         ├── stdin_config/ one-shot startup object reader
//!         ├── connection/   ExtensionClient (connect, send, close)
//!         ├── dispatch/     inbound read loop
//!         ├── interrupt/    Ctrl+C watcher (debug builds)
//!         ├── terminate/    self-termination
//!         └── echo/         colored frame echo
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no I/O and no async.
//! - `application` depends on `domain` and `nlext-core`, and reaches the
//!   socket only through the [`application::EventSender`] trait.
//! - `infrastructure` owns every socket, signal, and process handle.

/// Domain layer: options and typed commands (no I/O).
pub mod domain;

/// Application layer: handler seams and the example command handlers.
pub mod application;

/// Infrastructure layer: stdin, WebSocket, signals, process control.
pub mod infrastructure;
