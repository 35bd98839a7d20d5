//! Infrastructure layer for nlext-sidecar.
//!
//! Everything that touches the outside world lives here.
//!
//! # Responsibilities
//!
//! - Reading the startup object from stdin
//! - Opening the WebSocket connection and writing envelopes
//! - Running the inbound dispatch loop
//! - Watching for Ctrl+C in debug builds
//! - Killing the process on a close request
//!
//! # What does NOT belong here?
//!
//! - Deciding what a command does (that is the application layer)
//! - Wire types and the codec (that is `nlext-core`)

pub mod connection;
pub mod dispatch;
pub mod echo;
pub mod interrupt;
pub mod stdin_config;
pub mod terminate;

pub use connection::{ConnectionError, ConnectionState, ExtensionClient, FrameStream};
pub use dispatch::{run_dispatch_loop, spawn_dispatch_loop, DispatchExit};
pub use interrupt::run_interrupt_monitor;
pub use stdin_config::{load_config, load_config_from_stdin, read_startup_input, StartupInput};
pub use terminate::{ProcessTerminator, Terminator};
