//! Domain layer for nlext-sidecar.
//!
//! Pure types with no dependencies on I/O, sockets, or the async runtime.
//!
//! # What belongs here?
//!
//! - Runtime options ([`SidecarOptions`])
//! - The typed command vocabulary the frontend can invoke ([`ExtensionCommand`])
//!
//! # What does NOT belong here?
//!
//! - Any `tokio` or WebSocket types
//! - Reading stdin or environment variables

pub mod command;
pub mod options;

pub use command::{CommandError, ExtensionCommand, RUN_FUNCTION_EVENT};
pub use options::SidecarOptions;
