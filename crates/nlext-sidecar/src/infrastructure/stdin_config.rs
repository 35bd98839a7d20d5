//! One-shot reader for the startup object the host writes to stdin.
//!
//! Only the first JSON value is consumed.  The host may keep stdin open for
//! the lifetime of the process, so the reader must not wait for
//! end-of-stream after the object closes.

use std::io::Read;

use tracing::{debug, warn};

use serde_json::Value;

use nlext_core::{from_object, ExtensionConfig};

/// What the host supplied on stdin.
#[derive(Debug)]
pub enum StartupInput {
    /// A well-formed startup object.
    Provided(ExtensionConfig),
    /// The stream ended (or held only whitespace) before any value.
    Absent,
    /// The stream held something that is not a startup object.
    Invalid(serde_json::Error),
}

impl StartupInput {
    /// Collapses the input to a config.  `Absent` and `Invalid` yield empty
    /// defaults; connecting with them fails on the port check.
    pub fn into_config(self) -> ExtensionConfig {
        match self {
            StartupInput::Provided(cfg) => cfg,
            StartupInput::Absent | StartupInput::Invalid(_) => ExtensionConfig::default(),
        }
    }
}

/// Reads the first JSON value from `reader`.
///
/// The value must be an object; a positional array is `Invalid` even if its
/// length matches the field count.
pub fn read_startup_input<R: Read>(reader: R) -> StartupInput {
    let mut values = serde_json::Deserializer::from_reader(reader).into_iter::<Value>();
    match values.next().map(|value| value.and_then(from_object::<ExtensionConfig>)) {
        None => StartupInput::Absent,
        Some(Ok(cfg)) => StartupInput::Provided(cfg),
        Some(Err(e)) => StartupInput::Invalid(e),
    }
}

/// Reads the startup object and logs bad input.
///
/// Missing input is silent; malformed input is logged at `warn`.  Neither is
/// fatal.
pub fn load_config<R: Read>(reader: R) -> ExtensionConfig {
    let input = read_startup_input(reader);
    match &input {
        StartupInput::Provided(cfg) if cfg.is_empty() => {
            warn!("startup object supplied no connection parameters")
        }
        StartupInput::Provided(cfg) => debug!("startup configuration: {cfg:?}"),
        StartupInput::Absent => {}
        StartupInput::Invalid(e) => warn!("ignoring malformed startup configuration: {e}"),
    }
    input.into_config()
}

/// [`load_config`] over the process's stdin.  Blocks until the first value
/// is complete or stdin closes.
pub fn load_config_from_stdin() -> ExtensionConfig {
    load_config(std::io::stdin().lock())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
