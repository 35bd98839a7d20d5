//! Sidecar runtime options.
//!
//! [`SidecarOptions`] holds the settings that are not supplied by the host:
//! the compiled-in debug flag, the loopback host, and the read-error policy
//! of the dispatch loop.  Connection parameters live in
//! [`nlext_core::ExtensionConfig`] instead.

use std::time::Duration;

use nlext_core::DEFAULT_HOST;

/// `true` in debug builds.  Enables frame echo, debug-level logs, and the
/// Ctrl+C monitor.
pub const DEBUG_BUILD: bool = cfg!(debug_assertions);

/// Runtime options for one sidecar process.
///
/// # Example
///
/// ```rust
/// use nlext_sidecar::domain::SidecarOptions;
///
/// let opts = SidecarOptions::default();
/// assert_eq!(opts.host, "127.0.0.1");
/// assert_eq!(opts.max_consecutive_read_errors, 5);
/// ```
#[derive(Debug, Clone)]
pub struct SidecarOptions {
    /// Echo every frame and subscribe to Ctrl+C.
    pub debug: bool,

    /// Host the WebSocket connection is opened to.
    pub host: String,

    /// Consecutive read errors after which the dispatch loop gives up.
    ///
    /// A successfully read frame resets the count.  Must be at least 1.
    pub max_consecutive_read_errors: u32,

    /// Pause after each read error before trying the next read.
    pub read_error_backoff: Duration,
}

impl Default for SidecarOptions {
    /// | Field                       | Default          |
    /// |-----------------------------|------------------|
    /// | debug                       | [`DEBUG_BUILD`]  |
    /// | host                        | `127.0.0.1`      |
    /// | max_consecutive_read_errors | 5                |
    /// | read_error_backoff          | 100 ms           |
    fn default() -> Self {
        Self {
            debug: DEBUG_BUILD,
            host: DEFAULT_HOST.to_string(),
            max_consecutive_read_errors: 5,
            read_error_backoff: Duration::from_millis(100),
        }
    }
}

impl SidecarOptions {
    /// Default log filter directive when `RUST_LOG` is unset.
    pub fn default_log_filter(&self) -> &'static str {
        if self.debug {
            "debug"
        } else {
            "warn"
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_host_is_loopback() {
        assert_eq!(SidecarOptions::default().host, "127.0.0.1");
    }

    #[test]
    fn test_default_debug_follows_build_profile() {
        assert_eq!(SidecarOptions::default().debug, cfg!(debug_assertions));
    }

    #[test]
    fn test_default_read_error_policy() {
        let opts = SidecarOptions::default();
        assert_eq!(opts.max_consecutive_read_errors, 5);
        assert_eq!(opts.read_error_backoff, Duration::from_millis(100));
    }

    #[test]
    fn test_log_filter_follows_debug_flag() {
        let mut opts = SidecarOptions::default();
        opts.debug = true;
        assert_eq!(opts.default_log_filter(), "debug");
        opts.debug = false;
        assert_eq!(opts.default_log_filter(), "warn");
    }
}
