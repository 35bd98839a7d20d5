//! Inbound read loop.
//!
//! Exactly one dispatch loop runs per process.  It reads frames in arrival
//! order, decodes each into an [`EventMessage`], and either:
//!
//! - calls the [`Terminator`] for `windowClose` / `appClose`, or
//! - awaits the [`EventHandler`] before reading the next frame.
//!
//! # Error policy
//!
//! | Condition                         | Action                                  |
//! |-----------------------------------|-----------------------------------------|
//! | malformed JSON                    | log (debug), skip frame                 |
//! | transient read error              | log (debug), back off, read again       |
//! | `max_consecutive_read_errors` hit | return [`DispatchExit::ReadErrors`]     |
//! | Close frame / end of stream       | return [`DispatchExit::Closed`]         |
//!
//! There is no reconnection.

use std::sync::Arc;

use futures_util::{Stream, StreamExt};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::{Error as WsError, Message as WsMessage};
use tracing::{debug, info, warn};

use nlext_core::{decode_event, EventMessage};

use crate::application::EventHandler;
use crate::domain::SidecarOptions;
use crate::infrastructure::echo::{echo_frame, Direction};
use crate::infrastructure::terminate::Terminator;

/// Why the dispatch loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchExit {
    /// The host closed the connection or the stream ended.
    Closed,
    /// Reads kept failing; carries the number of consecutive failures.
    ReadErrors(u32),
}

/// Runs the dispatch loop until the connection ends.
///
/// `frames` is normally the read half returned by
/// [`ExtensionClient::connect`](crate::infrastructure::connection::ExtensionClient::connect);
/// any stream of tungstenite results works, which keeps the loop testable.
pub async fn run_dispatch_loop<S>(
    mut frames: S,
    handler: Arc<dyn EventHandler>,
    terminator: Arc<dyn Terminator>,
    options: SidecarOptions,
) -> DispatchExit
where
    S: Stream<Item = Result<WsMessage, WsError>> + Unpin,
{
    let max_errors = options.max_consecutive_read_errors.max(1);
    let mut consecutive_errors: u32 = 0;

    loop {
        let ws_msg = match frames.next().await {
            Some(Ok(msg)) => {
                consecutive_errors = 0;
                msg
            }
            Some(Err(WsError::ConnectionClosed | WsError::AlreadyClosed)) => {
                debug!("host connection closed");
                return DispatchExit::Closed;
            }
            Some(Err(e)) => {
                consecutive_errors += 1;
                debug!("read error ({consecutive_errors}/{max_errors}): {e}");
                if consecutive_errors >= max_errors {
                    warn!("giving up after {consecutive_errors} consecutive read errors");
                    return DispatchExit::ReadErrors(consecutive_errors);
                }
                tokio::time::sleep(options.read_error_backoff).await;
                continue;
            }
            None => {
                debug!("host stream ended");
                return DispatchExit::Closed;
            }
        };

        let text = match ws_msg {
            WsMessage::Text(text) => text,
            WsMessage::Binary(bytes) => match String::from_utf8(bytes) {
                Ok(text) => text,
                Err(_) => {
                    debug!("skipping non-UTF-8 binary frame");
                    continue;
                }
            },
            WsMessage::Close(frame) => {
                info!("host sent Close: {frame:?}");
                return DispatchExit::Closed;
            }
            // tungstenite answers pings itself.
            WsMessage::Ping(_) | WsMessage::Pong(_) | WsMessage::Frame(_) => continue,
        };

        echo_frame(options.debug, Direction::Received, &text);

        let message = match decode_event(&text) {
            Ok(message) => message,
            Err(e) => {
                debug!("skipping frame: {e}");
                continue;
            }
        };

        dispatch_event(message, handler.as_ref(), terminator.as_ref()).await;
    }
}

/// Spawns [`run_dispatch_loop`] on its own task.
pub fn spawn_dispatch_loop<S>(
    frames: S,
    handler: Arc<dyn EventHandler>,
    terminator: Arc<dyn Terminator>,
    options: SidecarOptions,
) -> JoinHandle<DispatchExit>
where
    S: Stream<Item = Result<WsMessage, WsError>> + Unpin + Send + 'static,
{
    tokio::spawn(run_dispatch_loop(frames, handler, terminator, options))
}

/// Routes one decoded event.  Close requests never reach the handler.
async fn dispatch_event(message: EventMessage, handler: &dyn EventHandler, terminator: &dyn Terminator) {
    if message.is_close_request() {
        info!("received '{}', terminating", message.event);
        terminator.terminate();
        return;
    }
    handler.on_event(message).await;
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use futures_util::stream;
    use serde_json::json;

    use super::*;
    use crate::infrastructure::terminate::MockTerminator;

    // ── Test doubles ──────────────────────────────────────────────────────────

    #[derive(Default)]
    struct RecordingHandler {
        events: Mutex<Vec<EventMessage>>,
    }

    impl RecordingHandler {
        fn names(&self) -> Vec<String> {
            self.events
                .lock()
                .unwrap()
                .iter()
                .map(|e| e.event.clone())
                .collect()
        }
    }

    #[async_trait]
    impl EventHandler for RecordingHandler {
        async fn on_event(&self, message: EventMessage) {
            self.events.lock().unwrap().push(message);
        }
    }

    fn text(s: &str) -> Result<WsMessage, WsError> {
        Ok(WsMessage::Text(s.to_string()))
    }

    fn io_error() -> Result<WsMessage, WsError> {
        Err(WsError::Io(io::Error::new(io::ErrorKind::Other, "boom")))
    }

    fn quiet_options() -> SidecarOptions {
        SidecarOptions {
            debug: false,
            read_error_backoff: Duration::from_millis(1),
            ..SidecarOptions::default()
        }
    }

    fn never_terminates() -> Arc<dyn Terminator> {
        let mut mock = MockTerminator::new();
        mock.expect_terminate().never();
        Arc::new(mock)
    }

    async fn run(
        frames: Vec<Result<WsMessage, WsError>>,
        terminator: Arc<dyn Terminator>,
        options: SidecarOptions,
    ) -> (DispatchExit, Arc<RecordingHandler>) {
        let handler = Arc::new(RecordingHandler::default());
        let exit = run_dispatch_loop(
            stream::iter(frames),
            Arc::clone(&handler) as Arc<dyn EventHandler>,
            terminator,
            options,
        )
        .await;
        (exit, handler)
    }

    // ── Forwarding ────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_events_forwarded_in_arrival_order() {
        let (exit, handler) = run(
            vec![
                text(r#"{"event":"a","data":1}"#),
                text(r#"{"event":"b","data":2}"#),
                text(r#"{"event":"c"}"#),
            ],
            never_terminates(),
            quiet_options(),
        )
        .await;

        assert_eq!(exit, DispatchExit::Closed);
        assert_eq!(handler.names(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_malformed_frame_does_not_stop_the_loop() {
        // Arrange: garbage followed by a well-formed run request
        let frames = vec![
            text("{definitely not json"),
            text(r#"{"no_event":true}"#),
            text(r#"{"event":"runGo","data":{"function":"ping","parameter":"hi"}}"#),
        ];

        // Act
        let (_, handler) = run(frames, never_terminates(), quiet_options()).await;

        // Assert
        let events = handler.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event, "runGo");
        assert_eq!(events[0].data, json!({"function":"ping","parameter":"hi"}));
    }

    #[tokio::test]
    async fn test_binary_utf8_frames_are_decoded() {
        let (_, handler) = run(
            vec![
                Ok(WsMessage::Binary(br#"{"event":"bin"}"#.to_vec())),
                Ok(WsMessage::Binary(vec![0xff, 0xfe])),
            ],
            never_terminates(),
            quiet_options(),
        )
        .await;
        assert_eq!(handler.names(), vec!["bin"]);
    }

    #[tokio::test]
    async fn test_control_frames_are_ignored() {
        let (_, handler) = run(
            vec![
                Ok(WsMessage::Ping(vec![1])),
                Ok(WsMessage::Pong(vec![2])),
                text(r#"{"event":"after"}"#),
            ],
            never_terminates(),
            quiet_options(),
        )
        .await;
        assert_eq!(handler.names(), vec!["after"]);
    }

    // ── Close requests ────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_app_close_terminates_and_is_not_forwarded() {
        // Arrange
        let mut mock = MockTerminator::new();
        mock.expect_terminate().times(1).return_const(());

        // Act
        let (_, handler) = run(
            vec![
                text(r#"{"event":"appClose","data":""}"#),
                text(r#"{"event":"still-read"}"#),
            ],
            Arc::new(mock),
            quiet_options(),
        )
        .await;

        // Assert
        assert_eq!(handler.names(), vec!["still-read"]);
    }

    #[tokio::test]
    async fn test_window_close_terminates() {
        let mut mock = MockTerminator::new();
        mock.expect_terminate().times(1).return_const(());

        let (_, handler) = run(
            vec![text(r#"{"event":"windowClose"}"#)],
            Arc::new(mock),
            quiet_options(),
        )
        .await;

        assert!(handler.names().is_empty());
    }

    #[tokio::test]
    async fn test_positional_close_request_is_skipped() {
        // Arrange: close requests without keys, then a real event
        let frames = vec![
            text(r#"["appClose",""]"#),
            text(r#"["windowClose"]"#),
            text(r#"["runGo",{"function":"ping"}]"#),
            text(r#"{"event":"after"}"#),
        ];

        // Act
        let (exit, handler) = run(frames, never_terminates(), quiet_options()).await;

        // Assert: nothing terminated, only the keyed frame was forwarded
        assert_eq!(exit, DispatchExit::Closed);
        assert_eq!(handler.names(), vec!["after"]);
    }

    // ── Connection end and read errors ────────────────────────────────────────

    #[tokio::test]
    async fn test_close_frame_ends_loop() {
        let (exit, handler) = run(
            vec![Ok(WsMessage::Close(None)), text(r#"{"event":"late"}"#)],
            never_terminates(),
            quiet_options(),
        )
        .await;
        assert_eq!(exit, DispatchExit::Closed);
        assert!(handler.names().is_empty());
    }

    #[tokio::test]
    async fn test_connection_closed_error_ends_loop() {
        let (exit, _) = run(
            vec![Err(WsError::ConnectionClosed), text(r#"{"event":"late"}"#)],
            never_terminates(),
            quiet_options(),
        )
        .await;
        assert_eq!(exit, DispatchExit::Closed);
    }

    #[tokio::test]
    async fn test_transient_read_errors_are_survived() {
        let (exit, handler) = run(
            vec![io_error(), io_error(), text(r#"{"event":"ok"}"#), io_error()],
            never_terminates(),
            quiet_options(),
        )
        .await;
        assert_eq!(exit, DispatchExit::Closed);
        assert_eq!(handler.names(), vec!["ok"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_persistent_read_errors_end_loop() {
        // Arrange: more failures than the budget allows
        let options = SidecarOptions {
            debug: false,
            max_consecutive_read_errors: 3,
            read_error_backoff: Duration::from_secs(1),
            ..SidecarOptions::default()
        };
        let frames = (0..10).map(|_| io_error()).collect();

        // Act
        let (exit, handler) = run(frames, never_terminates(), options).await;

        // Assert
        assert_eq!(exit, DispatchExit::ReadErrors(3));
        assert!(handler.names().is_empty());
    }

    #[tokio::test]
    async fn test_successful_read_resets_error_budget() {
        let options = SidecarOptions {
            max_consecutive_read_errors: 2,
            ..quiet_options()
        };
        let frames = vec![
            io_error(),
            text(r#"{"event":"one"}"#),
            io_error(),
            text(r#"{"event":"two"}"#),
        ];

        let (exit, handler) = run(frames, never_terminates(), options).await;

        assert_eq!(exit, DispatchExit::Closed);
        assert_eq!(handler.names(), vec!["one", "two"]);
    }
}
