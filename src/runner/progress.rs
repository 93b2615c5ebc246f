//! Progress reporting from worker threads to a caller-supplied sink.
//!
//! ```text
//! ┌──────────┐  try_send   ┌─────────────────┐  drain  ┌──────────────┐
//! │ Worker 0 │ ──────────▶ │                 │ ──────▶ │ Relay thread │ ──▶ ProgressSink
//! │ Worker N │ ──────────▶ │ bounded channel │         │ (one per run)│
//! └──────────┘             └─────────────────┘         └──────────────┘
//! ```
//!
//! Workers never block on reporting: a full channel drops the event. The relay
//! swallows sink errors and sink panics so a broken sink cannot fail a run.
//! Once the work is done the owner raises a stop flag and the relay discards
//! whatever is still queued instead of delivering it.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use log::{debug, info};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};

/// Error type a sink may return; it is only logged.
pub type SinkError = Box<dyn std::error::Error + Send + Sync>;

/// Result of one sink invocation.
pub type SinkResult = Result<(), SinkError>;

/// Receiver of `(label, message)` progress events.
pub trait ProgressSink {
    /// Report one progress event. Errors are discarded by the caller.
    fn report(&mut self, label: &str, message: &str) -> SinkResult;
}

impl<F> ProgressSink for F
where
    F: FnMut(&str, &str) -> SinkResult,
{
    fn report(&mut self, label: &str, message: &str) -> SinkResult {
        self(label, message)
    }
}

/// Sink that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl ProgressSink for NoopSink {
    fn report(&mut self, _label: &str, _message: &str) -> SinkResult {
        Ok(())
    }
}

/// Sink that forwards events to the `log` facade at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl ProgressSink for LogSink {
    fn report(&mut self, label: &str, message: &str) -> SinkResult {
        info!("Progress: {label} {message}");
        Ok(())
    }
}

/// One progress event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    /// Event label (the protein being processed)
    pub label: String,
    /// Event message, e.g. `"40/120"`
    pub message: String,
}

/// Cloneable, non-blocking handle workers use to emit progress.
#[derive(Debug, Clone)]
pub struct ProgressSender {
    sender: Sender<ProgressEvent>,
}

impl ProgressSender {
    /// Emit an event, dropping it if the channel is full or closed.
    pub fn emit(&self, label: &str, message: String) {
        let event = ProgressEvent {
            label: label.to_string(),
            message,
        };
        match self.sender.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                debug!("Progress channel full, dropping {} {}", event.label, event.message);
            }
            Err(TrySendError::Disconnected(_)) => {}
        }
    }
}

/// Create a progress channel holding at most `capacity` undelivered events.
pub fn progress_channel(capacity: usize) -> (ProgressSender, Receiver<ProgressEvent>) {
    let (sender, receiver) = bounded(capacity.max(1));
    (ProgressSender { sender }, receiver)
}

/// Delivery counts of a finished relay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayStats {
    /// Events the sink accepted
    pub delivered: usize,
    /// Events whose delivery failed (sink error or panic)
    pub failures: usize,
    /// Events still queued when the relay was told to stop
    pub discarded: usize,
}

/// Drain `receiver` into `sink` until every sender is dropped.
pub fn relay<S>(receiver: Receiver<ProgressEvent>, sink: &mut S) -> RelayStats
where
    S: ProgressSink + ?Sized,
{
    relay_until(receiver, sink, &AtomicBool::new(false))
}

/// Deliver events from `receiver` to `sink` until every sender is dropped or
/// `stop` is raised.
///
/// `stop` is checked before each delivery. Once it is set, the pending event
/// and everything still queued are counted as discarded. A sink call already
/// in progress is allowed to return.
pub fn relay_until<S>(
    receiver: Receiver<ProgressEvent>,
    sink: &mut S,
    stop: &AtomicBool,
) -> RelayStats
where
    S: ProgressSink + ?Sized,
{
    let mut stats = RelayStats::default();
    for event in receiver.iter() {
        if stop.load(Ordering::Acquire) {
            stats.discarded = 1 + receiver.try_iter().count();
            debug!("Relay stopped, discarding {} progress events", stats.discarded);
            break;
        }
        match catch_unwind(AssertUnwindSafe(|| sink.report(&event.label, &event.message))) {
            Ok(Ok(())) => stats.delivered += 1,
            Ok(Err(e)) => {
                debug!("Progress sink rejected {} {}: {}", event.label, event.message, e);
                stats.failures += 1;
            }
            Err(_) => {
                debug!("Progress sink panicked on {} {}", event.label, event.message);
                stats.failures += 1;
            }
        }
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relay_delivers_in_order() {
        let (sender, receiver) = progress_channel(8);
        sender.emit("P1", "0/10".to_string());
        sender.emit("P1", "10/10".to_string());
        drop(sender);

        let mut seen = Vec::new();
        let mut sink = |label: &str, message: &str| -> SinkResult {
            seen.push(format!("{label} {message}"));
            Ok(())
        };
        let stats = relay(receiver, &mut sink);

        assert_eq!(
            stats,
            RelayStats {
                delivered: 2,
                failures: 0,
                discarded: 0
            }
        );
        assert_eq!(seen, vec!["P1 0/10", "P1 10/10"]);
    }

    #[test]
    fn test_full_channel_drops_without_blocking() {
        let (sender, receiver) = progress_channel(1);
        sender.emit("P1", "1".to_string());
        sender.emit("P1", "2".to_string());
        drop(sender);

        let stats = relay(receiver, &mut NoopSink);
        assert_eq!(stats.delivered, 1);
    }

    #[test]
    fn test_sink_errors_are_counted_not_raised() {
        let (sender, receiver) = progress_channel(4);
        sender.emit("P1", "0/3".to_string());
        sender.emit("P1", "3/3".to_string());
        drop(sender);

        let mut sink = |_: &str, _: &str| -> SinkResult { Err("window closed".into()) };
        let stats = relay(receiver, &mut sink);
        assert_eq!(
            stats,
            RelayStats {
                delivered: 0,
                failures: 2,
                discarded: 0
            }
        );
    }

    #[test]
    fn test_sink_panics_are_caught() {
        let (sender, receiver) = progress_channel(4);
        sender.emit("P1", "0/3".to_string());
        sender.emit("P1", "3/3".to_string());
        drop(sender);

        let mut calls = 0;
        let mut sink = |_: &str, _: &str| -> SinkResult {
            calls += 1;
            if calls == 1 {
                panic!("sink exploded");
            }
            Ok(())
        };
        let stats = relay(receiver, &mut sink);
        assert_eq!(
            stats,
            RelayStats {
                delivered: 1,
                failures: 1,
                discarded: 0
            }
        );
    }

    #[test]
    fn test_emit_after_receiver_dropped_is_silent() {
        let (sender, receiver) = progress_channel(4);
        drop(receiver);
        sender.emit("P1", "0/1".to_string());
    }

    #[test]
    fn test_stopped_relay_discards_backlog() {
        let (sender, receiver) = progress_channel(8);
        for i in 0..5 {
            sender.emit("P1", format!("{i}/5"));
        }
        drop(sender);

        let stop = AtomicBool::new(true);
        let mut calls = 0;
        let mut sink = |_: &str, _: &str| -> SinkResult {
            calls += 1;
            Ok(())
        };
        let stats = relay_until(receiver, &mut sink, &stop);

        assert_eq!(calls, 0);
        assert_eq!(stats.discarded, 5);
        assert_eq!(stats.delivered, 0);
    }

    #[test]
    fn test_stop_raised_mid_stream_skips_the_rest() {
        let (sender, receiver) = progress_channel(8);
        for i in 0..4 {
            sender.emit("P1", format!("{i}/4"));
        }
        drop(sender);

        let stop = AtomicBool::new(false);
        let mut seen = Vec::new();
        let mut sink = |_: &str, message: &str| -> SinkResult {
            seen.push(message.to_string());
            stop.store(true, Ordering::Release);
            Ok(())
        };
        let stats = relay_until(receiver, &mut sink, &stop);

        assert_eq!(seen, vec!["0/4"]);
        assert_eq!(stats.delivered, 1);
        assert_eq!(stats.discarded, 3);
    }
}
