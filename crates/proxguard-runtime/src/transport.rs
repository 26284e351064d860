//! Event sinks – where each tick's [`Event`] goes.
//!
//! Delivery is fire-and-forget: a sink reports failure through its
//! `Result`, and the [`SensorLoop`][crate::sensor_loop::SensorLoop] logs it
//! and moves on. Sinks never retry and never buffer.
//!
//! | Sink | Destination |
//! |---|---|
//! | [`HttpSink`] | JSON `POST` to the signing service (blocking, with timeout) |
//! | [`LogSink`] | structured `tracing` record on target `proxguard::events` |
//! | [`MemorySink`] | in-process buffer, for embedding and tests |

use std::sync::{Arc, Mutex};
use std::time::Duration;

use proxguard_types::{Event, ProxError};
use tracing::{debug, info};

/// Default time allowed for one delivery before it is abandoned.
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(2);

/// Destination for classified events.
pub trait EventSink: Send {
    /// Short label used in logs.
    fn name(&self) -> &str;

    fn send(&mut self, event: &Event) -> Result<(), ProxError>;
}

// ─────────────────────────────────────────────────────────────────────────────
// HttpSink
// ─────────────────────────────────────────────────────────────────────────────

/// Posts each event as JSON to a fixed URL.
pub struct HttpSink {
    url: String,
    client: reqwest::blocking::Client,
}

impl HttpSink {
    /// Build a sink for `url` whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// [`ProxError::Transport`] if the HTTP client cannot be constructed.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ProxError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProxError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl EventSink for HttpSink {
    fn name(&self) -> &str {
        "http"
    }

    fn send(&mut self, event: &Event) -> Result<(), ProxError> {
        let response = self
            .client
            .post(&self.url)
            .json(event)
            .send()
            .map_err(|e| ProxError::Transport(format!("{} unreachable: {e}", self.url)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProxError::Transport(format!(
                "{} returned HTTP {status}",
                self.url
            )));
        }
        debug!(sequence = event.sequence_num, %status, "event delivered");
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// LogSink
// ─────────────────────────────────────────────────────────────────────────────

/// Writes every event to the log instead of the network (`--dry-run`).
#[derive(Debug, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn name(&self) -> &str {
        "log"
    }

    fn send(&mut self, event: &Event) -> Result<(), ProxError> {
        let json =
            serde_json::to_string(event).map_err(|e| ProxError::Serialization(e.to_string()))?;
        info!(
            target: "proxguard::events",
            sequence = event.sequence_num,
            event_type = %event.event_type,
            event = %json,
            "event"
        );
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// MemorySink
// ─────────────────────────────────────────────────────────────────────────────

/// Collects events in a shared buffer.
///
/// Clones share the buffer, so one handle can be boxed into a loop while
/// another is kept for inspection.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    events: Arc<Mutex<Vec<Event>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything received so far.
    pub fn events(&self) -> Vec<Event> {
        self.events
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl EventSink for MemorySink {
    fn name(&self) -> &str {
        "memory"
    }

    fn send(&mut self, event: &Event) -> Result<(), ProxError> {
        self.events
            .lock()
            .map_err(|_| ProxError::Transport("memory sink poisoned".to_string()))?
            .push(event.clone());
        Ok(())
    }
}
