//! Activity log: a user-facing record of what the library did.
//!
//! Every generation and export step reports to an [`ActivitySink`] passed in
//! by the caller. The sink is an explicit argument rather than a global so
//! tests can capture events and embedders can forward them anywhere.
//!
//! [`ActivityLog`] is the standard sink: it keeps the most recent events in a
//! bounded ring buffer, persists them through a [`LogStore`] after each event
//! and mirrors every event into `tracing`. Persistence failures are reported
//! via `tracing::warn!` and never interrupt the operation that logged.
//!
//! # Example
//!
//! ```rust
//! use applicraft::activity::{ActivityLog, ActivitySink, Level};
//!
//! let log = ActivityLog::in_memory();
//! log.record(Level::Info, "Export", "render_material", "Rendering Cover Letter", None);
//! assert!(log.format_as_text().contains("Export.render_material - Rendering Cover Letter"));
//! ```

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, error, info, warn};

/// Severity of an activity event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Info,
    Error,
    Debug,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Info => "INFO",
            Level::Error => "ERROR",
            Level::Debug => "DEBUG",
        }
    }
}

/// One entry of the activity log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub timestamp: DateTime<Utc>,
    pub level: Level,
    pub module: String,
    pub function: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ActivityEvent {
    /// A new event stamped with the current time.
    pub fn new(
        level: Level,
        module: impl Into<String>,
        function: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            module: module.into(),
            function: function.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// `[timestamp] [LEVEL] Module.function - message | Details: {...}`
    ///
    /// Object details are printed as JSON with sorted keys; string details
    /// are printed as-is.
    pub fn format_line(&self) -> String {
        let module = if self.module.is_empty() {
            "App"
        } else {
            &self.module
        };
        let function = if self.function.is_empty() {
            String::new()
        } else {
            format!(".{}", self.function)
        };
        let details = match &self.details {
            None | Some(serde_json::Value::Null) => String::new(),
            Some(serde_json::Value::String(s)) => format!(" | Details: {s}"),
            // serde_json maps are ordered by key.
            Some(value) => format!(" | Details: {value}"),
        };
        format!(
            "[{}] [{}] {}{} - {}{}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.level.as_str(),
            module,
            function,
            self.message,
            details
        )
    }
}

/// Receives activity events.
///
/// Implementations must be `Send + Sync`: the generation calls run
/// concurrently and may log at the same time.
pub trait ActivitySink: Send + Sync {
    fn log(&self, event: ActivityEvent);

    /// Build and log an event in one call.
    fn record(
        &self,
        level: Level,
        module: &str,
        function: &str,
        message: &str,
        details: Option<serde_json::Value>,
    ) {
        let mut event = ActivityEvent::new(level, module, function, message);
        event.details = details;
        self.log(event);
    }
}

/// Discards every event.
pub struct NoopSink;

impl ActivitySink for NoopSink {
    fn log(&self, _event: ActivityEvent) {}
}

// ── Persistence ──────────────────────────────────────────────────────────────

/// Durable storage for the activity log.
pub trait LogStore: Send + Sync {
    /// Load previously saved events, oldest first.
    fn load(&self) -> io::Result<Vec<ActivityEvent>>;

    /// Replace the stored events.
    fn save(&self, events: &[ActivityEvent]) -> io::Result<()>;

    /// Remove all stored events.
    fn clear(&self) -> io::Result<()>;
}

/// Keeps the "stored" copy in memory.
#[derive(Default)]
pub struct MemoryStore {
    events: Mutex<Vec<ActivityEvent>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LogStore for MemoryStore {
    fn load(&self) -> io::Result<Vec<ActivityEvent>> {
        Ok(self
            .events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, events: &[ActivityEvent]) -> io::Result<()> {
        *self.events.lock().unwrap_or_else(PoisonError::into_inner) = events.to_vec();
        Ok(())
    }

    fn clear(&self) -> io::Result<()> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        Ok(())
    }
}

/// Stores events as a JSON array in one file.
///
/// Writes go to a temporary file in the same directory which is then
/// renamed over the target, so a crash never leaves a truncated log.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LogStore for JsonFileStore {
    fn load(&self) -> io::Result<Vec<ActivityEvent>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };
        serde_json::from_slice(&bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    fn save(&self, events: &[ActivityEvent]) -> io::Result<()> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let json = serde_json::to_vec(events)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(&json)?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }

    fn clear(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

// ── Ring buffer ──────────────────────────────────────────────────────────────

/// Bounded, persisted activity log.
pub struct ActivityLog {
    entries: Mutex<VecDeque<ActivityEvent>>,
    capacity: usize,
    store: Box<dyn LogStore>,
}

impl ActivityLog {
    /// Events kept when no capacity is given.
    pub const DEFAULT_CAPACITY: usize = 500;

    /// A log persisted only in memory.
    pub fn in_memory() -> Self {
        Self::with_store(MemoryStore::new(), Self::DEFAULT_CAPACITY)
    }

    /// A log backed by `store`, seeded with the history it holds.
    ///
    /// Unreadable history is discarded with a warning. Only the newest
    /// `capacity` events are kept.
    pub fn with_store(store: impl LogStore + 'static, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let history = store.load().unwrap_or_else(|e| {
            warn!("Discarding unreadable activity history: {}", e);
            Vec::new()
        });
        let skip = history.len().saturating_sub(capacity);
        let loaded = history.len() - skip;

        let log = Self {
            entries: Mutex::new(history.into_iter().skip(skip).collect()),
            capacity,
            store: Box::new(store),
        };
        log.record(
            Level::Info,
            "ActivityLog",
            "new",
            "Activity log initialised and history loaded.",
            Some(serde_json::json!({ "loadedCount": loaded })),
        );
        log
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Snapshot of the current entries, oldest first.
    pub fn entries(&self) -> Vec<ActivityEvent> {
        self.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// All entries as text, one line per event.
    pub fn format_as_text(&self) -> String {
        self.lock()
            .iter()
            .map(ActivityEvent::format_line)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Drop every entry from memory and from the store.
    pub fn clear(&self) {
        self.lock().clear();
        match self.store.clear() {
            Ok(()) => self.record(
                Level::Info,
                "ActivityLog",
                "clear",
                "All log entries cleared.",
                None,
            ),
            Err(e) => self.record(
                Level::Error,
                "ActivityLog",
                "clear",
                "Cleared log entries in memory, but the store could not be cleared.",
                Some(serde_json::json!({ "error": e.to_string() })),
            ),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<ActivityEvent>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ActivitySink for ActivityLog {
    fn log(&self, event: ActivityEvent) {
        mirror_to_tracing(&event);

        let mut entries = self.lock();
        entries.push_back(event);
        while entries.len() > self.capacity {
            entries.pop_front();
        }

        let snapshot: Vec<ActivityEvent> = entries.iter().cloned().collect();
        if let Err(e) = self.store.save(&snapshot) {
            warn!("Failed to persist activity log: {}", e);
        }
    }
}

fn mirror_to_tracing(event: &ActivityEvent) {
    let origin = format!("{}.{}", event.module, event.function);
    match event.level {
        Level::Error => error!(target: "applicraft::activity", %origin, "{}", event.message),
        Level::Info => info!(target: "applicraft::activity", %origin, "{}", event.message),
        Level::Debug => debug!(target: "applicraft::activity", %origin, "{}", event.message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn fixed_event(details: Option<serde_json::Value>) -> ActivityEvent {
        ActivityEvent {
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap(),
            level: Level::Error,
            module: "DocGen".into(),
            function: "render_pdf".into(),
            message: "Error generating PDF".into(),
            details,
        }
    }

    struct FailingStore;

    impl LogStore for FailingStore {
        fn load(&self) -> io::Result<Vec<ActivityEvent>> {
            Err(io::Error::new(io::ErrorKind::InvalidData, "garbage"))
        }
        fn save(&self, _events: &[ActivityEvent]) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
        }
        fn clear(&self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
        }
    }

    #[test]
    fn format_line_with_sorted_details() {
        let event = fixed_event(Some(json!({ "zeta": 1, "alpha": "x" })));
        assert_eq!(
            event.format_line(),
            r#"[2024-05-01T12:30:00.000Z] [ERROR] DocGen.render_pdf - Error generating PDF | Details: {"alpha":"x","zeta":1}"#
        );
    }

    #[test]
    fn format_line_with_string_details_and_defaults() {
        let mut event = fixed_event(Some(json!("boom")));
        event.module.clear();
        event.function.clear();
        assert_eq!(
            event.format_line(),
            "[2024-05-01T12:30:00.000Z] [ERROR] App - Error generating PDF | Details: boom"
        );
    }

    #[test]
    fn ring_buffer_keeps_newest() {
        let log = ActivityLog::with_store(MemoryStore::new(), 3);
        for i in 0..5 {
            log.record(Level::Debug, "Test", "ring", &format!("event {i}"), None);
        }
        let messages: Vec<String> = log.entries().into_iter().map(|e| e.message).collect();
        assert_eq!(messages, vec!["event 2", "event 3", "event 4"]);
    }

    #[test]
    fn history_is_loaded_from_store() {
        let store = MemoryStore::new();
        store.save(&[fixed_event(None)]).unwrap();
        let log = ActivityLog::with_store(store, 10);
        let entries = log.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].message, "Error generating PDF");
        assert_eq!(entries[1].details, Some(json!({ "loadedCount": 1 })));
    }

    #[test]
    fn json_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("activity.json");

        let log = ActivityLog::with_store(JsonFileStore::new(&path), 50);
        log.record(Level::Info, "App", "generate", "Started", None);
        drop(log);

        let reopened = ActivityLog::with_store(JsonFileStore::new(&path), 50);
        let messages: Vec<String> = reopened.entries().into_iter().map(|e| e.message).collect();
        assert!(messages.contains(&"Started".to_string()));
        // Two events from the first session plus the reopening event.
        assert_eq!(messages.len(), 3);

        reopened.clear();
        assert_eq!(reopened.len(), 1);
        let stored = JsonFileStore::new(&path).load().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].message, "All log entries cleared.");
    }

    #[test]
    fn store_failures_do_not_interrupt_logging() {
        let log = ActivityLog::with_store(FailingStore, 10);
        log.record(Level::Info, "App", "x", "still recorded", None);
        assert_eq!(log.len(), 2);
        log.clear();
        assert_eq!(log.entries()[0].level, Level::Error);
    }

    #[test]
    fn noop_sink_accepts_events() {
        NoopSink.record(Level::Info, "m", "f", "ignored", None);
    }
}
