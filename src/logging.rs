//! Activity capture for the admin overview.
//!
//! A tracing layer copies this crate's log events into a bounded in-memory
//! buffer, which the admin dashboard renders as "Recent activity".

use parking_lot::RwLock;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

/// Only events from this crate are shown to the admin
const CAPTURED_TARGET: &str = env!("CARGO_CRATE_NAME");

#[derive(Debug, Clone)]
pub struct ActivityEntry {
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub level: Level,
    pub target: String,
    pub message: String,
}

/// Ring buffer of recent entries, oldest evicted first
pub struct ActivityLog {
    entries: RwLock<VecDeque<ActivityEntry>>,
    capacity: usize,
}

impl ActivityLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    pub fn record(&self, entry: ActivityEntry) {
        let mut entries = self.entries.write();
        if entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// Up to `count` entries, newest first
    pub fn recent(&self, count: usize) -> Vec<ActivityEntry> {
        self.entries.read().iter().rev().take(count).cloned().collect()
    }
}

pub type SharedActivityLog = Arc<ActivityLog>;

pub fn create_activity_log(capacity: usize) -> SharedActivityLog {
    Arc::new(ActivityLog::new(capacity))
}

/// Tracing layer feeding an [`ActivityLog`]
pub struct ActivityLayer {
    log: SharedActivityLog,
    max_level: Level,
}

impl ActivityLayer {
    /// Capture events at `max_level` or more severe
    pub fn new(log: SharedActivityLog, max_level: Level) -> Self {
        Self { log, max_level }
    }
}

impl<S> Layer<S> for ActivityLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if *metadata.level() > self.max_level || !metadata.target().starts_with(CAPTURED_TARGET) {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        self.log.record(ActivityEntry {
            timestamp: chrono::Utc::now(),
            level: *metadata.level(),
            target: metadata.target().to_string(),
            message: visitor.finish(),
        });
    }
}

/// Collects the `message` field plus any structured fields
#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: Vec<String>,
}

impl MessageVisitor {
    fn finish(self) -> String {
        if self.fields.is_empty() {
            self.message
        } else if self.message.is_empty() {
            self.fields.join(" ")
        } else {
            format!("{} {}", self.message, self.fields.join(" "))
        }
    }
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.fields.push(format!("{}={:?}", field.name(), value));
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.push(format!("{}={}", field.name(), value));
        }
    }
}
