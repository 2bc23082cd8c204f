//! Append-only routing journal and the sinks that persist it.

use std::{
    fmt,
    fs::{self, OpenOptions},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    models::Ingredient,
    priority::PriorityList,
    session::EndReason,
    station::StationId,
};

/// Directory under the user's data directory used for session logs.
pub const DEFAULT_LOG_DIR: &str = "prepline/logs";

/// Where a routed ingredient was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteSource {
    /// Front of the conveyor belt.
    Belt,
    /// Top of the reserve stack.
    Reserve,
}

impl fmt::Display for RouteSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteSource::Belt => f.write_str("belt"),
            RouteSource::Reserve => f.write_str("reserve"),
        }
    }
}

/// What happened in a single journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EventKind {
    /// A customer was bound to a station.
    Assigned {
        /// Station receiving the order.
        station: StationId,
        /// Customer now served there.
        customer: String,
    },
    /// An ingredient was pushed onto a station.
    Routed {
        /// Ingredient that moved.
        ingredient: Ingredient,
        /// Container it was taken from.
        from: RouteSource,
        /// Station it landed on.
        station: StationId,
    },
    /// A belt ingredient nobody wanted went onto the reserve.
    Parked {
        /// Ingredient pushed onto the reserve.
        ingredient: Ingredient,
    },
    /// A station finished its order.
    Completed {
        /// Station that finished.
        station: StationId,
        /// Customer whose order is done.
        customer: String,
    },
    /// A completed station is about to be cleared.
    Clearing {
        /// Station being cleared.
        station: StationId,
        /// Customer leaving the station.
        customer: String,
    },
    /// Turnover found the customer line empty.
    NoCustomersWaiting {
        /// Station left with its completed order.
        station: StationId,
    },
    /// Priority order after a rotation.
    PriorityRotated {
        /// New precedence, highest first.
        priority: PriorityList,
    },
    /// Closing record written by the session driver.
    SessionEnded {
        /// Why the session stopped.
        reason: EndReason,
        /// Customers served over the session.
        served: usize,
    },
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Assigned { station, customer } => {
                write!(f, "{station} assigned to {customer}")
            }
            EventKind::Routed {
                ingredient,
                from,
                station,
            } => write!(f, "{ingredient} moved from {from} to {station}"),
            EventKind::Parked { ingredient } => write!(f, "{ingredient} parked in reserve"),
            EventKind::Completed { station, customer } => {
                write!(f, "{station} completed the order for {customer}")
            }
            EventKind::Clearing { station, customer } => {
                write!(f, "clearing {station} and the order for {customer}")
            }
            EventKind::NoCustomersWaiting { station } => {
                write!(f, "no new customers for {station}")
            }
            EventKind::PriorityRotated { priority } => write!(f, "priority is now {priority}"),
            EventKind::SessionEnded { reason, served } => {
                write!(f, "session ended ({reason}) with {served} customers served")
            }
        }
    }
}

/// Journal entry stamped with the step that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingEvent {
    /// Step number; zero for session setup.
    pub step: u64,
    /// What happened.
    #[serde(flatten)]
    pub kind: EventKind,
}

impl fmt::Display for RoutingEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "step {}: {}", self.step, self.kind)
    }
}

/// Chronological, append-only list of routing events.
#[derive(Debug, Clone, Default)]
pub struct RoutingLog {
    events: Vec<RoutingEvent>,
}

impl RoutingLog {
    /// Empty journal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event for `step`.
    pub fn record(&mut self, step: u64, kind: EventKind) {
        debug!(step, event = %kind, "routing event");
        self.events.push(RoutingEvent { step, kind });
    }

    /// Every event, oldest first.
    pub fn events(&self) -> &[RoutingEvent] {
        &self.events
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// The most recent `count` events, oldest first.
    pub fn tail(&self, count: usize) -> &[RoutingEvent] {
        let start = self.events.len().saturating_sub(count);
        &self.events[start..]
    }
}

/// On-disk encoding for session logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One human-readable line per event.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

impl LogFormat {
    fn extension(self) -> &'static str {
        match self {
            LogFormat::Text => "log",
            LogFormat::Json => "jsonl",
        }
    }
}

/// Destination for a finished session's journal.
pub trait LogSink {
    /// Persist `events` in order.
    fn write_events(&mut self, events: &[RoutingEvent]) -> Result<()>;

    /// File the events end up in, for sinks backed by one.
    fn location(&self) -> Option<&Path> {
        None
    }
}

/// Sink that keeps events in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryLogSink {
    /// Events received so far.
    pub events: Vec<RoutingEvent>,
}

impl LogSink for MemoryLogSink {
    fn write_events(&mut self, events: &[RoutingEvent]) -> Result<()> {
        self.events.extend_from_slice(events);
        Ok(())
    }
}

/// Sink appending one record per line to a timestamped file.
pub struct FileLogSink {
    path: PathBuf,
    format: LogFormat,
}

impl FileLogSink {
    /// Create a sink writing a new session file under `root`.
    pub fn new(root: impl AsRef<Path>, format: LogFormat) -> Self {
        Self::at(root, format, Utc::now())
    }

    fn at(root: impl AsRef<Path>, format: LogFormat, started_at: DateTime<Utc>) -> Self {
        let file_name = format!(
            "session_{}.{}",
            started_at.format("%Y%m%d%H%M%S"),
            format.extension()
        );
        Self {
            path: root.as_ref().join(file_name),
            format,
        }
    }

    /// Default location under the user's data directory.
    pub fn default_root() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DEFAULT_LOG_DIR)
    }

    /// File the sink writes to.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LogSink for FileLogSink {
    fn write_events(&mut self, events: &[RoutingEvent]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("failed to open {}", self.path.display()))?;
        let mut writer = BufWriter::new(file);
        for event in events {
            match self.format {
                LogFormat::Text => writeln!(writer, "{event}")?,
                LogFormat::Json => {
                    serde_json::to_writer(&mut writer, event)
                        .context("failed to serialize routing event")?;
                    writeln!(writer)?;
                }
            }
        }
        writer
            .flush()
            .with_context(|| format!("failed to write {}", self.path.display()))
    }

    fn location(&self) -> Option<&Path> {
        Some(&self.path)
    }
}
