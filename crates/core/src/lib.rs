#![warn(clippy::all, missing_docs)]

//! Core kitchen logic for prepline.
//!
//! This crate hosts the containers, stations and routing engine that move
//! ingredients from the belt to customer orders, together with the session
//! driver, input loading, configuration and the routing journal used by the
//! terminal UI.

pub mod collections;
pub mod config;
pub mod engine;
pub mod error;
pub mod journal;
pub mod models;
pub mod priority;
pub mod session;
pub mod snapshot;
pub mod station;

pub use collections::{BoundedStack, FifoQueue};
pub use config::AppConfig;
pub use engine::{RoutingEngine, StepAction, StepOutcome, StepReport};
pub use error::{KitchenError, KitchenResult};
pub use journal::{EventKind, FileLogSink, LogFormat, LogSink, MemoryLogSink, RoutingEvent, RoutingLog};
pub use models::{CustomerOrder, Ingredient};
pub use priority::PriorityList;
pub use session::{
    Advance, EndReason, KitchenInput, Session, SessionLoader, SessionStatus, SessionSummary,
};
pub use snapshot::{KitchenSnapshot, StationSnapshot};
pub use station::{Station, StationId, StationRegistry, STATION_CAPACITY, STATION_COUNT};
