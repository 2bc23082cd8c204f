#![allow(missing_docs)]

//! Kitchen session: input loading and the turn-by-turn driver.

mod driver;
pub mod loader;

pub use driver::{Advance, EndReason, Session, SessionStatus, SessionSummary, DEFAULT_SERVED_TARGET};
pub use loader::{KitchenInput, SessionLoader};
