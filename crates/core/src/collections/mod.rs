//! Labelled containers backing the kitchen state.

/// Bounded LIFO stack used for station slots and the reserve buffer.
pub mod stack;
/// Unbounded FIFO queue used for the customer line and the conveyor belt.
pub mod queue;

pub use queue::FifoQueue;
pub use stack::BoundedStack;
