//! Error taxonomy shared by the containers, the routing engine and the session.

use thiserror::Error;

/// Domain errors raised by the kitchen core.
///
/// `Empty` and `CapacityExceeded` signal a broken routing invariant and are
/// never produced by a correctly driven session. The remaining variants reject
/// malformed input before a session starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KitchenError {
    /// Pop, dequeue or peek on an empty container.
    #[error("cannot {operation} {container}: it is empty")]
    Empty {
        /// Label of the container involved.
        container: String,
        /// Operation that was attempted.
        operation: &'static str,
    },
    /// Push onto a bounded stack that is already full.
    #[error("cannot push to {container}: capacity of {capacity} reached")]
    CapacityExceeded {
        /// Label of the container involved.
        container: String,
        /// Fixed capacity of the container.
        capacity: usize,
    },
    /// The customer source produced no orders.
    #[error("no customers to serve")]
    NoCustomers,
    /// The ingredient source produced no ingredients.
    #[error("no ingredients for the conveyor belt")]
    NoIngredients,
    /// A customer order arrived without any required ingredients.
    #[error("order for {0} lists no ingredients")]
    EmptyOrder(String),
    /// A station index outside the kitchen.
    #[error("no station with index {0}")]
    InvalidStation(usize),
    /// A priority order that is not a permutation of the stations.
    #[error("priority order must list every station exactly once")]
    InvalidPriority,
    /// The session was already finished and flushed.
    #[error("session already finished")]
    SessionFinished,
}

/// Result alias for kitchen core operations.
pub type KitchenResult<T> = Result<T, KitchenError>;
