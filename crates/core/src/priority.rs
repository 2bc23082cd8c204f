//! Rotating match precedence over the stations.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    error::KitchenError,
    station::{StationId, STATION_COUNT},
};

/// Permutation of the station ids; earlier entries win shared ingredients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPriority")]
pub struct PriorityList {
    order: [StationId; STATION_COUNT],
}

#[derive(Deserialize)]
struct RawPriority {
    order: [StationId; STATION_COUNT],
}

impl TryFrom<RawPriority> for PriorityList {
    type Error = KitchenError;

    fn try_from(raw: RawPriority) -> Result<Self, Self::Error> {
        let complete = StationId::ALL.iter().all(|id| raw.order.contains(id));
        if complete {
            Ok(Self { order: raw.order })
        } else {
            Err(KitchenError::InvalidPriority)
        }
    }
}

impl Default for PriorityList {
    fn default() -> Self {
        Self {
            order: StationId::ALL,
        }
    }
}

impl PriorityList {
    /// Stations in index order: `A, B, C`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stations from highest to lowest priority.
    pub fn iter(&self) -> impl Iterator<Item = &StationId> {
        self.order.iter()
    }

    /// Same order as [`PriorityList::iter`].
    pub fn as_slice(&self) -> &[StationId] {
        &self.order
    }

    /// Current rank of `id`, zero being the highest priority.
    pub fn position(&self, id: StationId) -> usize {
        self.order
            .iter()
            .position(|entry| *entry == id)
            .unwrap_or(STATION_COUNT)
    }

    /// Move `id` to the back, keeping the relative order of the others.
    pub fn demote(&mut self, id: StationId) {
        let index = self.position(id);
        if index < STATION_COUNT {
            self.order[index..].rotate_left(1);
        }
    }
}

impl fmt::Display for PriorityList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letters: Vec<String> = self.order.iter().map(|id| id.letter().to_string()).collect();
        f.write_str(&letters.join(", "))
    }
}
