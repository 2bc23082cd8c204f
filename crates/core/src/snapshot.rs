//! Read-only views of the kitchen handed to renderers.

use serde::Serialize;

use crate::{
    models::{CustomerOrder, Ingredient},
    station::{Station, StationId},
};

/// Copy of a station's state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StationSnapshot {
    /// Station id.
    pub id: StationId,
    /// Customer bound to the station, if any.
    pub customer: Option<String>,
    /// Ingredients the bound order requires.
    pub required: Vec<Ingredient>,
    /// Ingredients placed so far, bottom to top.
    pub held: Vec<Ingredient>,
    /// Whether the bound order is satisfied.
    pub complete: bool,
}

impl StationSnapshot {
    pub(crate) fn from_station(station: &Station) -> Self {
        Self {
            id: station.id(),
            customer: station.order().map(|order| order.id.clone()),
            required: station
                .order()
                .map(|order| order.required.clone())
                .unwrap_or_default(),
            held: station.held().to_vec(),
            complete: station.is_complete(),
        }
    }

    /// Whether `ingredient` has already been placed here.
    pub fn holds(&self, ingredient: &Ingredient) -> bool {
        self.held.contains(ingredient)
    }
}

/// Everything a renderer shows for one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KitchenSnapshot {
    /// Steps progressed so far.
    pub step: u64,
    /// Customers still waiting, front first.
    pub customer_line: Vec<CustomerOrder>,
    /// Conveyor belt, front first.
    pub belt: Vec<Ingredient>,
    /// The three stations in id order.
    pub stations: Vec<StationSnapshot>,
    /// Reserve buffer, bottom to top.
    pub reserve: Vec<Ingredient>,
    /// Current match precedence.
    pub priority: Vec<StationId>,
}
