//! Preparation stations and the registry that binds them to customer orders.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    collections::BoundedStack,
    error::{KitchenError, KitchenResult},
    models::{CustomerOrder, Ingredient},
};

/// Number of preparation stations in the kitchen.
pub const STATION_COUNT: usize = 3;

/// Held-ingredient slots per station.
pub const STATION_CAPACITY: usize = 3;

/// Index of a station, always below [`STATION_COUNT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct StationId(usize);

impl StationId {
    /// All station ids in index order.
    pub const ALL: [StationId; STATION_COUNT] = [StationId(0), StationId(1), StationId(2)];

    /// Id for `index`, or `None` when out of range.
    pub fn new(index: usize) -> Option<Self> {
        (index < STATION_COUNT).then_some(Self(index))
    }

    /// Zero-based position in [`StationId::ALL`].
    pub fn index(self) -> usize {
        self.0
    }

    /// Single-letter display label (`A`, `B`, `C`).
    pub fn letter(self) -> char {
        (b'A' + self.0 as u8) as char
    }
}

impl TryFrom<usize> for StationId {
    type Error = KitchenError;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        Self::new(index).ok_or(KitchenError::InvalidStation(index))
    }
}

impl From<StationId> for usize {
    fn from(id: StationId) -> Self {
        id.0
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Station {}", self.letter())
    }
}

/// One preparation slot bound to at most one customer order.
#[derive(Debug, Clone)]
pub struct Station {
    id: StationId,
    order: Option<CustomerOrder>,
    held: BoundedStack<Ingredient>,
}

impl Station {
    fn new(id: StationId) -> Self {
        Self {
            id,
            order: None,
            held: BoundedStack::new(id.to_string(), STATION_CAPACITY),
        }
    }

    /// Id of this station.
    pub fn id(&self) -> StationId {
        self.id
    }

    /// Order currently bound to the station.
    pub fn order(&self) -> Option<&CustomerOrder> {
        self.order.as_ref()
    }

    /// Ingredients placed so far, bottom to top.
    pub fn held(&self) -> &[Ingredient] {
        self.held.items()
    }

    /// Whether a customer order is bound.
    pub fn is_active(&self) -> bool {
        self.order.is_some()
    }

    /// True when the bound order still needs `ingredient` and a slot is free.
    ///
    /// A full station never wants anything, which keeps pushes within capacity
    /// even for orders listing more ingredients than there are slots.
    pub fn wants(&self, ingredient: &Ingredient) -> bool {
        match &self.order {
            Some(order) => {
                order.requires(ingredient)
                    && !self.held.contains(ingredient)
                    && !self.held.is_full()
            }
            None => false,
        }
    }

    /// Full slots or every required ingredient present.
    pub fn is_complete(&self) -> bool {
        match &self.order {
            Some(order) => {
                self.held.is_full() || order.required.iter().all(|item| self.held.contains(item))
            }
            None => false,
        }
    }

    pub(crate) fn receive(&mut self, ingredient: Ingredient) -> KitchenResult<()> {
        self.held.push(ingredient)
    }

    /// Clear held ingredients and bind `order`, returning the previous order.
    pub(crate) fn assign(&mut self, order: CustomerOrder) -> Option<CustomerOrder> {
        self.held.clear();
        self.order.replace(order)
    }
}

/// Fixed set of three stations.
#[derive(Debug, Clone)]
pub struct StationRegistry {
    stations: [Station; STATION_COUNT],
}

impl Default for StationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl StationRegistry {
    /// Three idle stations.
    pub fn new() -> Self {
        Self {
            stations: StationId::ALL.map(Station::new),
        }
    }

    /// Station for `id`.
    pub fn get(&self, id: StationId) -> &Station {
        &self.stations[id.index()]
    }

    pub(crate) fn get_mut(&mut self, id: StationId) -> &mut Station {
        &mut self.stations[id.index()]
    }

    /// Stations in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Station> {
        self.stations.iter()
    }

    /// Name of the customer currently bound to `id`.
    pub fn customer_at(&self, id: StationId) -> Option<&str> {
        self.get(id).order().map(|order| order.id.as_str())
    }

    /// First station in `order` that wants `ingredient`.
    pub fn first_wanting<'a>(
        &self,
        order: impl IntoIterator<Item = &'a StationId>,
        ingredient: &Ingredient,
    ) -> Option<StationId> {
        order
            .into_iter()
            .copied()
            .find(|id| self.get(*id).wants(ingredient))
    }

    pub(crate) fn assign(&mut self, id: StationId, order: CustomerOrder) -> Option<CustomerOrder> {
        self.get_mut(id).assign(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(index: usize) -> StationId {
        StationId::new(index).unwrap()
    }

    #[test]
    fn station_ids_serialize_as_indices_and_reject_out_of_range() {
        assert_eq!(serde_json::to_string(&id(2)).unwrap(), "2");
        assert_eq!(serde_json::from_str::<StationId>("1").unwrap(), id(1));

        let err = serde_json::from_str::<StationId>("7").unwrap_err();
        assert!(err.to_string().contains("no station with index 7"));
        assert_eq!(StationId::try_from(3), Err(KitchenError::InvalidStation(3)));
    }

    #[test]
    fn station_ids_are_bounded_and_lettered() {
        assert_eq!(StationId::new(3), None);
        assert_eq!(id(0).letter(), 'A');
        assert_eq!(id(2).to_string(), "Station C");
    }

    #[test]
    fn inactive_station_wants_nothing() {
        let registry = StationRegistry::new();
        let station = registry.get(id(1));
        assert!(!station.is_active());
        assert!(!station.wants(&"bun".into()));
        assert!(!station.is_complete());
    }

    #[test]
    fn station_stops_wanting_held_ingredients() -> KitchenResult<()> {
        let mut registry = StationRegistry::new();
        registry.assign(id(0), CustomerOrder::new("Ann", ["bun", "patty"]));

        let station = registry.get_mut(id(0));
        assert!(station.wants(&"bun".into()));
        station.receive("bun".into())?;
        assert!(!station.wants(&"bun".into()));
        assert!(!station.is_complete());
        station.receive("patty".into())?;
        assert!(station.is_complete());
        Ok(())
    }

    #[test]
    fn full_station_completes_even_with_missing_requirements() -> KitchenResult<()> {
        let mut registry = StationRegistry::new();
        registry.assign(id(2), CustomerOrder::new("Cy", ["a", "b", "c", "d"]));

        let station = registry.get_mut(id(2));
        for token in ["a", "b", "c"] {
            station.receive(token.into())?;
        }
        assert!(station.is_complete());
        assert!(!station.wants(&"d".into()));
        Ok(())
    }

    #[test]
    fn reassignment_clears_held_and_returns_previous_order() -> KitchenResult<()> {
        let mut registry = StationRegistry::new();
        registry.assign(id(0), CustomerOrder::new("Ann", ["bun"]));
        registry.get_mut(id(0)).receive("bun".into())?;

        let previous = registry.assign(id(0), CustomerOrder::new("Bo", ["cheese"]));
        assert_eq!(previous.map(|order| order.id), Some("Ann".to_string()));
        assert!(registry.get(id(0)).held().is_empty());
        assert_eq!(registry.customer_at(id(0)), Some("Bo"));
        Ok(())
    }

    #[test]
    fn first_wanting_follows_given_order() {
        let mut registry = StationRegistry::new();
        registry.assign(id(0), CustomerOrder::new("Ann", ["cheese"]));
        registry.assign(id(2), CustomerOrder::new("Cy", ["cheese"]));

        let cheese = Ingredient::from("cheese");
        assert_eq!(
            registry.first_wanting(&[id(2), id(1), id(0)], &cheese),
            Some(id(2))
        );
        assert_eq!(
            registry.first_wanting(&[id(0), id(1), id(2)], &cheese),
            Some(id(0))
        );
        assert_eq!(registry.first_wanting(&[id(1)], &cheese), None);
    }
}
