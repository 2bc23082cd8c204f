#![allow(missing_docs)]

//! Step-by-step routing of belt ingredients to stations.

use rand::{seq::SliceRandom, Rng};
use tracing::{debug, info, warn};

use crate::{
    collections::{BoundedStack, FifoQueue},
    error::{KitchenError, KitchenResult},
    journal::{EventKind, RouteSource, RoutingLog},
    models::{CustomerOrder, Ingredient},
    priority::PriorityList,
    snapshot::{KitchenSnapshot, StationSnapshot},
    station::{StationId, StationRegistry, STATION_CAPACITY},
};

/// What a single step did with an ingredient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepAction {
    /// Front of the belt went straight to a station.
    Routed {
        ingredient: Ingredient,
        station: StationId,
    },
    /// Top of the reserve went to a station; the belt was left untouched.
    Drained {
        ingredient: Ingredient,
        station: StationId,
    },
    /// Front of the belt went onto the reserve.
    Parked { ingredient: Ingredient },
}

impl StepAction {
    /// Station that received an ingredient, if any.
    pub fn station(&self) -> Option<StationId> {
        match self {
            StepAction::Routed { station, .. } | StepAction::Drained { station, .. } => {
                Some(*station)
            }
            StepAction::Parked { .. } => None,
        }
    }
}

/// Summary of one progressed step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub step: u64,
    pub action: StepAction,
    /// Station that completed its order during this step.
    pub completed: Option<StationId>,
    /// True when the completed station was handed a new customer.
    pub served: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Progressed(StepReport),
    /// The belt is empty; every further step returns this unchanged.
    BeltExhausted,
}

/// Owns every kitchen container for the lifetime of a session.
#[derive(Debug, Clone)]
pub struct RoutingEngine {
    customers: FifoQueue<CustomerOrder>,
    belt: FifoQueue<Ingredient>,
    stations: StationRegistry,
    reserve: BoundedStack<Ingredient>,
    priority: PriorityList,
    log: RoutingLog,
    step: u64,
    plated: usize,
}

impl RoutingEngine {
    /// Shuffle `ingredients` once onto the belt and seat the first customers.
    pub fn new<R>(
        orders: Vec<CustomerOrder>,
        mut ingredients: Vec<Ingredient>,
        rng: &mut R,
    ) -> KitchenResult<Self>
    where
        R: Rng + ?Sized,
    {
        ingredients.shuffle(rng);
        Self::with_belt(orders, ingredients)
    }

    /// Build an engine whose belt keeps `belt` in the given order.
    pub fn with_belt(orders: Vec<CustomerOrder>, belt: Vec<Ingredient>) -> KitchenResult<Self> {
        if orders.is_empty() {
            return Err(KitchenError::NoCustomers);
        }
        if let Some(order) = orders.iter().find(|order| order.is_empty()) {
            return Err(KitchenError::EmptyOrder(order.id.clone()));
        }
        if belt.is_empty() {
            return Err(KitchenError::NoIngredients);
        }
        for order in orders.iter().filter(|order| order.len() > STATION_CAPACITY) {
            warn!(
                customer = %order.id,
                ingredients = order.len(),
                capacity = STATION_CAPACITY,
                "order exceeds station capacity; it completes once the station is full"
            );
        }

        let mut customers = FifoQueue::new("Customer line");
        customers.extend(orders);
        let mut conveyor = FifoQueue::new("Conveyor belt");
        conveyor.extend(belt);

        let mut engine = Self {
            customers,
            belt: conveyor,
            stations: StationRegistry::new(),
            reserve: BoundedStack::unbounded("Reserve"),
            priority: PriorityList::new(),
            log: RoutingLog::new(),
            step: 0,
            plated: 0,
        };

        for station in StationId::ALL {
            if engine.customers.is_empty() {
                break;
            }
            let order = engine.customers.dequeue()?;
            let customer = order.id.clone();
            engine.stations.assign(station, order);
            engine
                .log
                .record(0, EventKind::Assigned { station, customer });
        }

        info!(
            belt = engine.belt.len(),
            waiting = engine.customers.len(),
            "kitchen ready"
        );
        Ok(engine)
    }

    /// Route exactly one ingredient, or report that the belt is exhausted.
    pub fn step(&mut self) -> KitchenResult<StepOutcome> {
        if self.belt.is_empty() {
            return Ok(StepOutcome::BeltExhausted);
        }
        self.step += 1;
        let step = self.step;

        let front = self.belt.peek()?.clone();
        let action = match self.stations.first_wanting(self.priority.iter(), &front) {
            Some(station) => {
                let ingredient = self.belt.dequeue()?;
                self.deliver(ingredient.clone(), RouteSource::Belt, station)?;
                StepAction::Routed {
                    ingredient,
                    station,
                }
            }
            None if self.reserve.is_empty() => self.park()?,
            None => {
                let wanted = {
                    let top = self.reserve.peek()?;
                    self.stations.first_wanting(self.priority.iter(), top)
                };
                match wanted {
                    Some(station) => {
                        let ingredient = self.reserve.pop()?;
                        self.deliver(ingredient.clone(), RouteSource::Reserve, station)?;
                        StepAction::Drained {
                            ingredient,
                            station,
                        }
                    }
                    None => self.park()?,
                }
            }
        };

        let mut report = StepReport {
            step,
            action,
            completed: None,
            served: false,
        };
        if let Some(station) = report.action.station() {
            if self.stations.get(station).is_complete() {
                report.served = self.turn_over(station)?;
                report.completed = Some(station);
                self.priority.demote(station);
                self.log.record(
                    step,
                    EventKind::PriorityRotated {
                        priority: self.priority.clone(),
                    },
                );
            }
        }
        debug!(step, action = ?report.action, "step complete");
        Ok(StepOutcome::Progressed(report))
    }

    fn deliver(
        &mut self,
        ingredient: Ingredient,
        from: RouteSource,
        station: StationId,
    ) -> KitchenResult<()> {
        self.stations
            .get_mut(station)
            .receive(ingredient.clone())?;
        self.log.record(
            self.step,
            EventKind::Routed {
                ingredient,
                from,
                station,
            },
        );
        Ok(())
    }

    fn park(&mut self) -> KitchenResult<StepAction> {
        let ingredient = self.belt.dequeue()?;
        self.reserve.push(ingredient.clone())?;
        self.log.record(
            self.step,
            EventKind::Parked {
                ingredient: ingredient.clone(),
            },
        );
        Ok(StepAction::Parked { ingredient })
    }

    /// Clear a completed station and seat the next customer if one is waiting.
    fn turn_over(&mut self, station: StationId) -> KitchenResult<bool> {
        let step = self.step;
        let customer = self
            .stations
            .customer_at(station)
            .unwrap_or_default()
            .to_string();
        self.log.record(
            step,
            EventKind::Completed {
                station,
                customer: customer.clone(),
            },
        );
        self.log.record(step, EventKind::Clearing { station, customer });

        if self.customers.is_empty() {
            info!(%station, "order complete; no customers waiting");
            self.log
                .record(step, EventKind::NoCustomersWaiting { station });
            return Ok(false);
        }

        let plated = self.stations.get(station).held().len();
        let next = self.customers.dequeue()?;
        let customer = next.id.clone();
        self.stations.assign(station, next);
        self.plated += plated;
        info!(%station, customer = %customer, "station turned over");
        self.log.record(step, EventKind::Assigned { station, customer });
        Ok(true)
    }

    pub(crate) fn record(&mut self, kind: EventKind) {
        self.log.record(self.step, kind);
    }

    /// Number of steps that progressed so far.
    pub fn steps(&self) -> u64 {
        self.step
    }

    /// Ingredients cleared away with served orders.
    pub fn plated(&self) -> usize {
        self.plated
    }

    pub fn is_belt_exhausted(&self) -> bool {
        self.belt.is_empty()
    }

    pub fn customers(&self) -> &FifoQueue<CustomerOrder> {
        &self.customers
    }

    pub fn belt(&self) -> &FifoQueue<Ingredient> {
        &self.belt
    }

    pub fn stations(&self) -> &StationRegistry {
        &self.stations
    }

    pub fn reserve(&self) -> &BoundedStack<Ingredient> {
        &self.reserve
    }

    pub fn priority(&self) -> &PriorityList {
        &self.priority
    }

    pub fn log(&self) -> &RoutingLog {
        &self.log
    }

    /// Read-only copy of everything a renderer needs.
    pub fn snapshot(&self) -> KitchenSnapshot {
        KitchenSnapshot {
            step: self.step,
            customer_line: self.customers.items(),
            belt: self.belt.items(),
            stations: self
                .stations
                .iter()
                .map(StationSnapshot::from_station)
                .collect(),
            reserve: self.reserve.items().to_vec(),
            priority: self.priority.as_slice().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn station(index: usize) -> StationId {
        StationId::ALL[index]
    }

    fn belt(tokens: &[&str]) -> Vec<Ingredient> {
        tokens.iter().map(|token| Ingredient::from(*token)).collect()
    }

    fn held(engine: &RoutingEngine, index: usize) -> Vec<&str> {
        engine
            .stations()
            .get(station(index))
            .held()
            .iter()
            .map(Ingredient::as_str)
            .collect()
    }

    fn lines_since(engine: &RoutingEngine, start: usize) -> Vec<String> {
        engine.log().events()[start..]
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    fn progressed(outcome: StepOutcome) -> StepReport {
        match outcome {
            StepOutcome::Progressed(report) => report,
            StepOutcome::BeltExhausted => panic!("belt exhausted unexpectedly"),
        }
    }

    #[test]
    fn rejects_empty_inputs() {
        let orders = vec![CustomerOrder::new("Ann", ["bun"])];
        assert_eq!(
            RoutingEngine::with_belt(Vec::new(), belt(&["bun"])).unwrap_err(),
            KitchenError::NoCustomers
        );
        assert_eq!(
            RoutingEngine::with_belt(orders, Vec::new()).unwrap_err(),
            KitchenError::NoIngredients
        );
        let empty_order = vec![CustomerOrder::new("Bo", Vec::<&str>::new())];
        assert_eq!(
            RoutingEngine::with_belt(empty_order, belt(&["bun"])).unwrap_err(),
            KitchenError::EmptyOrder("Bo".to_string())
        );
    }

    #[test]
    fn seats_first_three_customers_in_line_order() -> KitchenResult<()> {
        let orders = ["Ann", "Bo", "Cy", "Di"]
            .into_iter()
            .map(|name| CustomerOrder::new(name, ["bun"]))
            .collect();
        let engine = RoutingEngine::with_belt(orders, belt(&["bun"]))?;

        let seated: Vec<_> = StationId::ALL
            .iter()
            .map(|id| engine.stations().customer_at(*id))
            .collect();
        assert_eq!(seated, [Some("Ann"), Some("Bo"), Some("Cy")]);
        assert_eq!(engine.customers().len(), 1);
        assert_eq!(
            lines_since(&engine, 0),
            [
                "step 0: Station A assigned to Ann",
                "step 0: Station B assigned to Bo",
                "step 0: Station C assigned to Cy",
            ]
        );
        Ok(())
    }

    #[test]
    fn fewer_customers_than_stations_leaves_stations_idle() -> KitchenResult<()> {
        let orders = vec![CustomerOrder::new("Ann", ["bun"])];
        let engine = RoutingEngine::with_belt(orders, belt(&["bun"]))?;
        assert!(engine.stations().get(station(0)).is_active());
        assert!(!engine.stations().get(station(1)).is_active());
        assert!(!engine.stations().get(station(2)).is_active());
        Ok(())
    }

    #[test]
    fn burger_scenario_routes_completes_and_rotates() -> KitchenResult<()> {
        let orders = vec![
            CustomerOrder::new("Ann", ["bun", "patty"]),
            CustomerOrder::new("Bo", ["cheese"]),
            CustomerOrder::new("Cy", ["lettuce"]),
            CustomerOrder::new("Di", ["onion"]),
        ];
        let mut engine = RoutingEngine::with_belt(orders, belt(&["bun", "patty", "cheese"]))?;
        let setup = engine.log().len();

        let first = progressed(engine.step()?);
        assert_eq!(
            first.action,
            StepAction::Routed {
                ingredient: "bun".into(),
                station: station(0)
            }
        );
        assert_eq!(first.completed, None);
        assert_eq!(held(&engine, 0), ["bun"]);
        assert_eq!(
            lines_since(&engine, setup),
            ["step 1: bun moved from belt to Station A"]
        );

        let mark = engine.log().len();
        let second = progressed(engine.step()?);
        assert_eq!(second.completed, Some(station(0)));
        assert!(second.served);
        assert!(held(&engine, 0).is_empty());
        assert_eq!(engine.stations().customer_at(station(0)), Some("Di"));
        assert_eq!(engine.priority().to_string(), "B, C, A");
        assert_eq!(engine.plated(), 2);
        assert_eq!(
            lines_since(&engine, mark),
            [
                "step 2: patty moved from belt to Station A",
                "step 2: Station A completed the order for Ann",
                "step 2: clearing Station A and the order for Ann",
                "step 2: Station A assigned to Di",
                "step 2: priority is now B, C, A",
            ]
        );

        let mark = engine.log().len();
        let third = progressed(engine.step()?);
        assert_eq!(third.completed, Some(station(1)));
        assert!(!third.served);
        assert_eq!(held(&engine, 1), ["cheese"]);
        assert_eq!(engine.stations().customer_at(station(1)), Some("Bo"));
        assert_eq!(engine.priority().to_string(), "C, A, B");
        assert_eq!(
            lines_since(&engine, mark),
            [
                "step 3: cheese moved from belt to Station B",
                "step 3: Station B completed the order for Bo",
                "step 3: clearing Station B and the order for Bo",
                "step 3: no new customers for Station B",
                "step 3: priority is now C, A, B",
            ]
        );

        assert_eq!(engine.step()?, StepOutcome::BeltExhausted);
        Ok(())
    }

    #[test]
    fn unwanted_ingredient_is_parked_then_drained_when_needed() -> KitchenResult<()> {
        let orders = vec![
            CustomerOrder::new("Ann", ["bun"]),
            CustomerOrder::new("Bo", ["cheese"]),
            CustomerOrder::new("Cy", ["lettuce"]),
            CustomerOrder::new("Di", ["x"]),
        ];
        let mut engine = RoutingEngine::with_belt(orders, belt(&["x", "bun", "y"]))?;

        let parked = progressed(engine.step()?);
        assert_eq!(parked.action, StepAction::Parked { ingredient: "x".into() });
        assert_eq!(engine.reserve().items(), &[Ingredient::from("x")]);

        // bun completes Ann and seats Di, who wants the parked x.
        let served = progressed(engine.step()?);
        assert!(served.served);
        assert_eq!(engine.stations().customer_at(station(0)), Some("Di"));

        // Nobody wants y, so the reserve top goes to Di and y stays on the belt.
        let mark = engine.log().len();
        let drained = progressed(engine.step()?);
        assert_eq!(
            drained.action,
            StepAction::Drained {
                ingredient: "x".into(),
                station: station(0)
            }
        );
        assert!(engine.reserve().is_empty());
        assert_eq!(engine.belt().peek()?.as_str(), "y");
        assert_eq!(
            lines_since(&engine, mark),
            [
                "step 3: x moved from reserve to Station A",
                "step 3: Station A completed the order for Di",
                "step 3: clearing Station A and the order for Di",
                "step 3: no new customers for Station A",
                "step 3: priority is now B, C, A",
            ]
        );

        let parked = progressed(engine.step()?);
        assert_eq!(parked.action, StepAction::Parked { ingredient: "y".into() });
        assert_eq!(engine.step()?, StepOutcome::BeltExhausted);
        Ok(())
    }

    #[test]
    fn unwanted_reserve_top_does_not_block_the_belt() -> KitchenResult<()> {
        let orders = vec![
            CustomerOrder::new("Ann", ["bun", "patty"]),
            CustomerOrder::new("Bo", ["cheese"]),
            CustomerOrder::new("Cy", ["lettuce"]),
        ];
        let mut engine =
            RoutingEngine::with_belt(orders, belt(&["onion", "patty", "onion", "cheese"]))?;

        progressed(engine.step()?);
        let routed = progressed(engine.step()?);
        assert_eq!(routed.action.station(), Some(station(0)));

        let parked = progressed(engine.step()?);
        assert_eq!(parked.action, StepAction::Parked { ingredient: "onion".into() });
        assert_eq!(engine.reserve().items(), belt(&["onion", "onion"]).as_slice());

        let completed = progressed(engine.step()?);
        assert_eq!(completed.completed, Some(station(1)));
        assert_eq!(engine.reserve().len(), 2);
        Ok(())
    }

    #[test]
    fn priority_breaks_ties_between_stations() -> KitchenResult<()> {
        let orders = vec![
            CustomerOrder::new("Ann", ["cheese", "bun"]),
            CustomerOrder::new("Bo", ["cheese"]),
            CustomerOrder::new("Cy", ["cheese"]),
        ];
        let mut engine = RoutingEngine::with_belt(orders, belt(&["cheese", "cheese", "cheese"]))?;

        let first = progressed(engine.step()?);
        assert_eq!(first.action.station(), Some(station(0)));
        let second = progressed(engine.step()?);
        assert_eq!(second.action.station(), Some(station(1)));
        assert_eq!(engine.priority().to_string(), "A, C, B");
        let third = progressed(engine.step()?);
        assert_eq!(third.action.station(), Some(station(2)));
        assert_eq!(engine.priority().to_string(), "A, B, C");
        Ok(())
    }

    #[test]
    fn belt_exhausted_is_idempotent() -> KitchenResult<()> {
        let orders = vec![CustomerOrder::new("Ann", ["bun"])];
        let mut engine = RoutingEngine::with_belt(orders, belt(&["pickle"]))?;
        progressed(engine.step()?);

        let before = engine.snapshot();
        let events = engine.log().len();
        for _ in 0..3 {
            assert_eq!(engine.step()?, StepOutcome::BeltExhausted);
        }
        assert_eq!(engine.snapshot(), before);
        assert_eq!(engine.log().len(), events);
        assert_eq!(engine.steps(), 1);
        Ok(())
    }

    #[test]
    fn oversized_order_completes_when_station_fills() -> KitchenResult<()> {
        let orders = vec![CustomerOrder::new("Ann", ["a", "b", "c", "d"])];
        let mut engine = RoutingEngine::with_belt(orders, belt(&["a", "b", "c", "d"]))?;
        for _ in 0..2 {
            assert_eq!(progressed(engine.step()?).completed, None);
        }
        assert_eq!(progressed(engine.step()?).completed, Some(station(0)));
        // The full station no longer accepts d.
        let last = progressed(engine.step()?);
        assert_eq!(last.action, StepAction::Parked { ingredient: "d".into() });
        assert_eq!(held(&engine, 0), ["a", "b", "c"]);
        Ok(())
    }

    #[test]
    fn shuffled_sessions_keep_routing_invariants() -> KitchenResult<()> {
        let pantry = ["bun", "patty", "cheese", "lettuce", "onion", "pickle", "tomato"];
        for seed in 0..50u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let orders: Vec<CustomerOrder> = (0..8)
                .map(|index| {
                    let size = rng.gen_range(1..=4);
                    let picks: Vec<&str> =
                        pantry.choose_multiple(&mut rng, size).copied().collect();
                    CustomerOrder::new(format!("customer-{index}"), picks)
                })
                .collect();
            let ingredients: Vec<Ingredient> = (0..30)
                .map(|_| Ingredient::from(*pantry.choose(&mut rng).unwrap()))
                .collect();
            let total = ingredients.len();
            let mut engine = RoutingEngine::new(orders, ingredients, &mut rng)?;

            loop {
                let outcome = engine.step()?;

                let mut ids: Vec<usize> = engine.priority().iter().map(|id| id.index()).collect();
                ids.sort_unstable();
                assert_eq!(ids, [0, 1, 2], "seed {seed}");

                for station in engine.stations().iter() {
                    let order = station.order().expect("seated station");
                    assert!(station.held().len() <= STATION_CAPACITY);
                    assert!(station.held().len() <= order.len());
                    assert!(station.held().iter().all(|item| order.requires(item)));
                }

                let held: usize = engine.stations().iter().map(|s| s.held().len()).sum();
                let accounted =
                    engine.belt().len() + engine.reserve().len() + held + engine.plated();
                assert_eq!(accounted, total, "seed {seed}");

                if outcome == StepOutcome::BeltExhausted {
                    break;
                }
            }
        }
        Ok(())
    }
}
