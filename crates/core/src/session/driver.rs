#![allow(missing_docs)]

use std::fmt;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    engine::{RoutingEngine, StepOutcome, StepReport},
    error::{KitchenError, KitchenResult},
    journal::{EventKind, LogSink},
};

/// Served customers after which a session ends by default.
pub const DEFAULT_SERVED_TARGET: usize = 5;

/// External per-turn signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Run one routing step.
    Continue,
    /// End the session now.
    Stop,
}

impl From<bool> for Advance {
    fn from(proceed: bool) -> Self {
        if proceed {
            Advance::Continue
        } else {
            Advance::Stop
        }
    }
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    BeltExhausted,
    TargetReached,
    Stopped,
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndReason::BeltExhausted => f.write_str("belt exhausted"),
            EndReason::TargetReached => f.write_str("served target reached"),
            EndReason::Stopped => f.write_str("stopped"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Running,
    Ended(EndReason),
}

/// Final numbers handed back once the journal is flushed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub reason: EndReason,
    pub served: usize,
    pub steps: u64,
    pub events: usize,
}

/// Drives a routing engine from advance signals and counts served customers.
#[derive(Debug)]
pub struct Session {
    engine: RoutingEngine,
    served: usize,
    target: usize,
    status: SessionStatus,
    last_report: Option<StepReport>,
    flushed: bool,
}

impl Session {
    /// Wrap `engine`; a `target` of zero is treated as one.
    pub fn new(engine: RoutingEngine, target: usize) -> Self {
        Self {
            engine,
            served: 0,
            target: target.max(1),
            status: SessionStatus::Running,
            last_report: None,
            flushed: false,
        }
    }

    pub fn engine(&self) -> &RoutingEngine {
        &self.engine
    }

    pub fn served(&self) -> usize {
        self.served
    }

    pub fn target(&self) -> usize {
        self.target
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == SessionStatus::Running
    }

    /// Report of the most recent progressed step.
    pub fn last_report(&self) -> Option<&StepReport> {
        self.last_report.as_ref()
    }

    /// Apply one signal. Signals after the end leave the session untouched.
    pub fn advance(&mut self, signal: Advance) -> KitchenResult<SessionStatus> {
        if !self.is_running() {
            return Ok(self.status);
        }
        match signal {
            Advance::Stop => self.end(EndReason::Stopped),
            Advance::Continue => match self.engine.step()? {
                StepOutcome::BeltExhausted => self.end(EndReason::BeltExhausted),
                StepOutcome::Progressed(report) => {
                    if report.served {
                        self.served += 1;
                    }
                    self.last_report = Some(report);
                    if self.served >= self.target {
                        self.end(EndReason::TargetReached);
                    }
                }
            },
        }
        Ok(self.status)
    }

    /// Feed signals until they run out or the session ends.
    pub fn run<I>(&mut self, signals: I) -> KitchenResult<SessionStatus>
    where
        I: IntoIterator<Item = Advance>,
    {
        for signal in signals {
            if self.advance(signal)? != SessionStatus::Running {
                break;
            }
        }
        Ok(self.status)
    }

    /// End the session if still running and flush the journal to `sink`.
    pub fn finish(&mut self, sink: &mut dyn LogSink) -> Result<SessionSummary> {
        if self.flushed {
            return Err(KitchenError::SessionFinished.into());
        }
        if self.is_running() {
            self.end(EndReason::Stopped);
        }
        let reason = match self.status {
            SessionStatus::Ended(reason) => reason,
            SessionStatus::Running => EndReason::Stopped,
        };
        sink.write_events(self.engine.log().events())?;
        self.flushed = true;
        Ok(SessionSummary {
            reason,
            served: self.served,
            steps: self.engine.steps(),
            events: self.engine.log().len(),
        })
    }

    fn end(&mut self, reason: EndReason) {
        self.status = SessionStatus::Ended(reason);
        info!(%reason, served = self.served, steps = self.engine.steps(), "session ended");
        self.engine.record(EventKind::SessionEnded {
            reason,
            served: self.served,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{journal::MemoryLogSink, models::CustomerOrder};

    fn order(name: &str, items: &[&str]) -> CustomerOrder {
        CustomerOrder::new(name, items.iter().copied())
    }

    fn engine(orders: Vec<CustomerOrder>, belt: &[&str]) -> RoutingEngine {
        let belt = belt.iter().map(|token| (*token).into()).collect();
        RoutingEngine::with_belt(orders, belt).unwrap()
    }

    #[test]
    fn ends_when_served_target_is_reached() -> Result<()> {
        let customers = ["Ann", "Bo", "Cy", "Di", "Ed"]
            .into_iter()
            .map(|name| order(name, &["bun"]))
            .collect();
        let mut session = Session::new(engine(customers, &["bun"; 6]), 2);

        assert_eq!(session.advance(Advance::Continue)?, SessionStatus::Running);
        assert_eq!(session.served(), 1);
        assert_eq!(
            session.advance(Advance::Continue)?,
            SessionStatus::Ended(EndReason::TargetReached)
        );
        assert_eq!(session.served(), 2);

        // No further steps run after the end.
        let steps = session.engine().steps();
        session.advance(Advance::Continue)?;
        assert_eq!(session.engine().steps(), steps);
        Ok(())
    }

    #[test]
    fn ends_when_belt_is_exhausted() -> Result<()> {
        let mut session = Session::new(engine(vec![order("Ann", &["bun", "patty"])], &["bun"]), 5);
        let status = session.run(std::iter::repeat(Advance::Continue).take(10))?;
        assert_eq!(status, SessionStatus::Ended(EndReason::BeltExhausted));
        assert_eq!(session.engine().steps(), 1);
        assert_eq!(session.served(), 0);
        Ok(())
    }

    #[test]
    fn empty_line_at_turnover_leaves_served_count_unchanged() -> Result<()> {
        let mut session = Session::new(engine(vec![order("Ann", &["bun"])], &["bun", "pickle"]), 5);
        session.advance(Advance::Continue)?;

        let report = session.last_report().cloned().unwrap();
        assert!(report.completed.is_some());
        assert!(!report.served);
        assert_eq!(session.served(), 0);
        assert!(session.is_running());
        Ok(())
    }

    #[test]
    fn stop_signal_ends_without_stepping_and_flushes_log() -> Result<()> {
        let mut session = Session::new(engine(vec![order("Ann", &["bun"])], &["bun"]), 5);
        assert_eq!(
            session.advance(false.into())?,
            SessionStatus::Ended(EndReason::Stopped)
        );
        assert_eq!(session.engine().steps(), 0);

        let mut sink = MemoryLogSink::default();
        let summary = session.finish(&mut sink)?;
        assert_eq!(summary.reason, EndReason::Stopped);
        assert_eq!(summary.events, sink.events.len());
        assert_eq!(
            sink.events.last().map(ToString::to_string).as_deref(),
            Some("step 0: session ended (stopped) with 0 customers served")
        );
        Ok(())
    }

    #[test]
    fn finish_stops_a_running_session_and_refuses_a_second_flush() -> Result<()> {
        let mut session = Session::new(engine(vec![order("Ann", &["bun"])], &["x", "bun"]), 5);
        session.advance(Advance::Continue)?;

        let mut sink = MemoryLogSink::default();
        let summary = session.finish(&mut sink)?;
        assert_eq!(summary.reason, EndReason::Stopped);
        assert_eq!(summary.steps, 1);

        let err = session.finish(&mut sink).unwrap_err();
        assert_eq!(
            err.downcast_ref::<KitchenError>(),
            Some(&KitchenError::SessionFinished)
        );
        assert_eq!(sink.events.len(), summary.events);
        Ok(())
    }

    #[test]
    fn zero_target_is_clamped_to_one() {
        let session = Session::new(engine(vec![order("Ann", &["bun"])], &["bun"]), 0);
        assert_eq!(session.target(), 1);
    }
}
