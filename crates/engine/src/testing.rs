//! Scripted collaborators shared by the unit and integration tests.
//!
//! Depends only on `arbitrager_core` so `tests/common` can include it by path.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{anyhow, Result};
use arbitrager_core::{
    AnalysisResult, DealRecord, DecisionResult, OrderAck, OrderExecutor, OrderStatus, Reporter,
    Side, VenueConfig, VenueId, VenueSnapshot,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use tokio::time::Instant;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Place {
        venue: VenueId,
        side: Side,
        price: Decimal,
        amount: Decimal,
    },
    Status {
        venue: VenueId,
    },
    Cancel {
        venue: VenueId,
        order_id: Option<String>,
    },
    Fallback {
        venue: VenueId,
        side: Side,
        price: Decimal,
        amount: Decimal,
    },
}

impl Call {
    fn venue(&self) -> &VenueId {
        match self {
            Self::Place { venue, .. }
            | Self::Status { venue }
            | Self::Cancel { venue, .. }
            | Self::Fallback { venue, .. } => venue,
        }
    }
}

/// Order executor with scripted fill statuses.
///
/// Status scripts are consumed front to back; the last entry repeats. Venues
/// without a script report `Filled`. Every call is stamped with the tokio
/// clock, so paused-time tests can check when it happened.
#[derive(Default)]
pub struct MockOrderExecutor {
    calls: Mutex<Vec<(Instant, Call)>>,
    statuses: Mutex<HashMap<VenueId, VecDeque<OrderStatus>>>,
    failing: HashSet<VenueId>,
    next_id: AtomicU64,
}

impl MockOrderExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_placement(mut self, venue: &str) -> Self {
        self.failing.insert(venue.into());
        self
    }

    pub fn with_statuses(self, venue: &str, statuses: Vec<OrderStatus>) -> Self {
        self.statuses
            .lock()
            .insert(venue.into(), statuses.into_iter().collect());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().iter().map(|(_, call)| call.clone()).collect()
    }

    /// Calls paired with how long after `start` they were made.
    pub fn calls_since(&self, start: Instant) -> Vec<(std::time::Duration, Call)> {
        self.calls
            .lock()
            .iter()
            .map(|(at, call)| (at.duration_since(start), call.clone()))
            .collect()
    }

    pub fn calls_for(&self, venue: &str) -> Vec<Call> {
        let venue = VenueId::from(venue);
        self.calls()
            .into_iter()
            .filter(|c| c.venue() == &venue)
            .collect()
    }

    pub fn placed(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Place { .. }))
            .collect()
    }

    pub fn status_queries(&self, venue: &str) -> usize {
        self.calls_for(venue)
            .iter()
            .filter(|c| matches!(c, Call::Status { .. }))
            .count()
    }

    pub fn total_status_queries(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Status { .. }))
            .count()
    }

    pub fn cancels(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Cancel { .. }))
            .count()
    }

    pub fn fallbacks(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Fallback { .. }))
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().push((Instant::now(), call));
    }

    fn ack(&self, venue: &VenueId) -> OrderAck {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        OrderAck::new(format!("{venue}-{id}"))
    }
}

#[async_trait]
impl OrderExecutor for MockOrderExecutor {
    async fn place_market(
        &self,
        venue: &VenueConfig,
        price: Decimal,
        amount: Decimal,
        side: Side,
    ) -> Result<OrderAck> {
        self.record(Call::Place {
            venue: venue.name.clone(),
            side,
            price,
            amount,
        });
        if self.failing.contains(&venue.name) {
            return Err(anyhow!("order rejected by {}", venue.name));
        }
        Ok(self.ack(&venue.name))
    }

    async fn get_status(&self, venue: &VenueConfig) -> Result<OrderStatus> {
        self.record(Call::Status {
            venue: venue.name.clone(),
        });
        let mut statuses = self.statuses.lock();
        let status = match statuses.get_mut(&venue.name) {
            Some(script) if script.len() > 1 => script.pop_front().unwrap_or(OrderStatus::Filled),
            Some(script) => script.front().copied().unwrap_or(OrderStatus::Filled),
            None => OrderStatus::Filled,
        };
        Ok(status)
    }

    async fn cancel(&self, venue: &VenueConfig, order_id: Option<&str>) -> Result<()> {
        self.record(Call::Cancel {
            venue: venue.name.clone(),
            order_id: order_id.map(str::to_string),
        });
        Ok(())
    }

    async fn place_fallback_market(
        &self,
        venue: &VenueConfig,
        price: Decimal,
        amount: Decimal,
        side: Side,
    ) -> Result<OrderAck> {
        self.record(Call::Fallback {
            venue: venue.name.clone(),
            side,
            price,
            amount,
        });
        Ok(self.ack(&venue.name))
    }
}

/// Reporter that discards everything.
pub struct NullReporter;

impl Reporter for NullReporter {
    fn lifecycle(&self, _message: &str) {}

    fn ledger(&self, _records: &[DealRecord]) {}

    fn positions(&self, _snapshots: &[VenueSnapshot]) {}

    fn board(&self, _target: Decimal, _analysis: &AnalysisResult, _decision: &DecisionResult) {}

    fn execution(&self, _message: &str) {}
}
