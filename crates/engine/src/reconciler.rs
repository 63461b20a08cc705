//! Fill reconciliation for dispatched pairs.
//!
//! # Overview
//!
//! After both legs are sent, fill status is polled for a fixed number of
//! rounds. Each round waits the poll interval and then queries every leg
//! that is still pending, concurrently. A leg counts as filled once its venue
//! reports no resting order or an explicit fill.
//!
//! ```text
//! PENDING --poll--> PENDING --poll--> ... --both filled--> FILLED
//!    |
//!    +-- attempts exhausted --> cancel + fallback market --> FORCED
//! ```
//!
//! When the attempts run out, every pending leg is cancelled and replaced
//! with a market order on the same side at the other leg's price, accepting
//! slippage to complete the pair. Running out of attempts is therefore not an
//! error.

use std::sync::Arc;

use arbitrager_core::{LoopTimings, OrderExecutor, OrderStatus, Reporter, VenueConfig, VenueSnapshot};
use futures_util::future::join_all;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::error::ArbitragerError;
use crate::executor::{Leg, PairedOrder};

/// How a dispatched pair completed.
#[derive(Debug, Clone, PartialEq)]
pub enum ReconcileOutcome {
    /// Both legs filled within the allowed polling rounds.
    Filled {
        /// Polling rounds used.
        rounds: u32,
    },
    /// Pending legs were cancelled and re-sent as fallback market orders.
    ForcedCompletion {
        rounds: u32,
        forced_legs: Vec<Leg>,
    },
}

impl ReconcileOutcome {
    #[must_use]
    pub fn is_filled(&self) -> bool {
        matches!(self, Self::Filled { .. })
    }

    #[must_use]
    pub fn rounds(&self) -> u32 {
        match self {
            Self::Filled { rounds } | Self::ForcedCompletion { rounds, .. } => *rounds,
        }
    }
}

pub struct FillReconciler {
    executor: Arc<dyn OrderExecutor>,
    fill_check_attempts: u32,
    timings: LoopTimings,
}

impl FillReconciler {
    #[must_use]
    pub fn new(executor: Arc<dyn OrderExecutor>, fill_check_attempts: u32, timings: LoopTimings) -> Self {
        Self {
            executor,
            fill_check_attempts,
            timings,
        }
    }

    /// Polls both legs of `order` until they fill or the attempts run out.
    ///
    /// `snapshots` and `venues` are index-aligned; each polled venue's status
    /// is written to its own snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ArbitragerError::StatusQuery`] if a status poll fails and
    /// [`ArbitragerError::Reconciliation`] if a cancel or fallback order fails.
    pub async fn reconcile(
        &self,
        snapshots: &mut [VenueSnapshot],
        venues: &[VenueConfig],
        order: &PairedOrder,
        reporter: &dyn Reporter,
    ) -> Result<ReconcileOutcome, ArbitragerError> {
        let mut pending: Vec<Leg> = order.legs().to_vec();
        let mut rounds = 0;

        for attempt in 1..=self.fill_check_attempts {
            rounds = attempt;
            reporter.execution(&format!(">> Order check attempt {attempt}"));
            reporter.execution(">> Checking if both legs are done or not...");
            sleep(self.timings.poll_interval).await;

            pending = self.poll_pending(snapshots, venues, &pending, reporter).await?;

            if pending.is_empty() {
                let sell = order.sell_leg();
                let buy = order.buy_leg();
                reporter.execution(">> Both legs are successfully filled.");
                reporter.execution(&format!(">> Sell filled price is {}", sell.price));
                reporter.execution(&format!(">> Buy filled price is {}", buy.price));
                reporter.execution(&format!(">> Profit is {}", order.expected_profit()));
                info!(rounds = attempt, profit = %order.expected_profit(), "Pair filled");

                sleep(self.timings.post_fill_pause).await;
                return Ok(ReconcileOutcome::Filled { rounds: attempt });
            }
        }

        warn!(
            rounds,
            pending = pending.len(),
            "Fill check attempts exhausted, forcing completion"
        );
        sleep(self.timings.cancel_settle).await;

        for leg in &pending {
            self.force_complete(snapshots, venues, order, leg).await?;
        }

        reporter.execution(">> Cancelled order and filled market order.");
        sleep(self.timings.post_fill_pause).await;

        Ok(ReconcileOutcome::ForcedCompletion {
            rounds,
            forced_legs: pending,
        })
    }

    /// Queries every pending leg concurrently and returns those still open.
    async fn poll_pending(
        &self,
        snapshots: &mut [VenueSnapshot],
        venues: &[VenueConfig],
        pending: &[Leg],
        reporter: &dyn Reporter,
    ) -> Result<Vec<Leg>, ArbitragerError> {
        let executor = self.executor.as_ref();
        let checks = snapshots
            .iter_mut()
            .zip(venues)
            .filter_map(move |(slot, venue)| {
                let leg = pending.iter().find(|l| l.venue == slot.venue)?.clone();
                Some(async move {
                    let status = executor.get_status(venue).await;
                    if let Ok(status) = &status {
                        slot.last_order_status = *status;
                    }
                    (leg, status)
                })
            });

        let mut still_pending = Vec::new();
        for (leg, status) in join_all(checks).await {
            let status = status.map_err(|source| ArbitragerError::StatusQuery {
                venue: leg.venue.clone(),
                source,
            })?;

            if status.is_filled() {
                reporter.execution(&format!(
                    ">> Filled: {} {} at {}",
                    leg.venue, leg.side, leg.price
                ));
            } else {
                reporter.execution(&format!(
                    ">> Pending: {} {} at {}",
                    leg.venue, leg.side, leg.price
                ));
                still_pending.push(leg);
            }
        }

        Ok(still_pending)
    }

    /// Cancels a pending leg and replaces it with a fallback market order.
    async fn force_complete(
        &self,
        snapshots: &mut [VenueSnapshot],
        venues: &[VenueConfig],
        order: &PairedOrder,
        leg: &Leg,
    ) -> Result<(), ArbitragerError> {
        let (slot, venue) = snapshots
            .iter_mut()
            .zip(venues)
            .find(|(slot, _)| slot.venue == leg.venue)
            .ok_or_else(|| ArbitragerError::UnknownVenue {
                venue: leg.venue.clone(),
            })?;

        let reconciliation_error = |source: anyhow::Error| ArbitragerError::Reconciliation {
            venue: leg.venue.clone(),
            side: leg.side,
            source,
        };

        self.executor
            .cancel(venue, slot.last_order_id.as_deref())
            .await
            .map_err(reconciliation_error)?;
        debug!(venue = %leg.venue, order_id = ?slot.last_order_id, "Cancelled pending leg");

        sleep(self.timings.cancel_settle).await;

        let price = order.counterpart_price(leg.side);
        let ack = self
            .executor
            .place_fallback_market(venue, price, order.amount(), leg.side)
            .await
            .map_err(reconciliation_error)?;

        info!(
            venue = %leg.venue,
            side = %leg.side,
            price = %price,
            order_id = %ack.order_id,
            "Fallback market order placed"
        );

        slot.last_order_id = Some(ack.order_id);
        slot.last_order_status = OrderStatus::Filled;
        Ok(())
    }
}
