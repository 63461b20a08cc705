//! Concurrent two-leg order dispatch.
//!
//! # Overview
//!
//! Every paired trade sells at the bid venue and buys at the ask venue for
//! the same amount. Both legs are submitted at once as a fork-join over the
//! venue slots. Each worker writes only its own [`VenueSnapshot`], and the
//! dispatcher returns only after every worker has finished.
//!
//! A failed leg does not cancel or unwind the other one; the failure is
//! reported after both legs have completed.
//!
//! # Example
//!
//! ```ignore
//! use arbitrager_engine::executor::{Execution, OrderDispatcher};
//!
//! let order = Execution::Open(analysis).paired_order()?;
//! let dispatcher = OrderDispatcher::new(executor, timings.settle_delay);
//! dispatcher.dispatch(&mut snapshots, &config.venues, &order, reporter).await?;
//! ```

use std::sync::Arc;
use std::time::Duration;

use arbitrager_core::{
    AnalysisResult, OrderExecutor, Reporter, Side, VenueConfig, VenueId, VenueSnapshot,
};
use futures_util::future::join_all;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::closing::CloseDirective;
use crate::error::ArbitragerError;

// =============================================================================
// Paired Orders
// =============================================================================

/// One side of a paired trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leg {
    pub venue: VenueId,
    pub side: Side,
    pub price: Decimal,
}

/// A sell on one venue matched with a buy on another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairedOrder {
    bid_venue: VenueId,
    bid_price: Decimal,
    ask_venue: VenueId,
    ask_price: Decimal,
    amount: Decimal,
    expected_profit: Decimal,
}

impl PairedOrder {
    /// Creates a pair that sells on `bid_venue` and buys on `ask_venue`.
    ///
    /// # Errors
    ///
    /// Returns [`ArbitragerError::SameVenue`] if both legs name one venue.
    pub fn new(
        bid_venue: VenueId,
        bid_price: Decimal,
        ask_venue: VenueId,
        ask_price: Decimal,
        amount: Decimal,
        expected_profit: Decimal,
    ) -> Result<Self, ArbitragerError> {
        if bid_venue == ask_venue {
            return Err(ArbitragerError::SameVenue { venue: bid_venue });
        }

        Ok(Self {
            bid_venue,
            bid_price,
            ask_venue,
            ask_price,
            amount,
            expected_profit,
        })
    }

    #[must_use]
    pub fn sell_leg(&self) -> Leg {
        Leg {
            venue: self.bid_venue.clone(),
            side: Side::Sell,
            price: self.bid_price,
        }
    }

    #[must_use]
    pub fn buy_leg(&self) -> Leg {
        Leg {
            venue: self.ask_venue.clone(),
            side: Side::Buy,
            price: self.ask_price,
        }
    }

    /// Both legs, sell first.
    #[must_use]
    pub fn legs(&self) -> [Leg; 2] {
        [self.sell_leg(), self.buy_leg()]
    }

    /// The leg placed on `venue`, if any.
    #[must_use]
    pub fn leg_for(&self, venue: &VenueId) -> Option<Leg> {
        if venue == &self.bid_venue {
            Some(self.sell_leg())
        } else if venue == &self.ask_venue {
            Some(self.buy_leg())
        } else {
            None
        }
    }

    /// Price observed on the other leg; used for fallback orders.
    #[must_use]
    pub fn counterpart_price(&self, side: Side) -> Decimal {
        match side {
            Side::Sell => self.ask_price,
            Side::Buy => self.bid_price,
        }
    }

    #[must_use]
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    #[must_use]
    pub fn expected_profit(&self) -> Decimal {
        self.expected_profit
    }
}

/// The single action chosen for a tick.
#[derive(Debug, Clone, PartialEq)]
pub enum Execution {
    /// Open a new position from a fresh analysis.
    Open(AnalysisResult),
    /// Close the ledger record named by the directive.
    Close(CloseDirective),
}

impl Execution {
    /// Builds the paired order; closes trade the record's entry amount.
    ///
    /// # Errors
    ///
    /// Returns [`ArbitragerError::SameVenue`] if both legs name one venue.
    pub fn paired_order(&self) -> Result<PairedOrder, ArbitragerError> {
        match self {
            Self::Open(analysis) => PairedOrder::new(
                analysis.bid_venue.clone(),
                analysis.best_bid,
                analysis.ask_venue.clone(),
                analysis.best_ask,
                analysis.trade_amount,
                analysis.profit,
            ),
            Self::Close(directive) => PairedOrder::new(
                directive.bid_venue.clone(),
                directive.best_bid,
                directive.ask_venue.clone(),
                directive.best_ask,
                directive.amount,
                directive.profit,
            ),
        }
    }

    #[must_use]
    pub fn ledger_index(&self) -> Option<usize> {
        match self {
            Self::Open(_) => None,
            Self::Close(directive) => Some(directive.ledger_index),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open(_) => "open",
            Self::Close(_) => "close",
        }
    }
}

// =============================================================================
// Dispatcher
// =============================================================================

/// Sends both legs of a [`PairedOrder`].
pub struct OrderDispatcher {
    executor: Arc<dyn OrderExecutor>,
    settle_delay: Duration,
}

impl OrderDispatcher {
    #[must_use]
    pub fn new(executor: Arc<dyn OrderExecutor>, settle_delay: Duration) -> Self {
        Self {
            executor,
            settle_delay,
        }
    }

    /// Waits the settle delay, then places both legs concurrently.
    ///
    /// `snapshots` and `venues` are index-aligned. Accepted orders are
    /// recorded in their venue's snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ArbitragerError::UnknownVenue`] before sending anything if a
    /// leg names an unconfigured venue, or [`ArbitragerError::OrderDispatch`]
    /// for the first leg that failed once both have completed.
    pub async fn dispatch(
        &self,
        snapshots: &mut [VenueSnapshot],
        venues: &[VenueConfig],
        order: &PairedOrder,
        reporter: &dyn Reporter,
    ) -> Result<(), ArbitragerError> {
        for leg in order.legs() {
            if !snapshots.iter().any(|s| s.venue == leg.venue) {
                return Err(ArbitragerError::UnknownVenue { venue: leg.venue });
            }
        }

        let sell = order.sell_leg();
        let buy = order.buy_leg();
        reporter.execution(&format!(
            ">> Sending order targeting {} Bid {}",
            sell.venue, sell.price
        ));
        reporter.execution(&format!(
            ">> Sending order targeting {} Ask {}",
            buy.venue, buy.price
        ));

        tokio::time::sleep(self.settle_delay).await;

        let executor = self.executor.as_ref();
        let amount = order.amount();
        let workers = snapshots
            .iter_mut()
            .zip(venues)
            .filter_map(move |(slot, venue)| {
                let leg = order.leg_for(&slot.venue)?;
                Some(async move {
                    let result = executor
                        .place_market(venue, leg.price, amount, leg.side)
                        .await;
                    if let Ok(ack) = &result {
                        slot.record_order(ack);
                    }
                    (leg, result)
                })
            });

        let outcomes = join_all(workers).await;

        let mut failure = None;
        for (leg, result) in outcomes {
            match result {
                Ok(ack) => {
                    info!(
                        venue = %leg.venue,
                        side = %leg.side,
                        price = %leg.price,
                        amount = %amount,
                        order_id = %ack.order_id,
                        "Order placed"
                    );
                }
                Err(source) => {
                    error!(
                        venue = %leg.venue,
                        side = %leg.side,
                        error = %source,
                        "Order placement failed"
                    );
                    if failure.is_none() {
                        failure = Some(ArbitragerError::OrderDispatch {
                            venue: leg.venue,
                            side: leg.side,
                            source,
                        });
                    }
                }
            }
        }

        failure.map_or(Ok(()), Err)
    }
}
