//! Cross-venue spread analysis.
//!
//! # Overview
//!
//! A single pass over the venue snapshots finds the highest bid and the
//! lowest ask. Profit is computed for the configured trade amount:
//!
//! ```text
//! spread      = best_bid - best_ask
//! profit      = floor(spread * amount)
//! profit_rate = floor(100 * profit / (best_ask * amount), 3 dp)
//! ```
//!
//! The result is returned even when the spread is negative; deciding whether
//! it is worth trading is left to the deal maker.
//!
//! # Example
//!
//! ```ignore
//! use arbitrager_engine::analyzer::analyze;
//!
//! let analysis = analyze(&snapshots, dec!(0.01)).expect("at least one venue");
//! info!(spread = %analysis.spread, profit = %analysis.profit, "analysed");
//! ```

use arbitrager_core::{AnalysisResult, VenueSnapshot};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// Finds the best bid/ask pair across `snapshots`.
///
/// Returns `None` only when there are no snapshots.
///
/// Extremes and the available amount are seeded from the first snapshot,
/// using the smaller of its two leg amounts. Every strictly better bid or
/// ask then raises the available amount to the larger of the tracked amount
/// and the new leg's amount. Ties keep the venue seen first.
#[must_use]
pub fn analyze(snapshots: &[VenueSnapshot], target_amount: Decimal) -> Option<AnalysisResult> {
    let (first, rest) = snapshots.split_first()?;

    let mut bid_venue = &first.venue;
    let mut best_bid = first.best_bid;
    let mut ask_venue = &first.venue;
    let mut best_ask = first.best_ask;
    let mut available_amount = first.bid_amount.min(first.ask_amount);

    for snapshot in rest {
        if snapshot.best_bid > best_bid {
            bid_venue = &snapshot.venue;
            best_bid = snapshot.best_bid;
            available_amount = available_amount.max(snapshot.bid_amount);
        }

        if snapshot.best_ask < best_ask {
            ask_venue = &snapshot.venue;
            best_ask = snapshot.best_ask;
            available_amount = available_amount.max(snapshot.ask_amount);
        }
    }

    let spread = best_bid - best_ask;
    let (profit, profit_rate) = pair_profit(best_bid, best_ask, target_amount);

    Some(AnalysisResult {
        bid_venue: bid_venue.clone(),
        best_bid,
        ask_venue: ask_venue.clone(),
        best_ask,
        available_amount,
        trade_amount: target_amount,
        spread,
        profit,
        profit_rate,
    })
}

/// Profit and profit rate of selling at `bid` and buying at `ask`.
///
/// A zero ask-side notional gives a zero rate.
#[must_use]
pub fn pair_profit(bid: Decimal, ask: Decimal, amount: Decimal) -> (Decimal, Decimal) {
    let profit = ((bid - ask) * amount).floor();
    let notional = ask * amount;
    let profit_rate = (dec!(100) * profit)
        .checked_div(notional)
        .map_or(Decimal::ZERO, |rate| {
            rate.round_dp_with_strategy(3, RoundingStrategy::ToNegativeInfinity)
        });

    (profit, profit_rate)
}
