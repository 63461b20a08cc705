//! Close-candidate evaluation for open paired positions.
//!
//! A record is exited by reversing its roles: the venue it originally
//! bought on now sells at its bid, and the venue it sold on now buys back at
//! its ask.

use arbitrager_core::{DealMaker, DealRecord, DecisionResult, VenueId, VenueSnapshot};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analyzer::pair_profit;
use crate::error::ArbitragerError;
use crate::ledger::DealLedger;

/// Instruction to close the ledger record at `ledger_index`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloseDirective {
    pub ledger_index: usize,
    /// Venue that sells on exit.
    pub bid_venue: VenueId,
    pub best_bid: Decimal,
    /// Venue that buys back on exit.
    pub ask_venue: VenueId,
    pub best_ask: Decimal,
    pub amount: Decimal,
    /// Close profit at the current prices, usually negative.
    pub profit: Decimal,
    pub decision: DecisionResult,
}

/// Picks at most one ledger record to close this tick.
///
/// Records are scanned in order. A record is evaluated when there is no
/// candidate yet, or when the current candidate's close profit is below that
/// record's entry profit; the last evaluated record is the candidate. It
/// becomes a directive only if the deal maker returns a reason.
///
/// # Errors
///
/// Returns [`ArbitragerError::LedgerInconsistency`] when a record names a venue
/// that has no snapshot.
pub fn evaluate_closing(
    snapshots: &[VenueSnapshot],
    ledger: &DealLedger,
    deal_maker: &dyn DealMaker,
    exit_profit_rate: Decimal,
) -> Result<Option<CloseDirective>, ArbitragerError> {
    let mut candidate: Option<CloseDirective> = None;

    for (index, record) in ledger.iter().enumerate() {
        if let Some(current) = &candidate {
            if current.profit >= record.profit {
                debug!(index, "skipping close evaluation");
                continue;
            }
        }

        let (exit_bid, exit_ask) = exit_prices(snapshots, index, record)?;
        let (profit, _) = pair_profit(exit_bid, exit_ask, record.amount);
        let decision = deal_maker
            .confirm_closing(profit, record.profit, exit_profit_rate)
            .with_ledger_index(index);

        debug!(
            index,
            close_profit = %profit,
            entry_profit = %record.profit,
            reason = ?decision.reason,
            "evaluated close candidate"
        );

        candidate = Some(CloseDirective {
            ledger_index: index,
            bid_venue: record.ask_venue.clone(),
            best_bid: exit_bid,
            ask_venue: record.bid_venue.clone(),
            best_ask: exit_ask,
            amount: record.amount,
            profit,
            decision,
        });
    }

    Ok(candidate.filter(|c| c.decision.reason.is_some()))
}

/// Current (bid, ask) for exiting `record`.
fn exit_prices(
    snapshots: &[VenueSnapshot],
    index: usize,
    record: &DealRecord,
) -> Result<(Decimal, Decimal), ArbitragerError> {
    let find = |venue: &VenueId| {
        snapshots
            .iter()
            .find(|s| &s.venue == venue)
            .ok_or_else(|| ArbitragerError::LedgerInconsistency {
                index,
                reason: format!("no snapshot for venue {venue}"),
            })
    };

    let exit_bid = find(&record.ask_venue)?.best_bid;
    let exit_ask = find(&record.bid_venue)?.best_ask;
    Ok((exit_bid, exit_ask))
}
