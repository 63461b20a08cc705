//! Errors raised by the control loop.

use arbitrager_core::{Side, VenueId};
use thiserror::Error;

/// Failure of a tick.
///
/// Only [`ArbitragerError::DataFetch`] is recoverable: the tick is abandoned
/// and the next one starts from fresh snapshots. Everything else stops the loop.
#[derive(Debug, Error)]
pub enum ArbitragerError {
    /// Fetching a venue's book or position failed.
    #[error("market data fetch failed for {venue}: {source}")]
    DataFetch {
        /// Venue that failed.
        venue: VenueId,
        /// Collaborator error.
        #[source]
        source: anyhow::Error,
    },

    /// Placing one leg of a pair failed. The other leg was left as is.
    #[error("order dispatch failed for {side} leg on {venue}: {source}")]
    OrderDispatch {
        venue: VenueId,
        side: Side,
        #[source]
        source: anyhow::Error,
    },

    /// Polling fill status failed.
    #[error("order status query failed on {venue}: {source}")]
    StatusQuery {
        venue: VenueId,
        #[source]
        source: anyhow::Error,
    },

    /// Cancelling or re-sending an unfilled leg failed.
    #[error("reconciliation of {side} leg on {venue} failed: {source}")]
    Reconciliation {
        venue: VenueId,
        side: Side,
        #[source]
        source: anyhow::Error,
    },

    /// The ledger refers to something that no longer exists.
    #[error("ledger inconsistency at record {index}: {reason}")]
    LedgerInconsistency {
        /// Ledger index involved.
        index: usize,
        /// What could not be resolved.
        reason: String,
    },

    /// Both legs of a pair would land on one venue.
    #[error("both legs target the same venue: {venue}")]
    SameVenue { venue: VenueId },

    /// A leg names a venue that is not configured.
    #[error("unknown venue: {venue}")]
    UnknownVenue { venue: VenueId },

    /// No venue snapshots to analyse.
    #[error("no venues configured")]
    NoVenues,
}

impl ArbitragerError {
    /// True when the loop may continue with the next tick.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::DataFetch { .. })
    }
}
