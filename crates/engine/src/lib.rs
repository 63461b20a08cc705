//! Cross-venue arbitrage engine.
//!
//! This crate watches the same instrument on several venues, finds the best
//! bid/ask pair across them, and trades the spread by selling on one venue
//! and buying on another at the same time.
//!
//! # Overview
//!
//! ```text
//! Venue A:  bid 5,001,000   ask 5,002,000
//! Venue B:  bid 4,999,000   ask 5,000,000
//!
//! Sell 0.01 on A @ 5,001,000
//! Buy  0.01 on B @ 5,000,000
//! Expected profit: 10 (0.020%)
//! ```
//!
//! Open pairs are kept in a [`DealLedger`] and closed later by reversing the
//! legs once enough of the entry profit can be locked in.
//!
//! # Modules
//!
//! - [`analyzer`]: best bid/ask pair and profit across venues
//! - [`closing`]: choose an open position to close
//! - [`deal_maker`]: threshold-based open/close decisions
//! - [`executor`]: concurrent two-leg order dispatch
//! - [`reconciler`]: fill polling and forced completion of unfilled legs
//! - [`ledger`]: open paired positions
//! - [`arbitrager`]: the control loop tying it together
//! - [`reporter`]: human-readable log lines
//!
//! # Limitations
//!
//! Open positions live only in memory and are lost on restart. A failed leg
//! is not unwound, and shutdown does not wait for in-flight orders.

pub mod analyzer;
pub mod arbitrager;
pub mod closing;
pub mod deal_maker;
pub mod error;
pub mod executor;
pub mod ledger;
pub mod reconciler;
pub mod reporter;

#[cfg(test)]
mod testing;

pub use analyzer::{analyze, pair_profit};
pub use arbitrager::{Arbitrager, TickOutcome};
pub use closing::{evaluate_closing, CloseDirective};
pub use deal_maker::ThresholdDealMaker;
pub use error::ArbitragerError;
pub use executor::{Execution, Leg, OrderDispatcher, PairedOrder};
pub use ledger::DealLedger;
pub use reconciler::{FillReconciler, ReconcileOutcome};
pub use reporter::TracingReporter;
