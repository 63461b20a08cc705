//! Shared domain types for the cross-venue arbitrager.
//!
//! Venue snapshots are refreshed every tick, analysed into an
//! [`AnalysisResult`], turned into a [`DecisionResult`] by a deal maker,
//! and, once a paired trade completes, recorded as a [`DealRecord`].

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// =============================================================================
// Venue Identity
// =============================================================================

/// Name of a configured trading venue.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VenueId(String);

impl VenueId {
    /// Creates a venue id from any string-like value.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VenueId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VenueId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for VenueId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

// =============================================================================
// Order Side & Status
// =============================================================================

/// Side of a single leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Buy at the venue's ask.
    Buy,
    /// Sell at the venue's bid.
    Sell,
}

impl Side {
    /// Returns the opposite side.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }

    /// Returns the display string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Fill status of the last order placed on a venue.
///
/// `None` means the venue reports no resting order, which counts as filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    None,
    Open,
    Filled,
}

impl OrderStatus {
    /// Returns true when the leg no longer rests on the book.
    #[must_use]
    pub fn is_filled(self) -> bool {
        !matches!(self, Self::Open)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Open => "open",
            Self::Filled => "filled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Acknowledgement returned when an order is accepted by a venue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderAck {
    pub order_id: String,
}

impl OrderAck {
    #[must_use]
    pub fn new(order_id: impl Into<String>) -> Self {
        Self {
            order_id: order_id.into(),
        }
    }
}

// =============================================================================
// Market Data
// =============================================================================

/// Top of book and held position, as returned by a market data collector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketData {
    pub bid: Decimal,
    pub ask: Decimal,
    pub bid_amount: Decimal,
    pub ask_amount: Decimal,
    pub position: Decimal,
}

/// Per-venue state, overwritten in place every tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenueSnapshot {
    pub venue: VenueId,
    pub best_bid: Decimal,
    pub best_ask: Decimal,
    pub bid_amount: Decimal,
    pub ask_amount: Decimal,
    pub position: Decimal,
    pub last_order_id: Option<String>,
    pub last_order_status: OrderStatus,
}

impl VenueSnapshot {
    /// Creates an empty snapshot for a venue that has not been fetched yet.
    #[must_use]
    pub fn new(venue: VenueId) -> Self {
        Self {
            venue,
            best_bid: Decimal::ZERO,
            best_ask: Decimal::ZERO,
            bid_amount: Decimal::ZERO,
            ask_amount: Decimal::ZERO,
            position: Decimal::ZERO,
            last_order_id: None,
            last_order_status: OrderStatus::None,
        }
    }

    /// Builder used mostly by tests to set the book directly.
    #[must_use]
    pub fn with_book(
        mut self,
        best_bid: Decimal,
        best_ask: Decimal,
        bid_amount: Decimal,
        ask_amount: Decimal,
    ) -> Self {
        self.best_bid = best_bid;
        self.best_ask = best_ask;
        self.bid_amount = bid_amount;
        self.ask_amount = ask_amount;
        self
    }

    /// Overwrites book and position with freshly fetched data.
    pub fn apply_market_data(&mut self, data: &MarketData) {
        self.best_bid = data.bid;
        self.best_ask = data.ask;
        self.bid_amount = data.bid_amount;
        self.ask_amount = data.ask_amount;
        self.position = data.position;
    }

    /// Remembers an accepted order; it is considered open until polled.
    pub fn record_order(&mut self, ack: &OrderAck) {
        self.last_order_id = Some(ack.order_id.clone());
        self.last_order_status = OrderStatus::Open;
    }
}

// =============================================================================
// Analysis & Decisions
// =============================================================================

/// Best cross-venue bid/ask pair for one tick.
///
/// Always fully populated, even when the spread is not positive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub bid_venue: VenueId,
    pub best_bid: Decimal,
    pub ask_venue: VenueId,
    pub best_ask: Decimal,
    /// Executable amount tracked while scanning the venues.
    pub available_amount: Decimal,
    /// Amount the profit figures are computed on.
    pub trade_amount: Decimal,
    pub spread: Decimal,
    pub profit: Decimal,
    pub profit_rate: Decimal,
}

impl AnalysisResult {
    /// True when both extremes sit on the same venue.
    #[must_use]
    pub fn is_same_venue(&self) -> bool {
        self.bid_venue == self.ask_venue
    }
}

/// Why a deal maker did or did not act.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionReason {
    SufficientProfit,
    InsufficientProfit,
    InsufficientAmount,
    SameVenue,
    ExitThresholdReached,
}

impl DecisionReason {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SufficientProfit => "sufficient profit",
            Self::InsufficientProfit => "insufficient profit",
            Self::InsufficientAmount => "insufficient amount",
            Self::SameVenue => "same venue",
            Self::ExitThresholdReached => "exit threshold reached",
        }
    }
}

impl std::fmt::Display for DecisionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of an open or close decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionResult {
    pub reason: Option<DecisionReason>,
    pub message: String,
    /// Targeted ledger record, set for closes.
    pub ledger_index: Option<usize>,
    pub profit: Option<Decimal>,
    pub profit_rate: Option<Decimal>,
}

impl DecisionResult {
    #[must_use]
    pub fn new(reason: Option<DecisionReason>, message: impl Into<String>) -> Self {
        Self {
            reason,
            message: message.into(),
            ledger_index: None,
            profit: None,
            profit_rate: None,
        }
    }

    /// A decision that takes no action.
    #[must_use]
    pub fn none(message: impl Into<String>) -> Self {
        Self::new(None, message)
    }

    #[must_use]
    pub fn with_ledger_index(mut self, index: usize) -> Self {
        self.ledger_index = Some(index);
        self
    }

    #[must_use]
    pub fn with_profit(mut self, profit: Decimal, profit_rate: Option<Decimal>) -> Self {
        self.profit = Some(profit);
        self.profit_rate = profit_rate;
        self
    }

    #[must_use]
    pub fn is(&self, reason: DecisionReason) -> bool {
        self.reason == Some(reason)
    }
}

// =============================================================================
// Deal Records
// =============================================================================

/// An open paired position: sold on `bid_venue`, bought on `ask_venue`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealRecord {
    pub bid_venue: VenueId,
    pub ask_venue: VenueId,
    pub amount: Decimal,
    pub profit: Decimal,
    pub profit_rate: Decimal,
    pub opened_at: DateTime<Utc>,
}

impl DealRecord {
    /// Builds the record for a completed open from the analysis that drove it.
    #[must_use]
    pub fn from_analysis(analysis: &AnalysisResult) -> Self {
        Self {
            bid_venue: analysis.bid_venue.clone(),
            ask_venue: analysis.ask_venue.clone(),
            amount: analysis.trade_amount,
            profit: analysis.profit,
            profit_rate: analysis.profit_rate,
            opened_at: Utc::now(),
        }
    }
}
