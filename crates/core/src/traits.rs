use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::config::{ArbitragerConfig, VenueConfig};
use crate::types::{
    AnalysisResult, DealRecord, DecisionResult, MarketData, OrderAck, OrderStatus, Side,
    VenueSnapshot,
};

/// Fetches a venue's top of book and held position.
#[async_trait]
pub trait MarketDataCollector: Send + Sync {
    async fn fetch(&self, venue: &VenueConfig) -> Result<MarketData>;
}

/// Order primitives of a venue.
#[async_trait]
pub trait OrderExecutor: Send + Sync {
    /// Places a market order and returns the venue's order id.
    async fn place_market(
        &self,
        venue: &VenueConfig,
        price: Decimal,
        amount: Decimal,
        side: Side,
    ) -> Result<OrderAck>;

    /// Status of the last order on the venue; `OrderStatus::None` when nothing rests.
    async fn get_status(&self, venue: &VenueConfig) -> Result<OrderStatus>;

    async fn cancel(&self, venue: &VenueConfig, order_id: Option<&str>) -> Result<()>;

    /// Market order sent after cancelling a leg that never filled.
    async fn place_fallback_market(
        &self,
        venue: &VenueConfig,
        price: Decimal,
        amount: Decimal,
        side: Side,
    ) -> Result<OrderAck>;
}

/// Threshold logic that turns analyses into open and close decisions.
pub trait DealMaker: Send + Sync {
    fn decide(&self, config: &ArbitragerConfig, analysis: &AnalysisResult) -> DecisionResult;

    fn confirm_closing(
        &self,
        candidate_profit: Decimal,
        open_profit: Decimal,
        exit_profit_rate: Decimal,
    ) -> DecisionResult;
}

/// Human-readable output of the control loop.
pub trait Reporter: Send + Sync {
    fn lifecycle(&self, message: &str);

    fn ledger(&self, records: &[DealRecord]);

    fn positions(&self, snapshots: &[VenueSnapshot]);

    fn board(&self, target_amount: Decimal, analysis: &AnalysisResult, decision: &DecisionResult);

    fn execution(&self, message: &str);
}
