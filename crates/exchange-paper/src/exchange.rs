use std::collections::HashMap;

use anyhow::{anyhow, Result};
use arbitrager_core::{
    ArbitragerConfig, MarketData, MarketDataCollector, OrderAck, OrderExecutor, OrderStatus, Side,
    VenueConfig, VenueId,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::venue::PaperVenue;

/// Simulated venues serving both market data and order execution.
///
/// Each venue keeps its own book, position, and RNG behind a mutex, so
/// concurrent fetches or orders on different venues never contend.
pub struct PaperExchange {
    venues: HashMap<VenueId, Mutex<PaperVenue>>,
}

impl PaperExchange {
    #[must_use]
    pub fn new(venues: &[VenueConfig]) -> Self {
        let venues = venues
            .iter()
            .map(|venue| {
                debug!(
                    venue = %venue.name,
                    mid_price = %venue.paper.mid_price,
                    seed = ?venue.paper.seed,
                    "Paper venue ready"
                );
                (
                    venue.name.clone(),
                    Mutex::new(PaperVenue::new(venue.name.clone(), venue.paper.clone())),
                )
            })
            .collect();

        Self { venues }
    }

    #[must_use]
    pub fn from_config(config: &ArbitragerConfig) -> Self {
        Self::new(&config.venues)
    }

    /// Current position on `venue`, if it exists.
    #[must_use]
    pub fn position(&self, venue: &VenueId) -> Option<Decimal> {
        self.venues.get(venue).map(|v| v.lock().position())
    }

    fn venue(&self, name: &VenueId) -> Result<&Mutex<PaperVenue>> {
        self.venues
            .get(name)
            .ok_or_else(|| anyhow!("unknown paper venue: {name}"))
    }
}

#[async_trait]
impl MarketDataCollector for PaperExchange {
    async fn fetch(&self, venue: &VenueConfig) -> Result<MarketData> {
        let data = self.venue(&venue.name)?.lock().quote();
        debug!(venue = %venue.name, bid = %data.bid, ask = %data.ask, "Paper quote");
        Ok(data)
    }
}

#[async_trait]
impl OrderExecutor for PaperExchange {
    async fn place_market(
        &self,
        venue: &VenueConfig,
        price: Decimal,
        amount: Decimal,
        side: Side,
    ) -> Result<OrderAck> {
        if amount <= Decimal::ZERO {
            return Err(anyhow!("order amount must be positive, got {amount}"));
        }
        let ack = self.venue(&venue.name)?.lock().place(side, amount);
        info!(
            venue = %venue.name,
            side = %side,
            price = %price,
            amount = %amount,
            order_id = %ack.order_id,
            "Paper market order"
        );
        Ok(ack)
    }

    async fn get_status(&self, venue: &VenueConfig) -> Result<OrderStatus> {
        Ok(self.venue(&venue.name)?.lock().status())
    }

    async fn cancel(&self, venue: &VenueConfig, order_id: Option<&str>) -> Result<()> {
        let cancelled = self.venue(&venue.name)?.lock().cancel(order_id);
        info!(venue = %venue.name, order_id = ?order_id, cancelled, "Paper cancel");
        Ok(())
    }

    async fn place_fallback_market(
        &self,
        venue: &VenueConfig,
        price: Decimal,
        amount: Decimal,
        side: Side,
    ) -> Result<OrderAck> {
        let ack = self.venue(&venue.name)?.lock().force_fill(side, amount);
        info!(
            venue = %venue.name,
            side = %side,
            price = %price,
            amount = %amount,
            order_id = %ack.order_id,
            "Paper fallback order"
        );
        Ok(ack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbitrager_core::PaperVenueSettings;
    use rust_decimal_macros::dec;

    fn venue(name: &str, mid: Decimal, fill_probability: f64) -> VenueConfig {
        VenueConfig::new(name).with_paper(PaperVenueSettings {
            mid_price: mid,
            half_spread: dec!(1),
            depth: dec!(0.5),
            initial_position: Decimal::ZERO,
            volatility_bps: 0,
            fill_probability,
            seed: Some(42),
        })
    }

    // ==================== Market Data Tests ====================

    #[tokio::test]
    async fn test_fetch_quotes_each_venue() {
        let alpha = venue("alpha", dec!(100), 1.0);
        let beta = venue("beta", dec!(200), 1.0);
        let exchange = PaperExchange::new(&[alpha.clone(), beta.clone()]);

        let a = exchange.fetch(&alpha).await.unwrap();
        let b = exchange.fetch(&beta).await.unwrap();

        assert_eq!((a.bid, a.ask), (dec!(99), dec!(101)));
        assert_eq!((b.bid, b.ask), (dec!(199), dec!(201)));
        assert_eq!(a.bid_amount, dec!(0.5));
    }

    #[tokio::test]
    async fn test_unknown_venue_is_an_error() {
        let exchange = PaperExchange::new(&[venue("alpha", dec!(100), 1.0)]);
        let missing = venue("gamma", dec!(100), 1.0);

        assert!(exchange.fetch(&missing).await.is_err());
        assert!(exchange.get_status(&missing).await.is_err());
        assert!(exchange
            .place_market(&missing, dec!(100), dec!(1), Side::Buy)
            .await
            .is_err());
    }

    // ==================== Order Tests ====================

    #[tokio::test]
    async fn test_filled_orders_move_positions() {
        let alpha = venue("alpha", dec!(100), 1.0);
        let beta = venue("beta", dec!(100), 1.0);
        let exchange = PaperExchange::new(&[alpha.clone(), beta.clone()]);

        exchange
            .place_market(&alpha, dec!(99), dec!(0.3), Side::Sell)
            .await
            .unwrap();
        exchange
            .place_market(&beta, dec!(101), dec!(0.3), Side::Buy)
            .await
            .unwrap();

        assert_eq!(exchange.position(&alpha.name), Some(dec!(-0.3)));
        assert_eq!(exchange.position(&beta.name), Some(dec!(0.3)));
        assert_eq!(exchange.get_status(&alpha).await.unwrap(), OrderStatus::None);
        assert_eq!(exchange.fetch(&beta).await.unwrap().position, dec!(0.3));
    }

    #[tokio::test]
    async fn test_resting_order_cancel_then_fallback() {
        let alpha = venue("alpha", dec!(100), 0.0);
        let exchange = PaperExchange::new(&[alpha.clone()]);

        let ack = exchange
            .place_market(&alpha, dec!(101), dec!(1), Side::Buy)
            .await
            .unwrap();
        assert_eq!(exchange.get_status(&alpha).await.unwrap(), OrderStatus::Open);

        exchange.cancel(&alpha, Some(&ack.order_id)).await.unwrap();
        assert_eq!(exchange.get_status(&alpha).await.unwrap(), OrderStatus::None);
        assert_eq!(exchange.position(&alpha.name), Some(Decimal::ZERO));

        exchange
            .place_fallback_market(&alpha, dec!(101), dec!(1), Side::Buy)
            .await
            .unwrap();
        assert_eq!(exchange.position(&alpha.name), Some(dec!(1)));
    }

    #[tokio::test]
    async fn test_non_positive_amount_rejected() {
        let alpha = venue("alpha", dec!(100), 1.0);
        let exchange = PaperExchange::new(&[alpha.clone()]);

        let result = exchange
            .place_market(&alpha, dec!(100), Decimal::ZERO, Side::Sell)
            .await;
        assert!(result.is_err());
    }
}
