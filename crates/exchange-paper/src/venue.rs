//! Simulated book and order state for a single paper venue.

use arbitrager_core::{MarketData, OrderAck, OrderStatus, PaperVenueSettings, Side, VenueId};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rust_decimal::Decimal;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
struct RestingOrder {
    id: String,
    side: Side,
    amount: Decimal,
}

/// One simulated venue: a random-walk mid price, a position, and at most one
/// resting order.
#[derive(Debug)]
pub struct PaperVenue {
    name: VenueId,
    settings: PaperVenueSettings,
    mid: Decimal,
    position: Decimal,
    resting: Option<RestingOrder>,
    next_order: u64,
    rng: ChaCha8Rng,
}

impl PaperVenue {
    #[must_use]
    pub fn new(name: VenueId, settings: PaperVenueSettings) -> Self {
        let rng = match settings.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        Self {
            name,
            mid: settings.mid_price,
            position: settings.initial_position,
            settings,
            resting: None,
            next_order: 1,
            rng,
        }
    }

    #[must_use]
    pub fn position(&self) -> Decimal {
        self.position
    }

    #[must_use]
    pub fn mid(&self) -> Decimal {
        self.mid
    }

    /// Moves the mid price and returns the resulting top of book.
    pub fn quote(&mut self) -> MarketData {
        let bps = i64::from(self.settings.volatility_bps);
        if bps > 0 {
            let step = self.rng.gen_range(-bps..=bps);
            let moved = (self.mid + self.mid * Decimal::new(step, 4)).round_dp(2);
            // Keep the bid above zero.
            self.mid = moved.max(self.settings.half_spread + Decimal::ONE);
        }

        MarketData {
            bid: self.mid - self.settings.half_spread,
            ask: self.mid + self.settings.half_spread,
            bid_amount: self.settings.depth,
            ask_amount: self.settings.depth,
            position: self.position,
        }
    }

    /// Accepts a market order; it fills now or rests until a later poll.
    pub fn place(&mut self, side: Side, amount: Decimal) -> OrderAck {
        let id = format!("{}-{}", self.name, self.next_order);
        self.next_order += 1;

        if self.roll_fill() {
            self.fill(side, amount);
        } else {
            if let Some(previous) = &self.resting {
                debug!(venue = %self.name, order_id = %previous.id, "Replacing resting order");
            }
            self.resting = Some(RestingOrder {
                id: id.clone(),
                side,
                amount,
            });
        }

        OrderAck::new(id)
    }

    /// Reports the resting order's status, giving it another chance to fill.
    pub fn status(&mut self) -> OrderStatus {
        let Some(order) = self.resting.clone() else {
            return OrderStatus::None;
        };

        if self.roll_fill() {
            self.resting = None;
            self.fill(order.side, order.amount);
            OrderStatus::Filled
        } else {
            OrderStatus::Open
        }
    }

    /// Drops the resting order, if any.
    pub fn cancel(&mut self, order_id: Option<&str>) -> bool {
        match (&self.resting, order_id) {
            (Some(resting), Some(id)) if resting.id != id => {
                debug!(venue = %self.name, requested = id, resting = %resting.id, "Cancel for unknown order ignored");
                false
            }
            (Some(_), _) => {
                self.resting = None;
                true
            }
            (None, _) => false,
        }
    }

    /// Fills unconditionally.
    pub fn force_fill(&mut self, side: Side, amount: Decimal) -> OrderAck {
        let id = format!("{}-{}", self.name, self.next_order);
        self.next_order += 1;
        self.fill(side, amount);
        OrderAck::new(id)
    }

    fn roll_fill(&mut self) -> bool {
        self.rng.gen_bool(self.settings.fill_probability.clamp(0.0, 1.0))
    }

    fn fill(&mut self, side: Side, amount: Decimal) {
        match side {
            Side::Buy => self.position += amount,
            Side::Sell => self.position -= amount,
        }
        debug!(venue = %self.name, side = %side, amount = %amount, position = %self.position, "Paper fill");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn settings(fill_probability: f64) -> PaperVenueSettings {
        PaperVenueSettings {
            mid_price: dec!(1000),
            half_spread: dec!(5),
            depth: dec!(2),
            initial_position: dec!(1),
            volatility_bps: 0,
            fill_probability,
            seed: Some(7),
        }
    }

    #[test]
    fn test_quote_without_volatility_is_stable() {
        let mut venue = PaperVenue::new("alpha".into(), settings(1.0));
        let quote = venue.quote();

        assert_eq!(quote.bid, dec!(995));
        assert_eq!(quote.ask, dec!(1005));
        assert_eq!(quote.bid_amount, dec!(2));
        assert_eq!(quote.position, dec!(1));
        assert_eq!(venue.quote(), quote);
    }

    #[test]
    fn test_quote_moves_within_volatility_band() {
        let mut settings = settings(1.0);
        settings.volatility_bps = 50;
        let mut venue = PaperVenue::new("alpha".into(), settings);

        for _ in 0..100 {
            let before = venue.mid();
            let quote = venue.quote();
            let limit = before * dec!(0.005) + dec!(0.01);
            assert!((venue.mid() - before).abs() <= limit);
            assert!(quote.ask > quote.bid);
        }
    }

    #[test]
    fn test_certain_fill_moves_position() {
        let mut venue = PaperVenue::new("alpha".into(), settings(1.0));

        venue.place(Side::Sell, dec!(0.4));
        assert_eq!(venue.position(), dec!(0.6));
        assert_eq!(venue.status(), OrderStatus::None);

        venue.place(Side::Buy, dec!(1.4));
        assert_eq!(venue.position(), dec!(2.0));
    }

    #[test]
    fn test_unfillable_order_rests_until_cancelled() {
        let mut venue = PaperVenue::new("alpha".into(), settings(0.0));

        let ack = venue.place(Side::Buy, dec!(1));
        assert_eq!(venue.status(), OrderStatus::Open);
        assert!(!venue.cancel(Some("other")));
        assert!(venue.cancel(Some(&ack.order_id)));
        assert_eq!(venue.status(), OrderStatus::None);
        assert_eq!(venue.position(), dec!(1));

        venue.force_fill(Side::Buy, dec!(1));
        assert_eq!(venue.position(), dec!(2));
    }

    #[test]
    fn test_order_ids_are_unique() {
        let mut venue = PaperVenue::new("alpha".into(), settings(1.0));
        let first = venue.place(Side::Buy, dec!(1));
        let second = venue.force_fill(Side::Sell, dec!(1));
        assert_ne!(first.order_id, second.order_id);
    }
}
