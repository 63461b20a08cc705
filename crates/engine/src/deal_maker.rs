//! Threshold-based open/close decisions.

use arbitrager_core::{AnalysisResult, ArbitragerConfig, DealMaker, DecisionReason, DecisionResult};
use rust_decimal::Decimal;

/// Default [`DealMaker`].
///
/// Opens when the best bid and ask are on different venues, enough amount is
/// available, and the profit rate clears `min_profit_rate`. Closes once the
/// entry profit plus the current close profit reaches `exit_profit_rate` of
/// the entry profit.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThresholdDealMaker;

impl ThresholdDealMaker {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl DealMaker for ThresholdDealMaker {
    fn decide(&self, config: &ArbitragerConfig, analysis: &AnalysisResult) -> DecisionResult {
        if analysis.is_same_venue() {
            return DecisionResult::new(
                Some(DecisionReason::SameVenue),
                format!("Best bid and ask are both on {}", analysis.bid_venue),
            );
        }

        if analysis.available_amount < analysis.trade_amount {
            return DecisionResult::new(
                Some(DecisionReason::InsufficientAmount),
                format!(
                    "Not enough amount: {} available, {} required",
                    analysis.available_amount, analysis.trade_amount
                ),
            );
        }

        if analysis.profit <= Decimal::ZERO || analysis.profit_rate < config.min_profit_rate {
            return DecisionResult::new(
                Some(DecisionReason::InsufficientProfit),
                format!(
                    "Not enough profit: {} ({}%), minimum {}%",
                    analysis.profit, analysis.profit_rate, config.min_profit_rate
                ),
            )
            .with_profit(analysis.profit, Some(analysis.profit_rate));
        }

        DecisionResult::new(
            Some(DecisionReason::SufficientProfit),
            format!(
                "Found arbitrage opportunity: {} ({}%)",
                analysis.profit, analysis.profit_rate
            ),
        )
        .with_profit(analysis.profit, Some(analysis.profit_rate))
    }

    fn confirm_closing(
        &self,
        candidate_profit: Decimal,
        open_profit: Decimal,
        exit_profit_rate: Decimal,
    ) -> DecisionResult {
        let realized = open_profit + candidate_profit;
        let threshold = open_profit * exit_profit_rate;

        if realized >= threshold {
            DecisionResult::new(
                Some(DecisionReason::ExitThresholdReached),
                format!("Closing: realized {realized} reached exit threshold {threshold}"),
            )
            .with_profit(candidate_profit, None)
        } else {
            DecisionResult::none(format!(
                "Holding: realized {realized} below exit threshold {threshold}"
            ))
            .with_profit(candidate_profit, None)
        }
    }
}
