//! Line-oriented log output of the control loop.

#![allow(clippy::uninlined_format_args)]

use arbitrager_core::{AnalysisResult, DealRecord, DecisionResult, Reporter, VenueSnapshot};
use rust_decimal::Decimal;
use tracing::info;

const WIDTH: usize = 50;
const LABEL_WIDTH: usize = 18;
const VENUE_WIDTH: usize = 10;

/// [`Reporter`] that writes each line through `tracing` at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl TracingReporter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// `-----TITLE-----`, centred in 50 columns.
#[must_use]
pub fn banner(title: &str) -> String {
    format!("{:-^width$}", title, width = WIDTH)
}

fn rule() -> String {
    "-".repeat(WIDTH)
}

fn labelled(label: &str, value: impl std::fmt::Display) -> String {
    format!("{:<width$} : {}", label, value, width = LABEL_WIDTH)
}

/// Lines describing the open positions.
#[must_use]
pub fn format_ledger(records: &[DealRecord]) -> Vec<String> {
    let mut lines = Vec::with_capacity(records.len() + 2);
    lines.push(banner("RECORD"));
    for record in records {
        lines.push(format!(
            "Sell: {} Buy: {} Amount: {} Profit: {} ({}%) Opened: {}",
            record.bid_venue,
            record.ask_venue,
            record.amount,
            record.profit,
            record.profit_rate,
            record.opened_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
    }
    lines.push(rule());
    lines
}

/// Lines with each venue's held position.
#[must_use]
pub fn format_positions(snapshots: &[VenueSnapshot]) -> Vec<String> {
    let mut lines = Vec::with_capacity(snapshots.len() + 2);
    lines.push(banner("POSITION"));
    for snapshot in snapshots {
        lines.push(format!(
            "{:<width$} : {}",
            snapshot.venue.as_str(),
            snapshot.position,
            width = VENUE_WIDTH
        ));
    }
    lines.push(rule());
    lines
}

/// Lines summarising this tick's analysis and decision.
#[must_use]
pub fn format_board(
    target_amount: Decimal,
    analysis: &AnalysisResult,
    decision: &DecisionResult,
) -> Vec<String> {
    vec![
        banner("ARBITRAGER"),
        "Looking for opportunity...".to_string(),
        labelled(
            "Best bid",
            format!(
                "{:<width$} Bid {}",
                analysis.bid_venue.as_str(),
                analysis.best_bid,
                width = VENUE_WIDTH
            ),
        ),
        labelled(
            "Best ask",
            format!(
                "{:<width$} Ask {}",
                analysis.ask_venue.as_str(),
                analysis.best_ask,
                width = VENUE_WIDTH
            ),
        ),
        labelled("Spread", analysis.spread),
        labelled("Available amount", analysis.available_amount),
        labelled("Target amount", target_amount),
        labelled(
            "Expected profit",
            format!("{} ({}%)", analysis.profit, analysis.profit_rate),
        ),
        decision.message.clone(),
    ]
}

impl Reporter for TracingReporter {
    fn lifecycle(&self, message: &str) {
        info!("{}", message);
    }

    fn ledger(&self, records: &[DealRecord]) {
        for line in format_ledger(records) {
            info!("{}", line);
        }
    }

    fn positions(&self, snapshots: &[VenueSnapshot]) {
        for line in format_positions(snapshots) {
            info!("{}", line);
        }
    }

    fn board(&self, target_amount: Decimal, analysis: &AnalysisResult, decision: &DecisionResult) {
        for line in format_board(target_amount, analysis, decision) {
            info!("{}", line);
        }
    }

    fn execution(&self, message: &str) {
        info!("{}", message);
    }
}
