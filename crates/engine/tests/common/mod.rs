#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use arbitrager_core::{
    AnalysisResult, ArbitragerConfig, DealRecord, DecisionResult, LoopTimings, MarketData,
    MarketDataCollector, Reporter, VenueConfig, VenueId, VenueSnapshot,
};
use arbitrager_engine::{Arbitrager, DealLedger, ThresholdDealMaker};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ==================== Market Data ====================

/// Serves fixed books per venue; venues can be switched to failing.
#[derive(Default)]
pub struct ScriptedMarket {
    books: Mutex<HashMap<VenueId, MarketData>>,
    failing: Mutex<HashSet<VenueId>>,
    fetches: AtomicUsize,
}

impl ScriptedMarket {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_book(self, venue: &str, bid: Decimal, ask: Decimal) -> Self {
        self.set_book(venue, bid, ask);
        self
    }

    pub fn set_book(&self, venue: &str, bid: Decimal, ask: Decimal) {
        self.books.lock().insert(
            venue.into(),
            MarketData {
                bid,
                ask,
                bid_amount: dec!(1),
                ask_amount: dec!(1),
                position: Decimal::ZERO,
            },
        );
    }

    pub fn fail(&self, venue: &str) {
        self.failing.lock().insert(venue.into());
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MarketDataCollector for ScriptedMarket {
    async fn fetch(&self, venue: &VenueConfig) -> Result<MarketData> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.failing.lock().contains(&venue.name) {
            return Err(anyhow!("{} is unreachable", venue.name));
        }
        self.books
            .lock()
            .get(&venue.name)
            .cloned()
            .ok_or_else(|| anyhow!("no book for {}", venue.name))
    }
}

// ==================== Order Execution ====================

#[path = "../../src/testing.rs"]
mod testing;

pub use testing::{Call, MockOrderExecutor};

// ==================== Reporting ====================

#[derive(Default)]
pub struct RecordingReporter {
    lines: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    pub fn contains(&self, line: &str) -> bool {
        self.lines.lock().iter().any(|l| l == line)
    }
}

impl Reporter for RecordingReporter {
    fn lifecycle(&self, message: &str) {
        self.lines.lock().push(message.to_string());
    }

    fn ledger(&self, records: &[DealRecord]) {
        self.lines.lock().push(format!("ledger: {}", records.len()));
    }

    fn positions(&self, snapshots: &[VenueSnapshot]) {
        self.lines.lock().push(format!("positions: {}", snapshots.len()));
    }

    fn board(&self, _target: Decimal, analysis: &AnalysisResult, decision: &DecisionResult) {
        self.lines.lock().push(format!(
            "board: {} -> {} {}",
            analysis.ask_venue, analysis.bid_venue, decision.message
        ));
    }

    fn execution(&self, message: &str) {
        self.lines.lock().push(message.to_string());
    }
}

// ==================== Harness ====================

pub struct Harness {
    pub market: Arc<ScriptedMarket>,
    pub executor: Arc<MockOrderExecutor>,
    pub reporter: Arc<RecordingReporter>,
}

impl Harness {
    pub fn new(market: ScriptedMarket, executor: MockOrderExecutor) -> Self {
        Self {
            market: Arc::new(market),
            executor: Arc::new(executor),
            reporter: Arc::new(RecordingReporter::new()),
        }
    }

    pub fn arbitrager(&self, config: ArbitragerConfig) -> Arbitrager {
        Arbitrager::new(
            config,
            self.market.clone(),
            Arc::new(ThresholdDealMaker::new()),
            self.executor.clone(),
            self.reporter.clone(),
        )
    }
}

/// Two venues, trade amount 0.5, no delays.
pub fn config(exit_profit_rate: Decimal) -> ArbitragerConfig {
    ArbitragerConfig::new(
        vec![VenueConfig::new("X"), VenueConfig::new("Y")],
        dec!(0.5),
        exit_profit_rate,
    )
    .with_timings(LoopTimings::immediate())
}

/// Same as [`config`] but waiting `poll_interval` before each fill check.
pub fn polling_config(poll_interval: Duration) -> ArbitragerConfig {
    let mut timings = LoopTimings::immediate();
    timings.poll_interval = poll_interval;
    config(dec!(0.5)).with_timings(timings)
}

/// Same as [`config`] but with a short pause between ticks.
pub fn paced_config(tick_interval: Duration) -> ArbitragerConfig {
    let mut timings = LoopTimings::immediate();
    timings.tick_interval = tick_interval;
    config(dec!(0.5)).with_timings(timings)
}

pub fn record(bid_venue: &str, ask_venue: &str, profit: Decimal) -> DealRecord {
    DealRecord {
        bid_venue: bid_venue.into(),
        ask_venue: ask_venue.into(),
        amount: dec!(0.5),
        profit,
        profit_rate: dec!(1),
        opened_at: Utc::now(),
    }
}

pub fn ledger(records: Vec<DealRecord>) -> DealLedger {
    records.into_iter().collect()
}
