//! The arbitrage control loop.
//!
//! # Overview
//!
//! Every tick runs the same fixed sequence:
//!
//! ```text
//! IDLE -> FETCH -> [CLOSE_EVAL] -> ANALYZE -> DECIDE -> [EXECUTE -> RECONCILE] -> IDLE
//! ```
//!
//! 1. Refresh every venue's book and position concurrently.
//! 2. If positions are open, look for one to close.
//! 3. Analyse the market and ask the deal maker about opening.
//! 4. Execute the close if there is one; otherwise open when the ledger has
//!    room and the decision reports sufficient profit.
//!
//! Ticks never overlap. Each fan-out step joins all of its workers before
//! the next one starts, and only the loop itself touches the ledger.
//!
//! # Example
//!
//! ```ignore
//! use arbitrager_engine::{Arbitrager, ThresholdDealMaker, TracingReporter};
//!
//! let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//! let mut arbitrager = Arbitrager::new(
//!     config,
//!     exchange.clone(),
//!     Arc::new(ThresholdDealMaker::new()),
//!     exchange,
//!     Arc::new(TracingReporter::new()),
//! );
//! arbitrager.run(shutdown_rx).await?;
//! ```

use std::sync::Arc;

use arbitrager_core::{
    ArbitragerConfig, DealMaker, DealRecord, DecisionReason, MarketDataCollector, OrderExecutor,
    Reporter, VenueSnapshot,
};
use futures_util::future::join_all;
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::analyzer::analyze;
use crate::closing::evaluate_closing;
use crate::error::ArbitragerError;
use crate::executor::{Execution, OrderDispatcher};
use crate::ledger::DealLedger;
use crate::reconciler::{FillReconciler, ReconcileOutcome};

/// What a single tick did.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Nothing was executed.
    Idle {
        /// Reason from the open decision, if any.
        reason: Option<DecisionReason>,
    },
    /// A new position was opened and recorded at `record_index`.
    Opened {
        record_index: usize,
        reconcile: ReconcileOutcome,
    },
    /// The position at `ledger_index` was closed and removed.
    Closed {
        ledger_index: usize,
        reconcile: ReconcileOutcome,
    },
}

pub struct Arbitrager {
    config: ArbitragerConfig,
    collector: Arc<dyn MarketDataCollector>,
    deal_maker: Arc<dyn DealMaker>,
    reporter: Arc<dyn Reporter>,
    dispatcher: OrderDispatcher,
    reconciler: FillReconciler,
    snapshots: Vec<VenueSnapshot>,
    ledger: DealLedger,
}

impl Arbitrager {
    #[must_use]
    pub fn new(
        config: ArbitragerConfig,
        collector: Arc<dyn MarketDataCollector>,
        deal_maker: Arc<dyn DealMaker>,
        executor: Arc<dyn OrderExecutor>,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        let snapshots = config
            .venues
            .iter()
            .map(|venue| VenueSnapshot::new(venue.name.clone()))
            .collect();
        let dispatcher = OrderDispatcher::new(executor.clone(), config.timings.settle_delay);
        let reconciler = FillReconciler::new(executor, config.fill_check_attempts, config.timings);

        Self {
            config,
            collector,
            deal_maker,
            reporter,
            dispatcher,
            reconciler,
            snapshots,
            ledger: DealLedger::new(),
        }
    }

    /// Starts from an existing set of open positions.
    #[must_use]
    pub fn with_ledger(mut self, ledger: DealLedger) -> Self {
        self.ledger = ledger;
        self
    }

    #[must_use]
    pub fn config(&self) -> &ArbitragerConfig {
        &self.config
    }

    #[must_use]
    pub fn ledger(&self) -> &DealLedger {
        &self.ledger
    }

    #[must_use]
    pub fn snapshots(&self) -> &[VenueSnapshot] {
        &self.snapshots
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Runs ticks until `shutdown` turns true.
    ///
    /// Shutdown drops the in-flight tick at its next await point; orders
    /// already sent are not drained or reconciled.
    ///
    /// # Errors
    ///
    /// Returns the first unrecoverable tick error. Data fetch failures only
    /// abort their tick.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) -> Result<(), ArbitragerError> {
        self.start();

        let result = loop {
            tokio::select! {
                biased;

                () = shutdown_requested(&mut shutdown) => break Ok(()),

                result = self.cycle() => match result {
                    Ok(outcome) => debug!(?outcome, "Tick complete"),
                    Err(err) if err.is_recoverable() => {
                        warn!(error = %err, "Tick aborted, retrying on next tick");
                    }
                    Err(err) => {
                        error!(error = %err, "Unrecoverable error, stopping");
                        break Err(err);
                    }
                },
            }
        };

        if result.is_ok() {
            self.stop();
        }
        result
    }

    fn start(&self) {
        self.reporter.lifecycle("Starting the service...");
        self.reporter.lifecycle("Starting Arbitrager...");
        info!(
            venues = self.config.venues.len(),
            target_amount = %self.config.target_amount,
            max_open_deals = self.config.max_open_deals,
            "Arbitrager configured"
        );
        self.reporter.lifecycle("Started Arbitrager.");
        self.reporter.lifecycle("Successfully started the service.");
    }

    fn stop(&self) {
        self.reporter.lifecycle("Stopping Arbitrager...");
        self.reporter.lifecycle("Stopping the service...");
        if !self.ledger.is_empty() {
            warn!(open = self.ledger.len(), "Stopping with open positions");
        }
        self.reporter.lifecycle("Stopped Arbitrager.");
        self.reporter.lifecycle("Successfully stopped the service.");
    }

    async fn cycle(&mut self) -> Result<TickOutcome, ArbitragerError> {
        sleep(self.config.timings.tick_interval).await;
        self.tick().await
    }

    // =========================================================================
    // Tick
    // =========================================================================

    /// Runs one full iteration of the loop.
    ///
    /// # Errors
    ///
    /// Returns [`ArbitragerError::DataFetch`] if any venue could not be
    /// refreshed, or any error raised while closing, dispatching, reconciling,
    /// or updating the ledger.
    pub async fn tick(&mut self) -> Result<TickOutcome, ArbitragerError> {
        self.refresh_market_data().await?;

        let close = if self.ledger.is_empty() {
            None
        } else {
            self.reporter.ledger(self.ledger.records());
            evaluate_closing(
                &self.snapshots,
                &self.ledger,
                self.deal_maker.as_ref(),
                self.config.exit_profit_rate,
            )?
        };

        self.reporter.positions(&self.snapshots);
        let analysis =
            analyze(&self.snapshots, self.config.target_amount).ok_or(ArbitragerError::NoVenues)?;
        let decision = self.deal_maker.decide(&self.config, &analysis);
        self.reporter
            .board(self.config.target_amount, &analysis, &decision);

        if let Some(directive) = close {
            self.reporter.execution("Closing...");
            let ledger_index = directive.ledger_index;
            let reconcile = self.execute(Execution::Close(directive)).await?;
            return Ok(TickOutcome::Closed {
                ledger_index,
                reconcile,
            });
        }

        if self.ledger.len() >= self.config.max_open_deals {
            debug!(
                open = self.ledger.len(),
                cap = self.config.max_open_deals,
                "Open position cap reached"
            );
            return Ok(TickOutcome::Idle {
                reason: decision.reason,
            });
        }

        if !decision.is(DecisionReason::SufficientProfit) {
            return Ok(TickOutcome::Idle {
                reason: decision.reason,
            });
        }

        let reconcile = self.execute(Execution::Open(analysis)).await?;
        Ok(TickOutcome::Opened {
            record_index: self.ledger.len() - 1,
            reconcile,
        })
    }

    /// Fetches every venue concurrently into its own snapshot slot.
    async fn refresh_market_data(&mut self) -> Result<(), ArbitragerError> {
        let collector = self.collector.as_ref();
        let fetches = self
            .snapshots
            .iter_mut()
            .zip(&self.config.venues)
            .map(move |(slot, venue)| async move {
                let data = collector
                    .fetch(venue)
                    .await
                    .map_err(|source| ArbitragerError::DataFetch {
                        venue: venue.name.clone(),
                        source,
                    })?;
                slot.apply_market_data(&data);
                Ok::<(), ArbitragerError>(())
            });

        join_all(fetches).await.into_iter().collect()
    }

    /// Dispatches, reconciles, and records one paired trade.
    async fn execute(&mut self, execution: Execution) -> Result<ReconcileOutcome, ArbitragerError> {
        let order = execution.paired_order()?;
        info!(action = execution.as_str(), amount = %order.amount(), "Executing pair");

        self.dispatcher
            .dispatch(
                &mut self.snapshots,
                &self.config.venues,
                &order,
                self.reporter.as_ref(),
            )
            .await?;

        let outcome = self
            .reconciler
            .reconcile(
                &mut self.snapshots,
                &self.config.venues,
                &order,
                self.reporter.as_ref(),
            )
            .await?;

        self.apply_to_ledger(execution)?;
        Ok(outcome)
    }

    fn apply_to_ledger(&mut self, execution: Execution) -> Result<(), ArbitragerError> {
        match execution {
            Execution::Open(analysis) => {
                let record = DealRecord::from_analysis(&analysis);
                let index = self.ledger.push(record);
                info!(
                    index,
                    sell = %analysis.bid_venue,
                    buy = %analysis.ask_venue,
                    profit = %analysis.profit,
                    "Recorded open position"
                );
            }
            Execution::Close(directive) => {
                let index = directive.ledger_index;
                let len = self.ledger.len();
                let removed =
                    self.ledger
                        .remove(index)
                        .ok_or_else(|| ArbitragerError::LedgerInconsistency {
                            index,
                            reason: format!("close targets a missing record (ledger holds {len})"),
                        })?;
                info!(
                    index,
                    entry_profit = %removed.profit,
                    close_profit = %directive.profit,
                    "Removed closed position"
                );
            }
        }
        Ok(())
    }
}

/// Resolves once the shutdown flag is set. A dropped sender never resolves.
async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow_and_update() {
            return;
        }
        if shutdown.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
