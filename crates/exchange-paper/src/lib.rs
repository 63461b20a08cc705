//! Paper trading venues for the arbitrager.
//!
//! [`PaperExchange`] implements both [`MarketDataCollector`] and
//! [`OrderExecutor`] against in-memory venues. Each venue quotes a book
//! around a random-walk mid price and fills market orders with a configured
//! probability; unfilled orders rest until a status poll fills them or they
//! are cancelled.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use arbitrager_exchange_paper::PaperExchange;
//!
//! let exchange = Arc::new(PaperExchange::from_config(&config));
//! let quote = exchange.fetch(&config.venues[0]).await?;
//! ```
//!
//! [`MarketDataCollector`]: arbitrager_core::MarketDataCollector
//! [`OrderExecutor`]: arbitrager_core::OrderExecutor

pub mod exchange;
pub mod venue;

pub use exchange::PaperExchange;
pub use venue::PaperVenue;
