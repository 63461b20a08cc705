pub mod config;
pub mod config_loader;
pub mod traits;
pub mod types;

pub use config::{ArbitragerConfig, LoopTimings, PaperVenueSettings, VenueConfig};
pub use config_loader::ConfigLoader;
pub use traits::{DealMaker, MarketDataCollector, OrderExecutor, Reporter};
pub use types::{
    AnalysisResult, DealRecord, DecisionReason, DecisionResult, MarketData, OrderAck,
    OrderStatus, Side, VenueId, VenueSnapshot,
};
