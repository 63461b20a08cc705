//! Process configuration, loaded once before the control loop starts.

use std::collections::HashSet;
use std::time::Duration;

use anyhow::{bail, ensure, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::VenueId;

// =============================================================================
// Arbitrager Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArbitragerConfig {
    /// Venues to watch; at least two.
    pub venues: Vec<VenueConfig>,

    /// Amount traded on each leg when opening a position.
    pub target_amount: Decimal,

    /// Fraction of the entry profit that must be realised before closing.
    pub exit_profit_rate: Decimal,

    /// Minimum profit rate (percent) required to open.
    #[serde(default)]
    pub min_profit_rate: Decimal,

    /// Cap on concurrently open paired positions.
    #[serde(default = "default_max_open_deals")]
    pub max_open_deals: usize,

    /// Fill-status polling rounds before forcing completion.
    #[serde(default = "default_fill_check_attempts")]
    pub fill_check_attempts: u32,

    #[serde(default)]
    pub timings: LoopTimings,
}

fn default_max_open_deals() -> usize {
    2
}

fn default_fill_check_attempts() -> u32 {
    10
}

impl ArbitragerConfig {
    /// Creates a configuration with default limits and timings.
    #[must_use]
    pub fn new(venues: Vec<VenueConfig>, target_amount: Decimal, exit_profit_rate: Decimal) -> Self {
        Self {
            venues,
            target_amount,
            exit_profit_rate,
            min_profit_rate: Decimal::ZERO,
            max_open_deals: default_max_open_deals(),
            fill_check_attempts: default_fill_check_attempts(),
            timings: LoopTimings::default(),
        }
    }

    #[must_use]
    pub fn with_timings(mut self, timings: LoopTimings) -> Self {
        self.timings = timings;
        self
    }

    #[must_use]
    pub fn with_min_profit_rate(mut self, rate: Decimal) -> Self {
        self.min_profit_rate = rate;
        self
    }

    /// Looks up a venue by name.
    #[must_use]
    pub fn venue(&self, name: &VenueId) -> Option<&VenueConfig> {
        self.venues.iter().find(|v| &v.name == name)
    }

    /// Checks invariants the control loop relies on.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first violated constraint.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.venues.len() >= 2,
            "at least two venues are required, got {}",
            self.venues.len()
        );

        let mut seen = HashSet::new();
        for venue in &self.venues {
            if !seen.insert(&venue.name) {
                bail!("duplicate venue name: {}", venue.name);
            }
            venue.paper.validate(&venue.name)?;
        }

        ensure!(
            self.target_amount > Decimal::ZERO,
            "target_amount must be positive, got {}",
            self.target_amount
        );
        ensure!(self.max_open_deals >= 1, "max_open_deals must be at least 1");
        ensure!(
            self.fill_check_attempts >= 1,
            "fill_check_attempts must be at least 1"
        );

        Ok(())
    }
}

// =============================================================================
// Venue Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenueConfig {
    pub name: VenueId,

    /// Simulation parameters used by the paper venue.
    #[serde(default)]
    pub paper: PaperVenueSettings,
}

impl VenueConfig {
    #[must_use]
    pub fn new(name: impl Into<VenueId>) -> Self {
        Self {
            name: name.into(),
            paper: PaperVenueSettings::default(),
        }
    }

    #[must_use]
    pub fn with_paper(mut self, paper: PaperVenueSettings) -> Self {
        self.paper = paper;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaperVenueSettings {
    /// Starting mid price.
    pub mid_price: Decimal,
    /// Distance from mid to each side of the book.
    pub half_spread: Decimal,
    /// Executable amount quoted on both sides.
    pub depth: Decimal,
    /// Position held at start.
    pub initial_position: Decimal,
    /// Maximum mid-price move per fetch, in basis points.
    pub volatility_bps: u32,
    /// Chance that a market order (or a status poll) fills.
    pub fill_probability: f64,
    /// Fixed RNG seed for reproducible sessions.
    pub seed: Option<u64>,
}

impl Default for PaperVenueSettings {
    fn default() -> Self {
        Self {
            mid_price: Decimal::from(5_000_000),
            half_spread: Decimal::from(500),
            depth: Decimal::ONE,
            initial_position: Decimal::ZERO,
            volatility_bps: 10,
            fill_probability: 0.9,
            seed: None,
        }
    }
}

impl PaperVenueSettings {
    fn validate(&self, venue: &VenueId) -> Result<()> {
        ensure!(
            (0.0..=1.0).contains(&self.fill_probability),
            "venue {venue}: fill_probability must be within [0, 1], got {}",
            self.fill_probability
        );
        ensure!(
            self.half_spread >= Decimal::ZERO,
            "venue {venue}: half_spread must not be negative"
        );
        Ok(())
    }
}

// =============================================================================
// Loop Timings
// =============================================================================

/// Fixed delays between control-loop phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopTimings {
    /// Pause before every tick.
    #[serde(rename = "tick_interval_ms", with = "millis_serde")]
    pub tick_interval: Duration,

    /// Pause before dispatching a pair, for venue nonce sequencing.
    #[serde(rename = "settle_delay_ms", with = "millis_serde")]
    pub settle_delay: Duration,

    /// Pause before each fill-status polling round.
    #[serde(rename = "poll_interval_ms", with = "millis_serde")]
    pub poll_interval: Duration,

    /// Pause after a pair completes.
    #[serde(rename = "post_fill_pause_ms", with = "millis_serde")]
    pub post_fill_pause: Duration,

    /// Pause around cancelling an unfilled leg.
    #[serde(rename = "cancel_settle_ms", with = "millis_serde")]
    pub cancel_settle: Duration,
}

impl Default for LoopTimings {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(3),
            settle_delay: Duration::from_secs(1),
            poll_interval: Duration::from_secs(2),
            post_fill_pause: Duration::from_secs(2),
            cancel_settle: Duration::from_secs(1),
        }
    }
}

impl LoopTimings {
    /// No delays at all; used by tests and dry runs.
    #[must_use]
    pub fn immediate() -> Self {
        Self {
            tick_interval: Duration::ZERO,
            settle_delay: Duration::ZERO,
            poll_interval: Duration::ZERO,
            post_fill_pause: Duration::ZERO,
            cancel_settle: Duration::ZERO,
        }
    }
}

mod millis_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(millis)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
