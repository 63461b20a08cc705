//! Validates a config file without trading.

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::Result;
use arbitrager_core::{ArbitragerConfig, ConfigLoader};
use clap::Args;

/// Arguments for the check-config command.
#[derive(Args, Debug, Clone)]
pub struct CheckConfigArgs {
    /// Config file path
    #[arg(short, long, default_value = "config/Config.toml")]
    pub config: PathBuf,
}

/// Loads the config and prints what the arbitrager would run with.
///
/// # Errors
/// Returns an error if the config cannot be loaded or fails validation.
pub fn run_check_config(args: &CheckConfigArgs) -> Result<()> {
    let config = ConfigLoader::load(&args.config)?;

    println!("Configuration OK: {}", args.config.display());
    print!("{}", summary(&config));
    Ok(())
}

/// One line per setting, then one per venue.
fn summary(config: &ArbitragerConfig) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "  target amount     : {}", config.target_amount);
    let _ = writeln!(out, "  min profit rate   : {}%", config.min_profit_rate);
    let _ = writeln!(out, "  exit profit rate  : {}", config.exit_profit_rate);
    let _ = writeln!(out, "  max open deals    : {}", config.max_open_deals);
    let _ = writeln!(out, "  fill attempts     : {}", config.fill_check_attempts);
    let _ = writeln!(out, "  tick interval     : {:?}", config.timings.tick_interval);
    for venue in &config.venues {
        let _ = writeln!(
            out,
            "  venue {:<12}: mid {} +/- {}, depth {}, fill p={}",
            venue.name.as_str(),
            venue.paper.mid_price,
            venue.paper.half_spread,
            venue.paper.depth,
            venue.paper.fill_probability
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbitrager_core::VenueConfig;
    use rust_decimal_macros::dec;

    #[test]
    fn test_summary_prints_exit_rate_as_fraction() {
        let config = ArbitragerConfig::new(
            vec![VenueConfig::new("alpha"), VenueConfig::new("beta")],
            dec!(0.005),
            dec!(0.8),
        )
        .with_min_profit_rate(dec!(0.1));

        let summary = summary(&config);

        assert!(summary.contains("  exit profit rate  : 0.8\n"));
        assert!(summary.contains("  min profit rate   : 0.1%\n"));
        assert!(summary.contains("  venue alpha       : mid 5000000 +/- 500"));
        assert_eq!(summary.lines().count(), 8);
    }
}
