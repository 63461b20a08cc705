use std::path::Path;

use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};

use crate::config::ArbitragerConfig;

/// Environment prefix for overrides, e.g. `ARBITRAGER_TARGET_AMOUNT`.
pub const ENV_PREFIX: &str = "ARBITRAGER_";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads the arbitrager configuration by merging a TOML file with environment variables.
    ///
    /// Nested keys use a double underscore, e.g. `ARBITRAGER_TIMINGS__TICK_INTERVAL_MS`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed or the result fails validation.
    pub fn load(path: impl AsRef<Path>) -> Result<ArbitragerConfig> {
        let path = path.as_ref();
        let config: ArbitragerConfig = Self::figment(path)
            .extract()
            .with_context(|| format!("failed to load configuration from {}", path.display()))?;

        config.validate().context("invalid configuration")?;

        tracing::debug!(
            path = %path.display(),
            venues = config.venues.len(),
            "configuration loaded"
        );

        Ok(config)
    }

    fn figment(path: &Path) -> Figment {
        Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use rust_decimal_macros::dec;
    use std::time::Duration;

    const CONFIG: &str = r#"
        target_amount = "0.005"
        exit_profit_rate = "0.8"

        [[venues]]
        name = "alpha"

        [[venues]]
        name = "beta"
        [venues.paper]
        mid_price = "5001000"
        fill_probability = 1.0
        seed = 7
    "#;

    #[test]
    fn test_load_from_toml() {
        Jail::expect_with(|jail| {
            jail.create_file("Config.toml", CONFIG)?;

            let config = ConfigLoader::load("Config.toml").map_err(|e| e.to_string())?;
            assert_eq!(config.target_amount, dec!(0.005));
            assert_eq!(config.exit_profit_rate, dec!(0.8));
            assert_eq!(config.venues.len(), 2);
            assert_eq!(config.venues[1].paper.mid_price, dec!(5001000));
            assert_eq!(config.venues[1].paper.seed, Some(7));
            assert_eq!(config.max_open_deals, 2);
            assert_eq!(config.timings.tick_interval, Duration::from_secs(3));
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("Config.toml", CONFIG)?;
            jail.set_env("ARBITRAGER_MAX_OPEN_DEALS", "1");
            jail.set_env("ARBITRAGER_TIMINGS__TICK_INTERVAL_MS", "250");

            let config = ConfigLoader::load("Config.toml").map_err(|e| e.to_string())?;
            assert_eq!(config.max_open_deals, 1);
            assert_eq!(config.timings.tick_interval, Duration::from_millis(250));
            Ok(())
        });
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "Config.toml",
                r#"
                target_amount = "1"
                exit_profit_rate = "0.5"

                [[venues]]
                name = "alpha"
                "#,
            )?;

            assert!(ConfigLoader::load("Config.toml").is_err());
            Ok(())
        });
    }
}
