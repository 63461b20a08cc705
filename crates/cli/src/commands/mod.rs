//! CLI commands for the arbitrager.

pub mod check_config;
pub mod run;

pub use check_config::{run_check_config, CheckConfigArgs};
pub use run::{run_arbitrager, RunArgs};
