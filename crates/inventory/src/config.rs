use std::time::Duration;

use dropstock_core::drop::DEFAULT_RECENT_PURCHASES;
use dropstock_core::reservation::{
    DEFAULT_HOLD_SECS, DEFAULT_SWEEP_INTERVAL_SECS, MAX_HOLD_SECS, MAX_SWEEP_INTERVAL_SECS,
};

/// Upper bound for `RECENT_PURCHASES_LIMIT`.
const MAX_RECENT_PURCHASES: i64 = 100;

/// Tunables for the reservation core, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct InventoryConfig {
    /// How long a reservation holds its unit.
    pub hold_duration: chrono::Duration,
    /// Period of the expiration sweeper.
    pub sweep_interval: Duration,
    /// Number of recent purchases attached to each listed drop.
    pub recent_purchases_limit: i64,
}

impl InventoryConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default | Max     |
    /// |--------------------------|---------|---------|
    /// | `HOLD_DURATION_SECS`     | `60`    | `86400` |
    /// | `SWEEP_INTERVAL_SECS`    | `10`    | `3600`  |
    /// | `RECENT_PURCHASES_LIMIT` | `3`     | `100`   |
    ///
    /// Unparseable, non-positive or out-of-range values fall back to the
    /// default with a warning rather than aborting startup.
    pub fn from_env() -> Self {
        let hold_secs = env_bounded("HOLD_DURATION_SECS", DEFAULT_HOLD_SECS, MAX_HOLD_SECS);
        let sweep_secs = env_bounded(
            "SWEEP_INTERVAL_SECS",
            DEFAULT_SWEEP_INTERVAL_SECS as i64,
            MAX_SWEEP_INTERVAL_SECS as i64,
        );
        let recent_purchases_limit = env_bounded(
            "RECENT_PURCHASES_LIMIT",
            DEFAULT_RECENT_PURCHASES,
            MAX_RECENT_PURCHASES,
        );

        Self {
            hold_duration: chrono::Duration::seconds(hold_secs),
            sweep_interval: Duration::from_secs(sweep_secs as u64),
            recent_purchases_limit,
        }
    }
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            hold_duration: chrono::Duration::seconds(DEFAULT_HOLD_SECS),
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
            recent_purchases_limit: DEFAULT_RECENT_PURCHASES,
        }
    }
}

fn env_bounded(key: &str, default: i64, max: i64) -> i64 {
    parse_bounded(key, std::env::var(key).ok().as_deref(), default, max)
}

/// Accept `raw` when it parses to a value in `1..=max`, else use `default`.
fn parse_bounded(key: &str, raw: Option<&str>, default: i64, max: i64) -> i64 {
    let Some(raw) = raw else {
        return default;
    };
    match raw.trim().parse::<i64>() {
        Ok(v) if (1..=max).contains(&v) => v,
        _ => {
            tracing::warn!(key, value = %raw, default, max, "Ignoring invalid setting");
            default
        }
    }
}
