//! # Runtime Configuration Module
//!
//! Environment-driven switches for the router's request path handling.
//!
//! ## Environment Variables
//!
//! ### `MUXTREE_SKIP_CLEAN_PATH`
//!
//! When truthy (`1`, `true`, `yes`, `on`), request paths are matched exactly
//! as given instead of being normalised with
//! [`clean_path`](crate::router::clean_path) first.
//!
//! Default: off
//!
//! ### `MUXTREE_DISABLE_OPTIONS`
//!
//! When truthy, OPTIONS requests are no longer answered automatically with
//! the route's `Allow` value; they resolve like any other unregistered method.
//!
//! Default: off
//!
//! ### `MUXTREE_SLOW_MATCH_US`
//!
//! Threshold in microseconds above which a match is logged at `warn` level.
//! Accepts decimal (`1000`) or hexadecimal (`0x3e8`).
//!
//! Default: `1000` (1 ms)
//!
//! ## Usage
//!
//! ```rust
//! use muxtree::router::Router;
//! use muxtree::runtime_config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_env();
//! let router = Router::with_config(config);
//! # let _ = router;
//! ```

use std::env;
use std::time::Duration;

const DEFAULT_SLOW_MATCH_US: u64 = 1000;

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Match request paths verbatim (default: false)
    pub skip_clean_path: bool,
    /// Answer OPTIONS from the `Allow` value when no handler is registered
    /// (default: true)
    pub auto_options: bool,
    /// Matches slower than this are logged as warnings (default: 1 ms)
    pub slow_match: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            skip_clean_path: false,
            auto_options: true,
            slow_match: Duration::from_micros(DEFAULT_SLOW_MATCH_US),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let slow_us = lookup("MUXTREE_SLOW_MATCH_US")
            .and_then(|val| parse_number(&val))
            .unwrap_or(DEFAULT_SLOW_MATCH_US);
        RuntimeConfig {
            skip_clean_path: lookup("MUXTREE_SKIP_CLEAN_PATH")
                .map_or(defaults.skip_clean_path, |v| is_truthy(&v)),
            auto_options: lookup("MUXTREE_DISABLE_OPTIONS")
                .map_or(defaults.auto_options, |v| !is_truthy(&v)),
            slow_match: Duration::from_micros(slow_us),
        }
    }
}

fn parse_number(val: &str) -> Option<u64> {
    let val = val.trim();
    match val.strip_prefix("0x").or_else(|| val.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => val.parse().ok(),
    }
}

fn is_truthy(val: &str) -> bool {
    matches!(
        val.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
