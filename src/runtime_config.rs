//! # Runtime Configuration Module
//!
//! Environment variable-based configuration for the router's runtime
//! behavior.
//!
//! ## Environment Variables
//!
//! ### `CHAINR_CACHE_CAPACITY`
//!
//! Maximum number of `(method, path)` resolutions kept in the resolution
//! cache. Accepts values in:
//! - Decimal: `4096`
//! - Hexadecimal: `0x1000`
//!
//! Default: `4096`. `0` disables caching.
//!
//! Once the cache is full, the least recently used resolution is evicted.
//! The cap keeps a stream of distinct request paths (e.g. `/users/1`,
//! `/users/2`, ...) from growing the cache without bound.
//!
//! ### `CHAINR_TRACE_ROUTING`
//!
//! `1` or `true` installs the tracing route observer, which emits a
//! `tracing` event for every cache hit, static match, dynamic match and
//! fallback. Default: off.
//!
//! ## Usage
//!
//! ```rust
//! use chainrouter::runtime_config::RouterConfig;
//!
//! let config = RouterConfig::from_env();
//! println!("Cache capacity: {}", config.cache_capacity);
//! ```

use std::env;

/// Default number of cached resolutions
pub const DEFAULT_CACHE_CAPACITY: usize = 4096;

/// Runtime configuration for a `Router`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouterConfig {
    /// Maximum cached resolutions (default: 4096, 0 disables the cache)
    pub cache_capacity: usize,
    /// Emit tracing events from the resolver
    pub trace_routing: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            trace_routing: false,
        }
    }
}

impl RouterConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let cache_capacity = match lookup("CHAINR_CACHE_CAPACITY") {
            Some(val) => parse_size(&val).unwrap_or(DEFAULT_CACHE_CAPACITY),
            None => DEFAULT_CACHE_CAPACITY,
        };
        let trace_routing = lookup("CHAINR_TRACE_ROUTING")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        RouterConfig {
            cache_capacity,
            trace_routing,
        }
    }
}

fn parse_size(val: &str) -> Option<usize> {
    let val = val.trim();
    if let Some(hex) = val.strip_prefix("0x") {
        usize::from_str_radix(hex, 16).ok()
    } else {
        val.parse().ok()
    }
}
