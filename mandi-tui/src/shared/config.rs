/// Client configuration for the `mandi` terminal
///
/// Every field has a default and can be overridden from the environment
use mandi_data::ApiConfig;
use std::time::Duration;

/// Environment variable overriding how long banners stay visible, in seconds
pub const BANNER_SECS_ENV: &str = "MANDI_BANNER_SECS";

/// Environment variable overriding the UI tick rate, in milliseconds
pub const TICK_MS_ENV: &str = "MANDI_TICK_MS";

/// Client configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Price-data API settings
    pub api: ApiConfig,
    /// How long a banner stays visible before it expires
    pub banner_ttl: Duration,
    /// Redraw and input polling interval
    pub tick_rate: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            banner_ttl: Duration::from_secs(5),
            tick_rate: Duration::from_millis(100),
        }
    }
}

impl ClientConfig {
    /// Create a new configuration with custom API base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            api: ApiConfig::new(base_url),
            ..Default::default()
        }
    }

    /// Read `MANDI_API_URL`, `MANDI_BANNER_SECS` and `MANDI_TICK_MS`, keeping defaults for
    /// anything missing or unparsable
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api: ApiConfig::from_env(),
            banner_ttl: env_u64(BANNER_SECS_ENV)
                .map(Duration::from_secs)
                .unwrap_or(defaults.banner_ttl),
            tick_rate: env_u64(TICK_MS_ENV)
                .map(Duration::from_millis)
                .unwrap_or(defaults.tick_rate),
        }
    }

    /// Set banner time-to-live
    pub fn with_banner_ttl(mut self, ttl: Duration) -> Self {
        self.banner_ttl = ttl;
        self
    }

    /// Set tick rate
    pub fn with_tick_rate(mut self, tick_rate: Duration) -> Self {
        self.tick_rate = tick_rate;
        self
    }
}

fn env_u64(key: &str) -> Option<u64> {
    std::env::var(key).ok().and_then(|raw| parse_positive(&raw))
}

fn parse_positive(raw: &str) -> Option<u64> {
    raw.trim().parse::<u64>().ok().filter(|value| *value > 0)
}
