//! AI settings: request policy, categorizer cache, insight formatting
//!
//! Config is loaded with a layered resolution:
//! 1. File named by `SPENDWISE_AI_CONFIG`, if set
//! 2. Override in the data dir (~/.local/share/spendwise/config/ai.toml)
//! 3. Embedded defaults (compiled into binary)
//!
//! Keys missing from an override keep their default values.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use rand::Rng;
use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/ai.toml");

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "SPENDWISE_AI_CONFIG";

/// Timeout and retry policy applied to every completion call
#[derive(Debug, Clone, PartialEq)]
pub struct RequestPolicy {
    /// Upper bound for a single attempt
    pub timeout: Duration,
    /// Attempts after the first one
    pub max_retries: u32,
    /// Base for exponential backoff between attempts
    pub retry_base_delay: Duration,
}

impl Default for RequestPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            max_retries: 2,
            retry_base_delay: Duration::from_millis(250),
        }
    }
}

impl RequestPolicy {
    /// Total attempts including the first one
    pub fn attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay before the attempt following `attempt` (1-based):
    /// `base * 2^(attempt-1)` plus up to `base` of random jitter
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let base = self.retry_base_delay.as_millis() as u64;
        if base == 0 {
            return Duration::ZERO;
        }
        let exponential = base.saturating_mul(1u64 << attempt.saturating_sub(1).min(16));
        let jitter = rand::thread_rng().gen_range(0..=base);
        Duration::from_millis(exponential.saturating_add(jitter))
    }
}

/// All AI-related settings
#[derive(Debug, Clone, PartialEq)]
pub struct AiSettings {
    pub request: RequestPolicy,
    /// Distinct titles kept in the categorizer cache (0 disables caching)
    pub cache_capacity: usize,
    /// Prefix for amounts in locally generated messages
    pub currency_symbol: String,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            request: RequestPolicy::default(),
            cache_capacity: 1024,
            currency_symbol: "₹".to_string(),
        }
    }
}

impl AiSettings {
    /// Load settings using the layered resolution described above
    pub fn load() -> Result<Self> {
        let explicit = std::env::var(CONFIG_ENV)
            .ok()
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        if let Some(path) = explicit {
            // An explicitly named file must exist
            let content = fs::read_to_string(&path).map_err(|e| {
                Error::Config(format!("Failed to read {}: {}", path.display(), e))
            })?;
            debug!(path = %path.display(), "Loaded AI config");
            return Self::from_toml(&content);
        }

        if let Some(path) = default_config_path().filter(|p| p.exists()) {
            let content = fs::read_to_string(&path).map_err(|e| {
                Error::Config(format!("Failed to read {}: {}", path.display(), e))
            })?;
            debug!(path = %path.display(), "Loaded AI config override");
            return Self::from_toml(&content);
        }

        Self::from_toml(DEFAULT_CONFIG)
    }

    /// Parse settings from TOML content, filling gaps with defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

        let mut settings = Self::default();

        if let Some(request) = raw.request {
            if let Some(timeout) = request.timeout_secs {
                if timeout == 0 {
                    return Err(Error::Config("request.timeout_secs must be positive".into()));
                }
                settings.request.timeout = Duration::from_secs(timeout);
            }
            if let Some(retries) = request.max_retries {
                settings.request.max_retries = retries;
            }
            if let Some(delay) = request.retry_base_delay_ms {
                settings.request.retry_base_delay = Duration::from_millis(delay);
            }
        }

        if let Some(categorizer) = raw.categorizer {
            if let Some(capacity) = categorizer.cache_capacity {
                settings.cache_capacity = capacity;
            }
        }

        if let Some(insights) = raw.insights {
            if let Some(symbol) = insights.currency_symbol {
                settings.currency_symbol = symbol;
            }
        }

        Ok(settings)
    }
}

/// Get the default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("spendwise").join("config").join("ai.toml"))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    request: Option<RawRequest>,
    categorizer: Option<RawCategorizer>,
    insights: Option<RawInsights>,
}

#[derive(Debug, Deserialize)]
struct RawRequest {
    timeout_secs: Option<u64>,
    max_retries: Option<u32>,
    retry_base_delay_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RawCategorizer {
    cache_capacity: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct RawInsights {
    currency_symbol: Option<String>,
}
