//! Validator configuration.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cache::DEFAULT_MAX_CERTS;
use crate::error::{SnsError, SnsResult};

const USE_CACHE_MSG: &str = "useCache must be a boolean";
const MAX_CERTS_MSG: &str = "maxCerts must be a positive integer";
const AUTO_SUBSCRIBE_MSG: &str = "autoSubscribe must be a boolean";
const AUTO_RESUBSCRIBE_MSG: &str = "autoResubscribe must be a boolean";
const TIMEOUT_MSG: &str = "timeoutSecs must be a positive integer";

/// Options fixed at [`Validator`](crate::Validator) construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatorConfig {
    /// Keep fetched certificates in an LRU cache.
    #[serde(default = "default_true")]
    pub use_cache: bool,

    /// Cache capacity.
    #[serde(default = "default_max_certs")]
    pub max_certs: u64,

    /// Visit `SubscribeURL` after a verified SubscriptionConfirmation.
    #[serde(default = "default_true")]
    pub auto_subscribe: bool,

    /// Visit `SubscribeURL` after a verified UnsubscribeConfirmation.
    #[serde(default = "default_true")]
    pub auto_resubscribe: bool,

    /// Outbound HTTP request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_true() -> bool {
    true
}

fn default_max_certs() -> u64 {
    DEFAULT_MAX_CERTS
}

fn default_timeout() -> u64 {
    30
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            use_cache: true,
            max_certs: default_max_certs(),
            auto_subscribe: true,
            auto_resubscribe: true,
            timeout_secs: default_timeout(),
        }
    }
}

impl ValidatorConfig {
    /// Create config from environment variables, starting from defaults.
    ///
    /// | Variable | Description |
    /// |----------|-------------|
    /// | `SNS_VERIFY_USE_CACHE` | Cache certificates (`true`/`false`/`1`/`0`) |
    /// | `SNS_VERIFY_MAX_CERTS` | Cache capacity |
    /// | `SNS_VERIFY_AUTO_SUBSCRIBE` | Confirm subscriptions |
    /// | `SNS_VERIFY_AUTO_RESUBSCRIBE` | Re-subscribe after unsubscribe confirmations |
    /// | `SNS_VERIFY_TIMEOUT` | HTTP timeout in seconds |
    ///
    /// Unparseable values are errors rather than silently ignored.
    pub fn from_env() -> SnsResult<Self> {
        let mut config = Self::default();

        if let Some(v) = env_var("SNS_VERIFY_USE_CACHE") {
            config.use_cache = parse_bool(&v, USE_CACHE_MSG)?;
        }
        if let Some(v) = env_var("SNS_VERIFY_MAX_CERTS") {
            config.max_certs = parse_positive(&v, MAX_CERTS_MSG)?;
        }
        if let Some(v) = env_var("SNS_VERIFY_AUTO_SUBSCRIBE") {
            config.auto_subscribe = parse_bool(&v, AUTO_SUBSCRIBE_MSG)?;
        }
        if let Some(v) = env_var("SNS_VERIFY_AUTO_RESUBSCRIBE") {
            config.auto_resubscribe = parse_bool(&v, AUTO_RESUBSCRIBE_MSG)?;
        }
        if let Some(v) = env_var("SNS_VERIFY_TIMEOUT") {
            config.timeout_secs = parse_positive(&v, TIMEOUT_MSG)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Build from a JSON options object with camelCase keys.
    ///
    /// Each key is type-checked on its own so a bad value reports which
    /// option was wrong. Missing keys take defaults; unknown keys are ignored.
    pub fn from_json(options: &Value) -> SnsResult<Self> {
        let Some(map) = options.as_object() else {
            return Err(SnsError::config("options must be an object"));
        };

        let mut config = Self::default();

        if let Some(v) = map.get("useCache") {
            config.use_cache = v.as_bool().ok_or_else(|| SnsError::config(USE_CACHE_MSG))?;
        }
        if let Some(v) = map.get("maxCerts") {
            config.max_certs = json_positive(v, MAX_CERTS_MSG)?;
        }
        if let Some(v) = map.get("autoSubscribe") {
            config.auto_subscribe = v
                .as_bool()
                .ok_or_else(|| SnsError::config(AUTO_SUBSCRIBE_MSG))?;
        }
        if let Some(v) = map.get("autoResubscribe") {
            config.auto_resubscribe = v
                .as_bool()
                .ok_or_else(|| SnsError::config(AUTO_RESUBSCRIBE_MSG))?;
        }
        if let Some(v) = map.get("timeoutSecs") {
            config.timeout_secs = json_positive(v, TIMEOUT_MSG)?;
        }

        Ok(config)
    }

    pub fn validate(&self) -> SnsResult<()> {
        if self.max_certs == 0 {
            return Err(SnsError::config(MAX_CERTS_MSG));
        }
        if self.timeout_secs == 0 {
            return Err(SnsError::config(TIMEOUT_MSG));
        }
        Ok(())
    }

    pub fn with_use_cache(mut self, enabled: bool) -> Self {
        self.use_cache = enabled;
        self
    }

    pub fn with_max_certs(mut self, max_certs: u64) -> Self {
        self.max_certs = max_certs;
        self
    }

    pub fn with_auto_subscribe(mut self, enabled: bool) -> Self {
        self.auto_subscribe = enabled;
        self
    }

    pub fn with_auto_resubscribe(mut self, enabled: bool) -> Self {
        self.auto_resubscribe = enabled;
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_bool(value: &str, message: &str) -> SnsResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        _ => Err(SnsError::config(message)),
    }
}

fn parse_positive(value: &str, message: &str) -> SnsResult<u64> {
    value
        .trim()
        .parse::<u64>()
        .ok()
        .filter(|n| *n >= 1)
        .ok_or_else(|| SnsError::config(message))
}

fn json_positive(value: &Value, message: &str) -> SnsResult<u64> {
    value
        .as_u64()
        .filter(|n| *n >= 1)
        .ok_or_else(|| SnsError::config(message))
}
