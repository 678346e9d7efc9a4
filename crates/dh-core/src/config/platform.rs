//! Platform connection configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable selecting the credential profile
pub const ENV_CONFIG_PROFILE: &str = "PLATFORM_CONFIG_PROFILE";

/// Environment variable overriding the API endpoint
pub const ENV_HOST: &str = "PLATFORM_HOST";

/// Configuration for talking to the workspace platform
///
/// Built once at process start from the config file plus environment
/// overrides, then passed down explicitly. Nothing reads the environment
/// after this point.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    /// Credential profile to select (None = the CLI's default profile)
    pub profile: Option<String>,

    /// API endpoint override (None = the profile's configured host)
    pub host: Option<String>,

    /// Name or path of the platform CLI binary
    pub cli_bin: String,

    /// Per-command timeout
    #[serde(with = "duration_secs")]
    pub command_timeout: Duration,

    /// Retry budgets for the retryable steps
    pub retry: RetryConfig,

    /// Backoff between retry attempts
    pub backoff: BackoffConfig,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            profile: None,
            host: None,
            cli_bin: "platform".to_string(),
            command_timeout: Duration::from_secs(120),
            retry: RetryConfig::default(),
            backoff: BackoffConfig::default(),
        }
    }
}

impl PlatformConfig {
    /// Load from a config file (missing file = defaults), then apply
    /// environment overrides
    pub fn load(path: Option<&std::path::Path>) -> Result<Self, crate::error::ConfigError> {
        let mut config = match path {
            Some(p) => super::load_config(p)?,
            None => {
                let default_path = super::default_config_path();
                if default_path.exists() {
                    super::load_config(&default_path)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Fold `PLATFORM_CONFIG_PROFILE` / `PLATFORM_HOST` into the struct
    fn apply_env_overrides(&mut self) {
        if let Ok(profile) = std::env::var(ENV_CONFIG_PROFILE) {
            if !profile.is_empty() {
                self.profile = Some(profile);
            }
        }
        if let Ok(host) = std::env::var(ENV_HOST) {
            if !host.is_empty() {
                self.host = Some(host);
            }
        }
    }
}

/// Retry budgets for the steps that may be retried
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Attempts for the existence check (must be at least 1)
    pub exists_attempts: u32,

    /// Attempts for the deploy step; 1 disables deploy retry
    pub deploy_attempts: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            exists_attempts: 3,
            deploy_attempts: 1,
        }
    }
}

/// Exponential backoff configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackoffConfig {
    /// Initial delay
    #[serde(with = "duration_secs")]
    pub initial: Duration,

    /// Maximum delay
    #[serde(with = "duration_secs")]
    pub max: Duration,

    /// Multiplier for each retry
    pub multiplier: f64,

    /// Jitter factor (0.0 to 1.0)
    pub jitter: f64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial: Duration::from_secs(1),
            max: Duration::from_secs(30),
            multiplier: 2.0,
            jitter: 0.25,
        }
    }
}

// Helper module for Duration serialization as seconds
mod duration_secs {
    use serde::{self, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
