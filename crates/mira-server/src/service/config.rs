//! Service configuration.

#[cfg(any(test, feature = "config"))]
use clap::Args;
use mira_auth::catalog::CatalogError;
use serde::{Deserialize, Serialize};

/// Token signing and lifetime configuration.
///
/// Deserializable from a config file and, with the `config` feature, usable
/// as a `clap` argument group with environment-variable defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(any(test, feature = "config"), derive(Args))]
pub struct ServiceConfig {
    /// Shared secret used to sign and verify session tokens.
    #[cfg_attr(any(test, feature = "config"), arg(long, env = "AUTH_TOKEN_SECRET"))]
    pub token_secret: String,

    /// Access-token lifetime in minutes.
    #[cfg_attr(
        any(test, feature = "config"),
        arg(long, env = "AUTH_ACCESS_TTL_MINUTES", default_value_t = Self::default_access_ttl())
    )]
    #[serde(default = "ServiceConfig::default_access_ttl")]
    pub access_ttl_minutes: i64,

    /// Refresh-token lifetime in minutes.
    #[cfg_attr(
        any(test, feature = "config"),
        arg(long, env = "AUTH_REFRESH_TTL_MINUTES", default_value_t = Self::default_refresh_ttl())
    )]
    #[serde(default = "ServiceConfig::default_refresh_ttl")]
    pub refresh_ttl_minutes: i64,
}

impl ServiceConfig {
    /// Minimum accepted secret length in bytes.
    pub const MIN_SECRET_LENGTH: usize = 32;

    const fn default_access_ttl() -> i64 {
        30
    }

    const fn default_refresh_ttl() -> i64 {
        5 * 24 * 60
    }

    /// Creates a configuration with default lifetimes.
    pub fn new(token_secret: impl Into<String>) -> Self {
        Self {
            token_secret: token_secret.into(),
            access_ttl_minutes: Self::default_access_ttl(),
            refresh_ttl_minutes: Self::default_refresh_ttl(),
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Rejects secrets shorter than [`Self::MIN_SECRET_LENGTH`] bytes and
    /// non-positive lifetimes.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.token_secret.len() < Self::MIN_SECRET_LENGTH {
            return Err(ConfigError::WeakSecret {
                min_length: Self::MIN_SECRET_LENGTH,
            });
        }
        if self.access_ttl_minutes <= 0 || self.refresh_ttl_minutes <= 0 {
            return Err(ConfigError::InvalidLifetime);
        }
        Ok(())
    }
}

/// Configuration and startup failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The signing secret is too short to be safe.
    #[error("token secret must be at least {min_length} bytes")]
    WeakSecret { min_length: usize },

    /// A token lifetime is zero or negative.
    #[error("token lifetimes must be positive")]
    InvalidLifetime,

    /// The built-in permission catalog failed validation.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret() -> String {
        "0123456789abcdef0123456789abcdef".to_owned()
    }

    #[test]
    fn default_lifetimes_match_constants() {
        let config = ServiceConfig::new(secret());
        assert_eq!(config.access_ttl_minutes, 30);
        assert_eq!(config.refresh_ttl_minutes, 7200);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn short_secret_is_rejected() {
        let config = ServiceConfig::new("hunter2");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::WeakSecret { .. })
        ));
    }

    #[test]
    fn non_positive_lifetimes_are_rejected() {
        let mut config = ServiceConfig::new(secret());
        config.access_ttl_minutes = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidLifetime)
        ));
    }

    #[test]
    fn clap_parses_with_env_style_flags() {
        #[derive(clap::Parser)]
        struct Cli {
            #[command(flatten)]
            config: ServiceConfig,
        }

        use clap::Parser as _;
        let cli = Cli::parse_from([
            "mira-server",
            "--token-secret",
            "0123456789abcdef0123456789abcdef",
            "--access-ttl-minutes",
            "15",
        ]);
        assert_eq!(cli.config.access_ttl_minutes, 15);
        assert_eq!(cli.config.refresh_ttl_minutes, 7200);
    }

    #[test]
    fn serde_fills_in_default_lifetimes() -> anyhow::Result<()> {
        let config: ServiceConfig = serde_json::from_value(serde_json::json!({
            "token_secret": secret(),
        }))?;
        assert_eq!(config.access_ttl_minutes, 30);
        assert_eq!(config.refresh_ttl_minutes, 7200);
        Ok(())
    }
}
