use secrecy::SecretString;
use std::fmt;
use std::time::Duration;

use crate::error::{AuthError, Result};
use crate::utils::{first_env_with_prefix, get_env_with_prefix};

/// Default token lifetime: 24 hours.
pub const DEFAULT_EXPIRATION_MS: i64 = 86_400_000;

/// Main configuration for an orgpass token service
#[derive(Debug, Clone)]
pub struct Config {
    pub jwt: JwtConfig,
    pub logging: LoggingConfig,
    pub profile: Profile,
}

/// Signing settings.
///
/// The secret has no default. Its strength is judged by
/// [`SecretPolicy`](crate::auth::SecretPolicy) during initialization, not here.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: Option<SecretString>,
    /// Lifetime of standard and org-context tokens, in milliseconds
    pub default_expiration_ms: i64,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// One of trace, debug, info, warn, error
    pub level: String,
    pub json: bool,
}

/// Deployment profile, used only to decide how loudly a placeholder secret is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Profile {
    #[default]
    Development,
    Staging,
    Production,
    Other(String),
}

impl Profile {
    /// Parse a profile name, case-insensitively.
    ///
    /// A comma-separated list is accepted; the strictest profile in the list wins.
    pub fn parse(raw: &str) -> Self {
        let names: Vec<String> = raw
            .split(',')
            .map(|name| name.trim().to_lowercase())
            .filter(|name| !name.is_empty())
            .collect();

        if names.iter().any(|n| n == "prod" || n == "production") {
            return Profile::Production;
        }
        if names.iter().any(|n| n == "staging" || n == "stage") {
            return Profile::Staging;
        }
        match names.first().map(String::as_str) {
            None | Some("dev") | Some("development") => Profile::Development,
            Some(other) => Profile::Other(other.to_string()),
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Profile::Production)
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Profile::Development => write!(f, "development"),
            Profile::Staging => write!(f, "staging"),
            Profile::Production => write!(f, "production"),
            Profile::Other(name) => write!(f, "{}", name),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            jwt: JwtConfig::default(),
            logging: LoggingConfig::default(),
            profile: Profile::default(),
        }
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: None,
            default_expiration_ms: DEFAULT_EXPIRATION_MS,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Builder for Config with environment variable support
#[must_use = "builder does nothing until you call build()"]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.config.jwt.secret = Some(SecretString::from(secret.into()));
        self
    }

    pub fn with_default_expiration_ms(mut self, expiration_ms: i64) -> Self {
        self.config.jwt.default_expiration_ms = expiration_ms;
        self
    }

    pub fn with_default_expiration(mut self, expiration: Duration) -> Self {
        self.config.jwt.default_expiration_ms =
            i64::try_from(expiration.as_millis()).unwrap_or(i64::MAX);
        self
    }

    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.config.profile = profile;
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn with_json_logging(mut self, enabled: bool) -> Self {
        self.config.logging.json = enabled;
        self
    }

    /// Load configuration from environment variables with ORGPASS_ prefix
    ///
    /// - `JWT_SECRET`: signing secret
    /// - `JWT_EXPIRATION_MS`: default token lifetime in milliseconds
    /// - `PROFILE` / `APP_PROFILE`: active deployment profile
    /// - `LOG_LEVEL`, `LOG_JSON`: logging output
    pub fn from_env(mut self) -> Self {
        if let Some(secret) = get_env_with_prefix("JWT_SECRET") {
            self.config.jwt.secret = Some(SecretString::from(secret));
        }
        if let Some(expiration) = get_env_with_prefix("JWT_EXPIRATION_MS") {
            match expiration.trim().parse() {
                Ok(ms) => self.config.jwt.default_expiration_ms = ms,
                Err(_) => tracing::warn!(
                    value = %expiration,
                    "Ignoring unparsable JWT_EXPIRATION_MS, keeping default"
                ),
            }
        }
        if let Some(profile) = first_env_with_prefix(&["PROFILE", "APP_PROFILE"]) {
            self.config.profile = Profile::parse(&profile);
        }
        if let Some(level) = get_env_with_prefix("LOG_LEVEL") {
            self.config.logging.level = level;
        }
        if let Some(json) = get_env_with_prefix("LOG_JSON") {
            self.config.logging.json = json.parse().unwrap_or(false);
        }

        self
    }

    /// Build the configuration, validating all settings
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Configuration`] for an unknown log level or a
    /// non-positive default expiration. The secret itself is checked later
    /// by [`SecretPolicy`](crate::auth::SecretPolicy).
    pub fn build(self) -> Result<Config> {
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.config.logging.level.to_lowercase().as_str()) {
            return Err(AuthError::configuration(format!(
                "Invalid log level: {}. Must be one of: {}",
                self.config.logging.level,
                valid_log_levels.join(", ")
            )));
        }

        if self.config.jwt.default_expiration_ms <= 0 {
            return Err(AuthError::configuration(format!(
                "Default token expiration must be greater than 0, got {}ms",
                self.config.jwt.default_expiration_ms
            )));
        }

        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
