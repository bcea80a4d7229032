//! orgpass - stateless signed tokens for organization-scoped login
//!
//! Issues and verifies compact HS256 tokens for a two-phase login flow
//! (credentials, then organization selection) plus long-lived service
//! account credentials. The signing secret is checked once at startup and
//! nothing can sign or verify a token until that check passes.
//!
//! # Features
//!
//! - **Startup secret policy**: length and placeholder checks, stricter in production
//! - **Four token kinds**: standard, pre-org-selection, org-context, service account
//! - **Typed claims**: one variant per token kind, permissive cross-kind accessors
//! - **Stateless**: no revocation store, expiry checked on every decode
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use orgpass::{ConfigBuilder, auth::TokenService};
//!
//! fn main() -> orgpass::Result<()> {
//!     orgpass::init_tracing()?;
//!
//!     let config = ConfigBuilder::new().from_env().build()?;
//!     let tokens = TokenService::initialize(&config)?;
//!
//!     let token = tokens.issuer().generate_token("alice")?;
//!     assert!(tokens.validator().validate(&token, "alice"));
//!     Ok(())
//! }
//! ```

pub mod auth;
mod config;
mod error;
mod utils;

pub use auth::{
    GlobalRole, OrgRole, SecretAssessment, SecretPolicy, TokenClaims, TokenCodec, TokenIssuer,
    TokenKind, TokenService, TokenValidator,
};
pub use config::{Config, ConfigBuilder, DEFAULT_EXPIRATION_MS, JwtConfig, LoggingConfig, Profile};
pub use error::{AuthError, Result};

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging with sensible defaults
///
/// # Environment Variables
///
/// - `RUST_LOG`: Set log level (e.g., "info", "debug", "orgpass=debug")
/// - `ORGPASS_LOG_JSON`: Set to "true" for JSON formatted logs
///
/// # Errors
///
/// [`AuthError::Configuration`] if a global subscriber is already installed.
pub fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = utils::get_env_with_prefix("LOG_JSON")
        .and_then(|v| v.parse().ok())
        .unwrap_or(false);

    install_subscriber(filter, json)
}

/// Initialize tracing from [`LoggingConfig`], ignoring `RUST_LOG`.
pub fn init_tracing_with_config(config: &Config) -> Result<()> {
    install_subscriber(EnvFilter::new(&config.logging.level), config.logging.json)
}

fn install_subscriber(filter: EnvFilter, json: bool) -> Result<()> {
    let registry = tracing_subscriber::registry().with(filter);
    let installed = if json {
        registry.with(tracing_subscriber::fmt::layer().json()).try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };

    installed.map_err(|e| AuthError::configuration(format!("Tracing already initialized: {}", e)))
}
