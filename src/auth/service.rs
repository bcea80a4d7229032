//! Startup wiring for the token surface.
//!
//! [`TokenService::initialize`] is the single initialization barrier: it runs
//! [`SecretPolicy`] once, and only on success hands out the issuer and
//! validator. Call it before serving any request and abort startup on error.
//!
//! ```rust,ignore
//! use orgpass::{ConfigBuilder, auth::TokenService};
//!
//! let config = ConfigBuilder::new().from_env().build()?;
//! let tokens = TokenService::initialize(&config)?;
//!
//! let token = tokens.issuer().generate_token("alice")?;
//! assert!(tokens.validator().validate(&token, "alice"));
//! ```

use super::codec::TokenCodec;
use super::issuer::TokenIssuer;
use super::secret::{SecretAssessment, SecretPolicy};
use super::validator::TokenValidator;
use crate::config::{Config, ConfigBuilder, Profile};
use crate::error::Result;

/// Issuer and validator sharing one verified signing key.
///
/// `Send + Sync` and cheap to clone; share it across request handlers.
#[derive(Clone, Debug)]
pub struct TokenService {
    issuer: TokenIssuer,
    validator: TokenValidator,
    profile: Profile,
    assessment: SecretAssessment,
}

impl TokenService {
    /// Validate the signing secret and build the token surface.
    ///
    /// # Errors
    ///
    /// [`AuthError::Configuration`](crate::AuthError::Configuration) if the
    /// secret is missing, too short, or a placeholder in production, or if
    /// the default expiration is not positive.
    pub fn initialize(config: &Config) -> Result<Self> {
        let secret = SecretPolicy::enforce(&config.jwt, &config.profile)?;
        let assessment = secret.assessment();

        let codec = TokenCodec::new(secret);
        let issuer = TokenIssuer::new(codec.clone(), config.jwt.default_expiration_ms)?;
        let validator = TokenValidator::new(codec);

        tracing::info!(
            profile = %config.profile,
            default_expiration_ms = config.jwt.default_expiration_ms,
            "Token service initialized"
        );

        Ok(Self {
            issuer,
            validator,
            profile: config.profile.clone(),
            assessment,
        })
    }

    /// Load [`Config`] from the environment and initialize.
    pub fn from_env() -> Result<Self> {
        let config = ConfigBuilder::new().from_env().build()?;
        Self::initialize(&config)
    }

    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    pub fn validator(&self) -> &TokenValidator {
        &self.validator
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// How the signing secret was judged at startup.
    pub fn secret_assessment(&self) -> SecretAssessment {
        self.assessment
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AuthError;

    fn config(secret: Option<&str>, profile: Profile) -> Config {
        let builder = ConfigBuilder::new().with_profile(profile);
        let builder = match secret {
            Some(secret) => builder.with_secret(secret),
            None => builder,
        };
        builder.build().unwrap()
    }

    #[test]
    fn test_initialize_with_strong_secret() {
        let service = TokenService::initialize(&config(
            Some("01234567890123456789012345678901"),
            Profile::Production,
        ))
        .unwrap();

        assert_eq!(service.secret_assessment(), SecretAssessment::Accepted);
        assert_eq!(service.profile(), &Profile::Production);
        assert_eq!(service.issuer().default_expiration_ms(), 86_400_000);

        let token = service.issuer().generate_token("alice").unwrap();
        assert!(service.validator().validate(&token, "alice"));
    }

    #[test]
    fn test_initialize_fails_without_secret() {
        let err = TokenService::initialize(&config(None, Profile::Development)).unwrap_err();
        assert!(matches!(err, AuthError::Configuration(_)));
    }

    #[test]
    fn test_initialize_fails_on_short_secret() {
        let err =
            TokenService::initialize(&config(Some("too-short"), Profile::Development)).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_placeholder_secret_depends_on_profile() {
        let placeholder = Some("changeme-changeme-changeme-changeme");
        assert!(TokenService::initialize(&config(placeholder, Profile::Production)).is_err());

        let staging = TokenService::initialize(&config(placeholder, Profile::Staging)).unwrap();
        assert_eq!(
            staging.secret_assessment(),
            SecretAssessment::AcceptedWithWarning
        );
    }

    #[test]
    fn test_service_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TokenService>();
        assert_send_sync::<TokenIssuer>();
        assert_send_sync::<TokenValidator>();
        assert_send_sync::<TokenCodec>();
    }
}
