//! Startup validation of the signing secret.
//!
//! [`SecretPolicy::enforce`] is the only producer of a [`VerifiedSecret`],
//! and a [`TokenCodec`](crate::auth::TokenCodec) cannot be built without one,
//! so no token can be signed or checked until the secret has passed.

use secrecy::{ExposeSecret, SecretString};
use std::fmt;

use crate::config::{JwtConfig, Profile};
use crate::error::{AuthError, Result};

/// Markers found in sample and development secrets (matched case-insensitively).
const PLACEHOLDER_MARKERS: &[&str] = &[
    "changeme",
    "change-me",
    "change_me",
    "dev-secret",
    "dev_secret",
    "development",
    "placeholder",
    "your-secret",
    "your_secret",
    "example",
    "insecure",
    "default-secret",
    "not-a-secret",
];

/// How an accepted secret was judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretAssessment {
    /// Long enough and not a known placeholder.
    Accepted,
    /// Placeholder secret tolerated in staging.
    AcceptedWithWarning,
    /// Placeholder secret in development or an unrecognized profile.
    AcceptedDevelopment,
}

/// A signing secret that passed [`SecretPolicy`].
pub struct VerifiedSecret {
    key: SecretString,
    assessment: SecretAssessment,
}

impl VerifiedSecret {
    pub fn assessment(&self) -> SecretAssessment {
        self.assessment
    }

    pub(crate) fn key_bytes(&self) -> &[u8] {
        self.key.expose_secret().as_bytes()
    }
}

impl fmt::Debug for VerifiedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerifiedSecret")
            .field("key", &"[REDACTED]")
            .field("assessment", &self.assessment)
            .finish()
    }
}

/// Fail-fast checks on the configured signing secret.
pub struct SecretPolicy;

impl SecretPolicy {
    /// Minimum secret length in characters (256 bits for HS256).
    pub const MIN_SECRET_LENGTH: usize = 32;

    /// Validate the configured secret for the active profile.
    ///
    /// # Errors
    ///
    /// [`AuthError::Configuration`] when the secret is missing, blank,
    /// shorter than [`Self::MIN_SECRET_LENGTH`], or a placeholder in production.
    pub fn enforce(config: &JwtConfig, profile: &Profile) -> Result<VerifiedSecret> {
        let secret = config.secret.as_ref().ok_or_else(|| {
            AuthError::configuration(
                "JWT secret is not configured. Set ORGPASS_JWT_SECRET or JWT_SECRET",
            )
        })?;

        let assessment = Self::assess(secret.expose_secret(), profile)?;

        Ok(VerifiedSecret {
            key: secret.clone(),
            assessment,
        })
    }

    /// Run the checks on a raw secret without producing a [`VerifiedSecret`].
    pub fn assess(secret: &str, profile: &Profile) -> Result<SecretAssessment> {
        if secret.trim().is_empty() {
            return Err(AuthError::configuration("JWT secret must not be blank"));
        }

        let length = secret.chars().count();
        if length < Self::MIN_SECRET_LENGTH {
            return Err(AuthError::configuration(format!(
                "JWT secret must be at least {} characters, got {}",
                Self::MIN_SECRET_LENGTH,
                length
            )));
        }

        if !Self::is_placeholder(secret) {
            return Ok(SecretAssessment::Accepted);
        }

        match profile {
            Profile::Production => {
                tracing::error!("Refusing to start: JWT secret is a development placeholder");
                Err(AuthError::configuration(
                    "JWT secret is a development placeholder and cannot be used in production",
                ))
            }
            Profile::Staging => {
                tracing::warn!(
                    profile = %profile,
                    "JWT secret looks like a development placeholder. Replace it before production"
                );
                Ok(SecretAssessment::AcceptedWithWarning)
            }
            Profile::Development | Profile::Other(_) => {
                tracing::info!(profile = %profile, "Using development JWT secret");
                Ok(SecretAssessment::AcceptedDevelopment)
            }
        }
    }

    /// Whether the secret matches a known development-placeholder pattern.
    pub fn is_placeholder(secret: &str) -> bool {
        let lowered = secret.to_lowercase();
        if PLACEHOLDER_MARKERS
            .iter()
            .any(|marker| lowered.contains(marker))
        {
            return true;
        }

        let mut chars = secret.chars();
        match chars.next() {
            Some(first) => chars.all(|c| c == first),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigBuilder;

    const STRONG: &str = "01234567890123456789012345678901";
    const PLACEHOLDER: &str = "dev-secret-change-me-before-going-live";

    fn jwt_config(secret: Option<&str>) -> JwtConfig {
        let builder = ConfigBuilder::new();
        let builder = match secret {
            Some(secret) => builder.with_secret(secret),
            None => builder,
        };
        builder.build().unwrap().jwt
    }

    #[test]
    fn test_missing_secret_is_fatal() {
        let err = SecretPolicy::enforce(&jwt_config(None), &Profile::Development).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_blank_secret_is_fatal() {
        let wide = " ".repeat(40);
        for secret in ["", "   ", wide.as_str()] {
            let result = SecretPolicy::assess(secret, &Profile::Development);
            assert!(matches!(result, Err(AuthError::Configuration(_))));
        }
    }

    #[test]
    fn test_length_boundary() {
        for len in 0..SecretPolicy::MIN_SECRET_LENGTH {
            let secret: String = STRONG.chars().take(len).collect();
            assert!(
                SecretPolicy::assess(&secret, &Profile::Production).is_err(),
                "secret of length {} should be rejected",
                len
            );
        }

        assert_eq!(
            SecretPolicy::assess(STRONG, &Profile::Production).unwrap(),
            SecretAssessment::Accepted
        );
        let longer = format!("{}{}", STRONG, "abcdef");
        assert!(SecretPolicy::assess(&longer, &Profile::Production).is_ok());
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        // 31 two-byte characters: 62 bytes but still too short
        let secret = "é".repeat(31);
        assert!(SecretPolicy::assess(&secret, &Profile::Development).is_err());
    }

    #[test]
    fn test_placeholder_rejected_in_production() {
        let err = SecretPolicy::assess(PLACEHOLDER, &Profile::Production).unwrap_err();
        assert!(err.is_fatal());
        assert!(err.to_string().contains("production"));
    }

    #[test]
    fn test_placeholder_warns_in_staging() {
        assert_eq!(
            SecretPolicy::assess(PLACEHOLDER, &Profile::Staging).unwrap(),
            SecretAssessment::AcceptedWithWarning
        );
    }

    #[test]
    fn test_placeholder_allowed_in_development() {
        assert_eq!(
            SecretPolicy::assess(PLACEHOLDER, &Profile::Development).unwrap(),
            SecretAssessment::AcceptedDevelopment
        );
        assert_eq!(
            SecretPolicy::assess(PLACEHOLDER, &Profile::Other("qa".to_string())).unwrap(),
            SecretAssessment::AcceptedDevelopment
        );
    }

    #[test]
    fn test_placeholder_detection() {
        assert!(SecretPolicy::is_placeholder("YOUR-SECRET-KEY-GOES-HERE-PLEASE-OK"));
        assert!(SecretPolicy::is_placeholder(&"a".repeat(64)));
        assert!(!SecretPolicy::is_placeholder(STRONG));
        assert!(!SecretPolicy::is_placeholder("k3J9x!q2Lm8#Zp4Rt7Vw1Yb6Nc0Hs5Df"));
    }

    #[test]
    fn test_enforce_keeps_assessment() {
        let verified =
            SecretPolicy::enforce(&jwt_config(Some(PLACEHOLDER)), &Profile::Staging).unwrap();
        assert_eq!(verified.assessment(), SecretAssessment::AcceptedWithWarning);
        assert_eq!(verified.key_bytes(), PLACEHOLDER.as_bytes());
    }

    #[test]
    fn test_debug_redacts_key() {
        let verified =
            SecretPolicy::enforce(&jwt_config(Some(STRONG)), &Profile::Production).unwrap();
        let debug = format!("{:?}", verified);
        assert!(!debug.contains(STRONG));
        assert!(debug.contains("REDACTED"));
    }
}
