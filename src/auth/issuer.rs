//! Token issuance.
//!
//! Four recipes, one per [`TokenKind`]:
//!
//! | Recipe | TTL |
//! |---|---|
//! | [`TokenIssuer::generate_token`] | configured default |
//! | [`TokenIssuer::generate_pre_org_selection_token`] | 15 minutes, fixed |
//! | [`TokenIssuer::generate_token_with_org_context`] | configured default |
//! | [`TokenIssuer::generate_service_account_token`] | `expiration_days` days |
//!
//! Interactive login is two-phase: after credentials are verified the user
//! gets a pre-org-selection token, and after picking an organization an
//! org-context token. The pre-org token is not invalidated when the
//! org-context token is issued; its short TTL bounds its exposure.
//!
//! # Example
//!
//! ```rust,ignore
//! use orgpass::auth::{GlobalRole, OrgRole, TokenService};
//!
//! let service = TokenService::initialize(&config)?;
//! let issuer = service.issuer();
//!
//! let pre_org = issuer.generate_pre_org_selection_token("alice", 42, GlobalRole::User, false)?;
//! // ... user picks organization 7 ...
//! let token = issuer.generate_token_with_org_context(
//!     "alice", 42, GlobalRole::User, 7, OrgRole::OrgAdmin, None,
//! )?;
//! ```

use super::claims::{GlobalRole, OrgRole, TokenClaims, TokenKind};
use super::codec::{TokenCodec, now_millis};
use crate::error::{AuthError, Result};

/// Lifetime of a pre-org-selection token: 15 minutes.
pub const PRE_ORG_SELECTION_TTL_MS: i64 = 15 * 60 * 1000;

pub const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Issues signed tokens.
#[derive(Clone, Debug)]
pub struct TokenIssuer {
    codec: TokenCodec,
    default_expiration_ms: i64,
}

impl TokenIssuer {
    /// Create an issuer whose standard and org-context tokens live `default_expiration_ms`.
    pub fn new(codec: TokenCodec, default_expiration_ms: i64) -> Result<Self> {
        if default_expiration_ms <= 0 {
            return Err(AuthError::configuration(format!(
                "Default token expiration must be greater than 0, got {}ms",
                default_expiration_ms
            )));
        }

        Ok(Self {
            codec,
            default_expiration_ms,
        })
    }

    /// Issue a token carrying only the subject.
    pub fn generate_token(&self, subject: &str) -> Result<String> {
        self.issue(subject, TokenKind::Standard, self.default_expiration_ms)
    }

    /// Issue the short-lived token handed out between credential check and
    /// organization selection.
    pub fn generate_pre_org_selection_token(
        &self,
        subject: &str,
        user_id: i64,
        global_role: GlobalRole,
        must_change_password: bool,
    ) -> Result<String> {
        self.issue(
            subject,
            TokenKind::PreOrgSelection {
                user_id,
                global_role,
                must_change_password,
            },
            PRE_ORG_SELECTION_TTL_MS,
        )
    }

    /// Issue the full token scoped to the organization the user selected.
    ///
    /// A missing `must_change_password` is recorded as `false`.
    pub fn generate_token_with_org_context(
        &self,
        subject: &str,
        user_id: i64,
        global_role: GlobalRole,
        organization_id: i64,
        org_role: OrgRole,
        must_change_password: Option<bool>,
    ) -> Result<String> {
        self.issue(
            subject,
            TokenKind::OrgContext {
                user_id,
                global_role,
                organization_id,
                org_role,
                must_change_password: must_change_password.unwrap_or(false),
            },
            self.default_expiration_ms,
        )
    }

    /// Issue a non-interactive credential valid for `expiration_days` days.
    pub fn generate_service_account_token(
        &self,
        subject: &str,
        token_name: &str,
        expiration_days: u32,
    ) -> Result<String> {
        if token_name.trim().is_empty() {
            return Err(AuthError::invalid_argument(
                "Service-account token name must not be empty",
            ));
        }
        if expiration_days == 0 {
            return Err(AuthError::invalid_argument(
                "Service-account token must be valid for at least one day",
            ));
        }

        let ttl_ms = i64::from(expiration_days)
            .checked_mul(MILLIS_PER_DAY)
            .ok_or_else(|| AuthError::invalid_argument("Service-account lifetime overflows"))?;

        self.issue(
            subject,
            TokenKind::ServiceAccount {
                token_name: token_name.to_string(),
            },
            ttl_ms,
        )
    }

    /// Lifetime of standard and org-context tokens, in milliseconds.
    pub fn default_expiration_ms(&self) -> i64 {
        self.default_expiration_ms
    }

    fn issue(&self, subject: &str, kind: TokenKind, ttl_ms: i64) -> Result<String> {
        if subject.trim().is_empty() {
            return Err(AuthError::invalid_argument("Token subject must not be empty"));
        }

        let issued_at = now_millis();
        let expires_at = issued_at
            .checked_add(ttl_ms)
            .ok_or_else(|| AuthError::invalid_argument("Token lifetime overflows"))?;

        let claims = TokenClaims::new(subject, issued_at, expires_at, kind);
        let token = self.codec.encode(&claims)?;

        tracing::debug!(
            subject = %claims.subject,
            token_type = claims.token_type(),
            ttl_ms,
            "Issued token"
        );

        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::secret::SecretPolicy;
    use crate::config::{ConfigBuilder, DEFAULT_EXPIRATION_MS, Profile};

    const SECRET: &str = "test-signing-secret-for-issuer-tests";

    fn codec() -> TokenCodec {
        let config = ConfigBuilder::new().with_secret(SECRET).build().unwrap();
        TokenCodec::new(SecretPolicy::enforce(&config.jwt, &Profile::Production).unwrap())
    }

    fn issuer(default_expiration_ms: i64) -> TokenIssuer {
        TokenIssuer::new(codec(), default_expiration_ms).unwrap()
    }

    #[test]
    fn test_generate_token_uses_default_expiration() {
        let issuer = issuer(DEFAULT_EXPIRATION_MS);
        let claims = codec().decode(&issuer.generate_token("alice").unwrap()).unwrap();

        assert_eq!(claims.subject, "alice");
        assert_eq!(claims.kind, TokenKind::Standard);
        assert_eq!(claims.ttl_ms(), 86_400_000);
    }

    #[test]
    fn test_pre_org_ttl_ignores_configured_default() {
        for default in [60_000, DEFAULT_EXPIRATION_MS, 30 * MILLIS_PER_DAY] {
            let token = issuer(default)
                .generate_pre_org_selection_token("alice", 42, GlobalRole::User, true)
                .unwrap();
            let claims = codec().decode(&token).unwrap();

            assert_eq!(claims.ttl_ms(), 900_000);
            assert!(claims.is_pre_org_selection());
            assert_eq!(claims.user_id(), Some(42));
            assert_eq!(claims.must_change_password(), Some(true));
            assert_eq!(claims.organization_id(), None);
        }
    }

    #[test]
    fn test_org_context_defaults_must_change_password() {
        let issuer = issuer(120_000);
        let token = issuer
            .generate_token_with_org_context(
                "alice",
                42,
                GlobalRole::SuperAdmin,
                7,
                OrgRole::User,
                None,
            )
            .unwrap();
        let claims = codec().decode(&token).unwrap();

        assert_eq!(claims.ttl_ms(), 120_000);
        assert_eq!(claims.global_role(), Some(GlobalRole::SuperAdmin));
        assert_eq!(claims.organization_id(), Some(7));
        assert_eq!(claims.org_role(), Some(OrgRole::User));
        assert_eq!(claims.must_change_password(), Some(false));
        assert!(!claims.is_pre_org_selection());
    }

    #[test]
    fn test_service_account_lifetime_in_days() {
        let token = issuer(DEFAULT_EXPIRATION_MS)
            .generate_service_account_token("ci-bot", "deploy-key", 7)
            .unwrap();
        let claims = codec().decode(&token).unwrap();

        assert_eq!(claims.ttl_ms(), 7 * MILLIS_PER_DAY);
        assert_eq!(claims.token_name(), Some("deploy-key"));
        assert_eq!(claims.token_type(), "service-account");
        assert_eq!(claims.global_role(), None);
        assert_eq!(claims.organization_id(), None);
    }

    #[test]
    fn test_preconditions() {
        let issuer = issuer(DEFAULT_EXPIRATION_MS);

        assert!(matches!(
            issuer.generate_token(""),
            Err(AuthError::InvalidArgument(_))
        ));
        assert!(matches!(
            issuer.generate_token("   "),
            Err(AuthError::InvalidArgument(_))
        ));
        assert!(matches!(
            issuer.generate_service_account_token("ci-bot", "", 7),
            Err(AuthError::InvalidArgument(_))
        ));
        assert!(matches!(
            issuer.generate_service_account_token("ci-bot", "deploy", 0),
            Err(AuthError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_rejects_non_positive_default_expiration() {
        assert!(TokenIssuer::new(codec(), 0).is_err());
        assert!(TokenIssuer::new(codec(), -1).is_err());
    }
}
