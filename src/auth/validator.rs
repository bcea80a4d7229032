//! Token validation and claim extraction.
//!
//! Every accessor decodes the token again, so an invalid, tampered or
//! expired token fails the same way from each entry point. A valid token
//! that simply lacks the requested claim (asking a pre-org-selection token
//! for its organization, say) yields `Ok(None)`.

use chrono::{DateTime, Utc};

use super::claims::{GlobalRole, OrgRole, TokenClaims};
use super::codec::{TokenCodec, now_millis};
use crate::error::{AuthError, Result};

/// Checks tokens against an expected principal and reads their claims.
#[derive(Clone, Debug)]
pub struct TokenValidator {
    codec: TokenCodec,
}

impl TokenValidator {
    pub fn new(codec: TokenCodec) -> Self {
        Self { codec }
    }

    /// Whether `token` is authentic, unexpired and issued to `expected_subject`.
    pub fn validate(&self, token: &str, expected_subject: &str) -> bool {
        match self.verify(token, expected_subject) {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!(code = e.code(), "Token failed validation");
                false
            }
        }
    }

    /// Like [`validate`](Self::validate), but returns the claims or the reason for rejection.
    pub fn verify(&self, token: &str, expected_subject: &str) -> Result<TokenClaims> {
        self.verify_at(token, expected_subject, now_millis())
    }

    pub fn verify_at(
        &self,
        token: &str,
        expected_subject: &str,
        now_ms: i64,
    ) -> Result<TokenClaims> {
        let claims = self.codec.decode_at(token, now_ms)?;

        if claims.subject != expected_subject {
            tracing::warn!(
                expected = %expected_subject,
                actual = %claims.subject,
                "Token presented for a different principal"
            );
            return Err(AuthError::ClaimMismatch {
                expected: expected_subject.to_string(),
                actual: claims.subject,
            });
        }

        Ok(claims)
    }

    pub fn extract_claims(&self, token: &str) -> Result<TokenClaims> {
        self.codec.decode(token)
    }

    pub fn extract_subject(&self, token: &str) -> Result<String> {
        Ok(self.extract_claims(token)?.subject)
    }

    pub fn extract_issued_at(&self, token: &str) -> Result<DateTime<Utc>> {
        self.extract_claims(token)?
            .issued_at_datetime()
            .ok_or_else(|| AuthError::malformed("issue time is out of range"))
    }

    pub fn extract_expiration(&self, token: &str) -> Result<DateTime<Utc>> {
        self.extract_claims(token)?
            .expiration()
            .ok_or_else(|| AuthError::malformed("expiration is out of range"))
    }

    pub fn extract_user_id(&self, token: &str) -> Result<Option<i64>> {
        Ok(self.extract_claims(token)?.user_id())
    }

    pub fn extract_global_role(&self, token: &str) -> Result<Option<GlobalRole>> {
        Ok(self.extract_claims(token)?.global_role())
    }

    pub fn extract_organization_id(&self, token: &str) -> Result<Option<i64>> {
        Ok(self.extract_claims(token)?.organization_id())
    }

    pub fn extract_org_role(&self, token: &str) -> Result<Option<OrgRole>> {
        Ok(self.extract_claims(token)?.org_role())
    }

    pub fn extract_must_change_password(&self, token: &str) -> Result<Option<bool>> {
        Ok(self.extract_claims(token)?.must_change_password())
    }

    pub fn extract_token_name(&self, token: &str) -> Result<Option<String>> {
        Ok(self.extract_claims(token)?.token_name().map(String::from))
    }

    /// Wire discriminator of the token (`access`, `pre-org-selection`, ...).
    pub fn extract_token_type(&self, token: &str) -> Result<&'static str> {
        Ok(self.extract_claims(token)?.token_type())
    }

    pub fn is_pre_org_selection(&self, token: &str) -> Result<bool> {
        Ok(self.extract_claims(token)?.is_pre_org_selection())
    }
}
