//! Token claims.
//!
//! Every token carries a common header (subject, issue and expiry instants)
//! and one of four claim shapes. On the wire the claims are a flat camelCase
//! JSON object with a `tokenType` discriminator:
//!
//! ```json
//! {"sub":"alice","iat":1700000000000,"exp":1700086400000,
//!  "tokenType":"org-context","userId":42,"globalRole":"USER",
//!  "organizationId":7,"orgRole":"ORG_ADMIN","mustChangePassword":false}
//! ```
//!
//! `iat` and `exp` are epoch milliseconds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AuthError;

/// Platform-wide role of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GlobalRole {
    SuperAdmin,
    User,
}

/// Role of a user inside one organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrgRole {
    OrgAdmin,
    User,
}

impl GlobalRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            GlobalRole::SuperAdmin => "SUPER_ADMIN",
            GlobalRole::User => "USER",
        }
    }
}

impl OrgRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrgRole::OrgAdmin => "ORG_ADMIN",
            OrgRole::User => "USER",
        }
    }
}

impl fmt::Display for GlobalRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for OrgRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GlobalRole {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "SUPER_ADMIN" => Ok(GlobalRole::SuperAdmin),
            "USER" => Ok(GlobalRole::User),
            other => Err(AuthError::invalid_argument(format!(
                "Unknown global role: {}",
                other
            ))),
        }
    }
}

impl FromStr for OrgRole {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ORG_ADMIN" => Ok(OrgRole::OrgAdmin),
            "USER" => Ok(OrgRole::User),
            other => Err(AuthError::invalid_argument(format!(
                "Unknown organization role: {}",
                other
            ))),
        }
    }
}

/// Claim shape of a token, one per issuance recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Subject only.
    Standard,
    /// Issued after credentials are verified, before an organization is chosen.
    PreOrgSelection {
        user_id: i64,
        global_role: GlobalRole,
        must_change_password: bool,
    },
    /// Issued once the user has selected an organization.
    OrgContext {
        user_id: i64,
        global_role: GlobalRole,
        organization_id: i64,
        org_role: OrgRole,
        must_change_password: bool,
    },
    /// Long-lived, non-interactive credential.
    ServiceAccount { token_name: String },
}

impl TokenKind {
    pub const STANDARD: &'static str = "access";
    pub const PRE_ORG_SELECTION: &'static str = "pre-org-selection";
    pub const ORG_CONTEXT: &'static str = "org-context";
    pub const SERVICE_ACCOUNT: &'static str = "service-account";

    /// Wire value of the `tokenType` discriminator.
    pub fn token_type(&self) -> &'static str {
        match self {
            TokenKind::Standard => Self::STANDARD,
            TokenKind::PreOrgSelection { .. } => Self::PRE_ORG_SELECTION,
            TokenKind::OrgContext { .. } => Self::ORG_CONTEXT,
            TokenKind::ServiceAccount { .. } => Self::SERVICE_ACCOUNT,
        }
    }
}

/// Decoded contents of a signed token.
///
/// Immutable once built: issuance creates one, signs it, and drops it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WireClaims", into = "WireClaims")]
pub struct TokenClaims {
    pub subject: String,
    /// Issue instant, epoch milliseconds
    pub issued_at: i64,
    /// Expiry instant, epoch milliseconds
    pub expires_at: i64,
    pub kind: TokenKind,
}

impl TokenClaims {
    pub fn new(
        subject: impl Into<String>,
        issued_at: i64,
        expires_at: i64,
        kind: TokenKind,
    ) -> Self {
        Self {
            subject: subject.into(),
            issued_at,
            expires_at,
            kind,
        }
    }

    /// Check the invariants every signed token must satisfy.
    pub fn check_invariants(&self) -> Result<(), String> {
        if self.subject.trim().is_empty() {
            return Err("subject must not be empty".to_string());
        }
        if self.expires_at < self.issued_at {
            return Err(format!(
                "expiry {} precedes issue time {}",
                self.expires_at, self.issued_at
            ));
        }
        if let TokenKind::ServiceAccount { token_name } = &self.kind {
            if token_name.trim().is_empty() {
                return Err("service-account token name must not be empty".to_string());
            }
        }
        Ok(())
    }

    pub fn token_type(&self) -> &'static str {
        self.kind.token_type()
    }

    pub fn user_id(&self) -> Option<i64> {
        match &self.kind {
            TokenKind::PreOrgSelection { user_id, .. } | TokenKind::OrgContext { user_id, .. } => {
                Some(*user_id)
            }
            _ => None,
        }
    }

    pub fn global_role(&self) -> Option<GlobalRole> {
        match &self.kind {
            TokenKind::PreOrgSelection { global_role, .. }
            | TokenKind::OrgContext { global_role, .. } => Some(*global_role),
            _ => None,
        }
    }

    pub fn organization_id(&self) -> Option<i64> {
        match &self.kind {
            TokenKind::OrgContext {
                organization_id, ..
            } => Some(*organization_id),
            _ => None,
        }
    }

    pub fn org_role(&self) -> Option<OrgRole> {
        match &self.kind {
            TokenKind::OrgContext { org_role, .. } => Some(*org_role),
            _ => None,
        }
    }

    /// `None` for token kinds that never carry the flag.
    pub fn must_change_password(&self) -> Option<bool> {
        match &self.kind {
            TokenKind::PreOrgSelection {
                must_change_password,
                ..
            }
            | TokenKind::OrgContext {
                must_change_password,
                ..
            } => Some(*must_change_password),
            _ => None,
        }
    }

    pub fn is_pre_org_selection(&self) -> bool {
        matches!(self.kind, TokenKind::PreOrgSelection { .. })
    }

    pub fn is_service_account(&self) -> bool {
        matches!(self.kind, TokenKind::ServiceAccount { .. })
    }

    pub fn token_name(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::ServiceAccount { token_name } => Some(token_name),
            _ => None,
        }
    }

    /// Lifetime the token was issued with, in milliseconds.
    pub fn ttl_ms(&self) -> i64 {
        self.expires_at.saturating_sub(self.issued_at)
    }

    pub fn issued_at_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.issued_at)
    }

    pub fn expiration(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.expires_at)
    }

    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        self.expires_at <= now_ms
    }

    /// Milliseconds left before expiry, floored at zero.
    pub fn remaining_ttl_ms(&self, now_ms: i64) -> i64 {
        self.expires_at.saturating_sub(now_ms).max(0)
    }
}

/// Flat JSON layout of the claims.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireClaims {
    sub: String,
    iat: i64,
    exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    global_role: Option<GlobalRole>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    organization_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    org_role: Option<OrgRole>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    must_change_password: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pre_org_selection: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token_name: Option<String>,
}

impl WireClaims {
    /// Discriminator, falling back to the payload shape when `tokenType` is absent.
    fn resolve_token_type(&self) -> &str {
        if let Some(token_type) = self.token_type.as_deref() {
            return token_type;
        }
        if self.token_name.is_some() {
            TokenKind::SERVICE_ACCOUNT
        } else if self.pre_org_selection == Some(true) {
            TokenKind::PRE_ORG_SELECTION
        } else if self.organization_id.is_some() {
            TokenKind::ORG_CONTEXT
        } else {
            TokenKind::STANDARD
        }
    }
}

fn required<T>(value: Option<T>, claim: &str, token_type: &str) -> Result<T, String> {
    value.ok_or_else(|| format!("{} token is missing the '{}' claim", token_type, claim))
}

impl TryFrom<WireClaims> for TokenClaims {
    type Error = String;

    fn try_from(wire: WireClaims) -> Result<Self, Self::Error> {
        let token_type = wire.resolve_token_type().to_string();

        let kind = match token_type.as_str() {
            TokenKind::STANDARD => TokenKind::Standard,
            TokenKind::PRE_ORG_SELECTION => {
                if wire.organization_id.is_some() || wire.org_role.is_some() {
                    return Err(
                        "pre-org-selection token must not carry organization claims".to_string(),
                    );
                }
                TokenKind::PreOrgSelection {
                    user_id: required(wire.user_id, "userId", &token_type)?,
                    global_role: required(wire.global_role, "globalRole", &token_type)?,
                    must_change_password: wire.must_change_password.unwrap_or(false),
                }
            }
            TokenKind::ORG_CONTEXT => {
                if wire.pre_org_selection == Some(true) {
                    return Err(
                        "org-context token must not be flagged pre-org-selection".to_string(),
                    );
                }
                TokenKind::OrgContext {
                    user_id: required(wire.user_id, "userId", &token_type)?,
                    global_role: required(wire.global_role, "globalRole", &token_type)?,
                    organization_id: required(
                        wire.organization_id,
                        "organizationId",
                        &token_type,
                    )?,
                    org_role: required(wire.org_role, "orgRole", &token_type)?,
                    must_change_password: wire.must_change_password.unwrap_or(false),
                }
            }
            TokenKind::SERVICE_ACCOUNT => {
                if wire.global_role.is_some()
                    || wire.organization_id.is_some()
                    || wire.org_role.is_some()
                {
                    return Err(
                        "service-account token must not carry role or organization claims"
                            .to_string(),
                    );
                }
                TokenKind::ServiceAccount {
                    token_name: required(wire.token_name, "tokenName", &token_type)?,
                }
            }
            other => return Err(format!("unknown token type '{}'", other)),
        };

        let claims = TokenClaims::new(wire.sub, wire.iat, wire.exp, kind);
        claims.check_invariants()?;
        Ok(claims)
    }
}

impl From<TokenClaims> for WireClaims {
    fn from(claims: TokenClaims) -> Self {
        let mut wire = WireClaims {
            sub: claims.subject,
            iat: claims.issued_at,
            exp: claims.expires_at,
            token_type: Some(claims.kind.token_type().to_string()),
            ..WireClaims::default()
        };

        match claims.kind {
            TokenKind::Standard => {}
            TokenKind::PreOrgSelection {
                user_id,
                global_role,
                must_change_password,
            } => {
                wire.user_id = Some(user_id);
                wire.global_role = Some(global_role);
                wire.must_change_password = Some(must_change_password);
                wire.pre_org_selection = Some(true);
            }
            TokenKind::OrgContext {
                user_id,
                global_role,
                organization_id,
                org_role,
                must_change_password,
            } => {
                wire.user_id = Some(user_id);
                wire.global_role = Some(global_role);
                wire.organization_id = Some(organization_id);
                wire.org_role = Some(org_role);
                wire.must_change_password = Some(must_change_password);
            }
            TokenKind::ServiceAccount { token_name } => {
                wire.token_name = Some(token_name);
            }
        }

        wire
    }
}
