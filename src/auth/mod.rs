//! Signed, stateless authentication tokens.
//!
//! # Token kinds
//!
//! - **Standard**: subject only, configured default lifetime
//! - **Pre-org-selection**: issued after the password check, 15 minutes
//! - **Org-context**: carries organization and role, configured default lifetime
//! - **Service account**: non-interactive credential, lifetime in days
//!
//! There is no revocation store. A token stops working when it expires or
//! when its signature no longer matches.

pub mod claims;
pub mod codec;
pub mod issuer;
pub mod secret;
pub mod service;
pub mod validator;

pub use claims::{GlobalRole, OrgRole, TokenClaims, TokenKind};
pub use codec::TokenCodec;
pub use issuer::{MILLIS_PER_DAY, PRE_ORG_SELECTION_TTL_MS, TokenIssuer};
pub use secret::{SecretAssessment, SecretPolicy, VerifiedSecret};
pub use service::TokenService;
pub use validator::TokenValidator;
