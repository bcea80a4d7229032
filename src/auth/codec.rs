//! Compact token encoding and verification.
//!
//! Tokens use the standard HS256 JWT layout: `header.payload.signature`,
//! each segment base64url without padding, the signature an HMAC-SHA256 of
//! `header + "." + payload` keyed by the signing secret.
//!
//! `iat` and `exp` are epoch milliseconds, so the JWT library's own
//! seconds-based expiry check is off and expiry is judged here.

use jsonwebtoken::errors::{Error as JwtError, ErrorKind};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use std::sync::Arc;

use super::claims::TokenClaims;
use super::secret::VerifiedSecret;
use crate::error::{AuthError, Result};

/// Signature algorithm written to and required in the header.
pub const ALGORITHM: Algorithm = Algorithm::HS256;

struct CodecKeys {
    secret: VerifiedSecret,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    /// Signature and algorithm checks only
    validation: Validation,
    /// Structure checks only, used to classify a token that failed its signature
    structure: Validation,
}

/// Encodes claims into signed tokens and decodes them back.
///
/// Cheap to clone; clones share the keys.
#[derive(Clone)]
pub struct TokenCodec {
    keys: Arc<CodecKeys>,
}

impl TokenCodec {
    pub fn new(secret: VerifiedSecret) -> Self {
        let mut validation = Validation::new(ALGORITHM);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let mut structure = validation.clone();
        structure.insecure_disable_signature_validation();

        Self {
            keys: Arc::new(CodecKeys {
                encoding_key: EncodingKey::from_secret(secret.key_bytes()),
                decoding_key: DecodingKey::from_secret(secret.key_bytes()),
                secret,
                validation,
                structure,
            }),
        }
    }

    /// Sign a claim set into a compact token.
    ///
    /// # Errors
    ///
    /// [`AuthError::InvalidArgument`] if the claims break an invariant
    /// (empty subject, expiry before issue time).
    pub fn encode(&self, claims: &TokenClaims) -> Result<String> {
        claims
            .check_invariants()
            .map_err(AuthError::invalid_argument)?;

        encode(&Header::new(ALGORITHM), claims, &self.keys.encoding_key)
            .map_err(|e| AuthError::invalid_argument(format!("Failed to encode token: {}", e)))
    }

    /// Verify a token and return its claims, checking expiry against the current time.
    pub fn decode(&self, token: &str) -> Result<TokenClaims> {
        self.decode_at(token, now_millis())
    }

    /// Verify a token and return its claims, checking expiry against `now_ms`.
    ///
    /// # Errors
    ///
    /// - [`AuthError::MalformedToken`]: not three segments, header or payload
    ///   is not base64url, the header does not name HS256, or the payload is
    ///   not a valid claim set
    /// - [`AuthError::InvalidSignature`]: signature segment does not match
    /// - [`AuthError::ExpiredToken`]: `expires_at <= now_ms`
    pub fn decode_at(&self, token: &str, now_ms: i64) -> Result<TokenClaims> {
        let segments = token.split('.').count();
        if segments != 3 {
            return Err(AuthError::malformed(format!(
                "expected 3 segments, found {}",
                segments
            )));
        }

        let claims = match decode::<TokenClaims>(
            token,
            &self.keys.decoding_key,
            &self.keys.validation,
        ) {
            Ok(data) => data.claims,
            Err(e) if matches!(e.kind(), ErrorKind::InvalidSignature) => {
                // A broken header or payload is malformed, whatever its signature
                decode::<TokenClaims>(token, &self.keys.decoding_key, &self.keys.structure)
                    .map_err(malformed)?;
                tracing::warn!(
                    "Token signature mismatch: tampered or signed with another secret"
                );
                return Err(AuthError::InvalidSignature);
            }
            Err(e) => return Err(malformed(e)),
        };

        if claims.is_expired_at(now_ms) {
            tracing::debug!(
                subject = %claims.subject,
                expired_at = claims.expires_at,
                "Rejected expired token"
            );
            return Err(AuthError::ExpiredToken {
                expired_at: claims.expires_at,
                now: now_ms,
            });
        }

        Ok(claims)
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &ALGORITHM)
            .field("secret", &self.keys.secret)
            .finish()
    }
}

fn malformed(error: JwtError) -> AuthError {
    let reason = match error.kind() {
        ErrorKind::InvalidAlgorithm => "unsupported algorithm, expected HS256".to_string(),
        ErrorKind::Base64(e) => format!("segment is not valid base64url: {}", e),
        ErrorKind::Json(e) => format!("invalid header or claims: {}", e),
        ErrorKind::Utf8(e) => format!("segment is not valid UTF-8: {}", e),
        _ => error.to_string(),
    };
    AuthError::malformed(reason)
}

/// Current time in epoch milliseconds.
pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
