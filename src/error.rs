/// The main error type for orgpass token operations
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The signing secret or another startup setting is unusable.
    ///
    /// Raised only while initializing; a process that sees this error must
    /// not serve token operations.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Malformed token: {0}")]
    MalformedToken(String),

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Token expired at {expired_at} (now {now})")]
    ExpiredToken {
        /// Expiry carried by the token (epoch milliseconds)
        expired_at: i64,
        /// Instant the token was checked at (epoch milliseconds)
        now: i64,
    },

    #[error("Token subject mismatch: expected '{expected}', got '{actual}'")]
    ClaimMismatch { expected: String, actual: String },

    /// Caller broke an issuance precondition (empty subject, zero duration).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl AuthError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedToken(msg.into())
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// HTTP status a hosting service should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::Configuration(_) => 500,
            AuthError::InvalidArgument(_) => 400,
            AuthError::MalformedToken(_)
            | AuthError::InvalidSignature
            | AuthError::ExpiredToken { .. }
            | AuthError::ClaimMismatch { .. } => 401,
        }
    }

    /// Stable machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::Configuration(_) => "CONFIGURATION_ERROR",
            AuthError::MalformedToken(_) => "MALFORMED_TOKEN",
            AuthError::InvalidSignature => "INVALID_SIGNATURE",
            AuthError::ExpiredToken { .. } => "TOKEN_EXPIRED",
            AuthError::ClaimMismatch { .. } => "CLAIM_MISMATCH",
            AuthError::InvalidArgument(_) => "INVALID_ARGUMENT",
        }
    }

    /// Whether the error must abort startup rather than reject one request.
    pub fn is_fatal(&self) -> bool {
        matches!(self, AuthError::Configuration(_))
    }

    /// Whether the caller should ask the principal to sign in again.
    pub fn requires_reauthentication(&self) -> bool {
        matches!(self, AuthError::ExpiredToken { .. })
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AuthError::configuration("missing").status_code(), 500);
        assert_eq!(AuthError::invalid_argument("empty").status_code(), 400);
        assert_eq!(AuthError::malformed("segments").status_code(), 401);
        assert_eq!(AuthError::InvalidSignature.status_code(), 401);
        assert_eq!(
            AuthError::ExpiredToken {
                expired_at: 1,
                now: 2
            }
            .status_code(),
            401
        );
        assert_eq!(
            AuthError::ClaimMismatch {
                expected: "alice".to_string(),
                actual: "bob".to_string(),
            }
            .status_code(),
            401
        );
    }

    #[test]
    fn test_only_configuration_is_fatal() {
        assert!(AuthError::configuration("short").is_fatal());
        assert!(!AuthError::InvalidSignature.is_fatal());
        assert!(!AuthError::malformed("x").is_fatal());
    }

    #[test]
    fn test_expired_requires_reauthentication() {
        let err = AuthError::ExpiredToken {
            expired_at: 10,
            now: 20,
        };
        assert!(err.requires_reauthentication());
        assert_eq!(err.code(), "TOKEN_EXPIRED");
        assert!(!AuthError::InvalidSignature.requires_reauthentication());
    }

    #[test]
    fn test_display_messages() {
        let err = AuthError::ClaimMismatch {
            expected: "alice".to_string(),
            actual: "bob".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Token subject mismatch: expected 'alice', got 'bob'"
        );
        assert_eq!(
            AuthError::malformed("expected 3 segments, found 2").to_string(),
            "Malformed token: expected 3 segments, found 2"
        );
    }
}
