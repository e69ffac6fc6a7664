/// JWT validation for identity provider tokens
///
/// Users sign in with the hosted identity provider, which issues HS256-signed
/// access tokens. The `sub` claim carries the numeric board user ID.
///
/// # Security
///
/// - **Algorithm**: HS256 (HMAC with SHA-256)
/// - **Validation**: Signature, expiration, not-before and issuer checks
/// - **Secret Management**: Secrets should be at least 32 bytes (256 bits)
///
/// # Example
///
/// ```
/// use taskboard_shared::auth::jwt::{create_token, validate_token, Claims, JwtSettings};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let settings = JwtSettings::new("your-secret-key-at-least-32-bytes", "taskboard");
///
/// let claims = Claims::new(42, &settings.issuer);
/// let token = create_token(&claims, &settings.secret)?;
///
/// let validated = validate_token(&token, &settings)?;
/// assert_eq!(validated.user_id()?, 42);
/// # Ok(())
/// # }
/// ```
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Default token issuer
pub const DEFAULT_ISSUER: &str = "taskboard";

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Failed to validate token
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Invalid issuer
    #[error("Invalid issuer: expected {expected}")]
    InvalidIssuer { expected: String },

    /// Subject is not a board user ID
    #[error("Invalid subject: {0}")]
    InvalidSubject(String),
}

/// Key and issuer used to validate tokens
#[derive(Debug, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub issuer: String,
}

impl JwtSettings {
    pub fn new(secret: impl Into<String>, issuer: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            issuer: issuer.into(),
        }
    }
}

/// JWT claims structure
///
/// - `sub`: Subject (board user ID, as a string)
/// - `iss`: Issuer
/// - `iat`: Issued at timestamp
/// - `exp`: Expiration timestamp
/// - `nbf`: Not before timestamp
/// - `email`: Optional display address of the signed-in user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,

    pub iss: String,

    pub iat: i64,

    pub exp: i64,

    pub nbf: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Claims {
    /// Creates claims valid for 24 hours
    pub fn new(user_id: i64, issuer: &str) -> Self {
        Self::with_expiration(user_id, issuer, Duration::hours(24))
    }

    /// Creates claims with custom expiration
    pub fn with_expiration(user_id: i64, issuer: &str, expires_in: Duration) -> Self {
        let now = Utc::now();
        let expiration = now + expires_in;

        Self {
            sub: user_id.to_string(),
            iss: issuer.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            nbf: now.timestamp(),
            email: None,
        }
    }

    /// Parses the subject as a board user ID
    pub fn user_id(&self) -> Result<i64, JwtError> {
        self.sub
            .parse()
            .map_err(|_| JwtError::InvalidSubject(self.sub.clone()))
    }

    /// Checks if token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Signs claims with HS256
///
/// Used by tests and local tooling; production tokens come from the identity provider.
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a JWT token and extracts claims
///
/// Verifies signature, expiration, not-before and issuer.
pub fn validate_token(token: &str, settings: &JwtSettings) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(settings.secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[settings.issuer.as_str()]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidIssuer => JwtError::InvalidIssuer {
            expected: settings.issuer.clone(),
        },
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn settings() -> JwtSettings {
        JwtSettings::new(SECRET, DEFAULT_ISSUER)
    }

    #[test]
    fn test_claims_creation() {
        let claims = Claims::new(7, DEFAULT_ISSUER);

        assert_eq!(claims.sub, "7");
        assert_eq!(claims.iss, "taskboard");
        assert_eq!(claims.user_id().unwrap(), 7);
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_create_and_validate_token() {
        let claims = Claims::new(12, DEFAULT_ISSUER);
        let token = create_token(&claims, SECRET).expect("Should create token");

        let validated = validate_token(&token, &settings()).expect("Should validate token");
        assert_eq!(validated.user_id().unwrap(), 12);
        assert_eq!(validated.iss, "taskboard");
    }

    #[test]
    fn test_validate_with_wrong_secret() {
        let claims = Claims::new(1, DEFAULT_ISSUER);
        let token = create_token(&claims, "another-secret-key-at-least-32-bytes").unwrap();

        let result = validate_token(&token, &settings());
        assert!(matches!(result, Err(JwtError::ValidationError(_))));
    }

    #[test]
    fn test_validate_expired_token() {
        let claims = Claims::with_expiration(1, DEFAULT_ISSUER, Duration::seconds(-3600));
        assert!(claims.is_expired());

        let token = create_token(&claims, SECRET).unwrap();
        let result = validate_token(&token, &settings());

        assert!(matches!(result, Err(JwtError::Expired)));
    }

    #[test]
    fn test_validate_wrong_issuer() {
        let claims = Claims::new(1, "someone-else");
        let token = create_token(&claims, SECRET).unwrap();

        let result = validate_token(&token, &settings());
        assert!(matches!(result, Err(JwtError::InvalidIssuer { .. })));
    }

    #[test]
    fn test_non_numeric_subject() {
        let mut claims = Claims::new(1, DEFAULT_ISSUER);
        claims.sub = "0b6c-uuid-like".to_string();

        assert!(matches!(claims.user_id(), Err(JwtError::InvalidSubject(_))));
    }
}
