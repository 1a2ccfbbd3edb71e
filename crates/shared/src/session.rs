//! Signed session tokens using HS256.
//!
//! The session cookie carries the user identity (id, name, email, DNI and
//! role). Tokens are signed with a server-side secret so a client cannot
//! alter its own role or impersonate another profile.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Minimum accepted length for the signing secret, in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// Default session lifetime: 7 days.
pub const DEFAULT_SESSION_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// Default leeway in seconds for clock skew tolerance.
pub const DEFAULT_LEEWAY_SECS: u64 = 30;

/// Error type for session token operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to encode session: {0}")]
    EncodingError(String),

    #[error("Failed to decode session: {0}")]
    DecodingError(String),

    #[error("Session has expired")]
    Expired,

    #[error("Invalid session")]
    Invalid,

    #[error("Invalid secret: {0}")]
    InvalidSecret(String),
}

/// Identity carried by a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub nombre: String,
    pub correo: String,
    pub dni: String,
    pub role: String,
}

/// Claims stored in the token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (profile ID)
    pub sub: String,
    pub nombre: String,
    pub correo: String,
    pub dni: String,
    pub role: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl SessionClaims {
    /// Converts the claims back into the session identity.
    pub fn into_user(self) -> Result<SessionUser, SessionError> {
        let id = Uuid::parse_str(&self.sub).map_err(|_| SessionError::Invalid)?;
        Ok(SessionUser {
            id,
            nombre: self.nombre,
            correo: self.correo,
            dni: self.dni,
            role: self.role,
        })
    }
}

/// Issues and verifies session tokens.
#[derive(Clone)]
pub struct SessionCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    /// Session lifetime in seconds
    pub ttl_secs: i64,
    /// Leeway in seconds for clock skew tolerance
    pub leeway_secs: u64,
}

impl std::fmt::Debug for SessionCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCodec")
            .field("ttl_secs", &self.ttl_secs)
            .field("leeway_secs", &self.leeway_secs)
            .field("encoding_key", &"[REDACTED]")
            .field("decoding_key", &"[REDACTED]")
            .finish()
    }
}

impl SessionCodec {
    /// Creates a codec from a shared secret.
    ///
    /// # Arguments
    /// * `secret` - HMAC secret, at least [`MIN_SECRET_LEN`] bytes
    /// * `ttl_secs` - Session lifetime in seconds
    pub fn new(secret: &str, ttl_secs: i64) -> Result<Self, SessionError> {
        Self::with_leeway(secret, ttl_secs, DEFAULT_LEEWAY_SECS)
    }

    /// Creates a codec with a custom clock skew leeway.
    pub fn with_leeway(secret: &str, ttl_secs: i64, leeway_secs: u64) -> Result<Self, SessionError> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(SessionError::InvalidSecret(format!(
                "secret must be at least {} bytes",
                MIN_SECRET_LEN
            )));
        }
        if ttl_secs <= 0 {
            return Err(SessionError::InvalidSecret(
                "session ttl must be positive".to_string(),
            ));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
            leeway_secs,
        })
    }

    /// Issues a signed token for the given user.
    pub fn issue(&self, user: &SessionUser) -> Result<String, SessionError> {
        self.issue_with_ttl(user, self.ttl_secs)
    }

    fn issue_with_ttl(&self, user: &SessionUser, ttl_secs: i64) -> Result<String, SessionError> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: user.id.to_string(),
            nombre: user.nombre.clone(),
            correo: user.correo.clone(),
            dni: user.dni.clone(),
            role: user.role.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(ttl_secs)).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| SessionError::EncodingError(e.to_string()))
    }

    /// Verifies a token and returns the session identity.
    pub fn verify(&self, token: &str) -> Result<SessionUser, SessionError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = self.leeway_secs;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let data = decode::<SessionClaims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => SessionError::Expired,
                jsonwebtoken::errors::ErrorKind::InvalidToken
                | jsonwebtoken::errors::ErrorKind::InvalidSignature
                | jsonwebtoken::errors::ErrorKind::InvalidAlgorithm => SessionError::Invalid,
                _ => SessionError::DecodingError(e.to_string()),
            }
        })?;

        data.claims.into_user()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "an-adequately-long-secret-for-hs256-tests";

    fn user() -> SessionUser {
        SessionUser {
            id: Uuid::new_v4(),
            nombre: "Ana Pérez".to_string(),
            correo: "ana@escuela.edu.ar".to_string(),
            dni: "40123456".to_string(),
            role: "docente".to_string(),
        }
    }

    #[test]
    fn test_issue_and_verify() {
        let codec = SessionCodec::new(SECRET, DEFAULT_SESSION_TTL_SECS).unwrap();
        let user = user();
        let token = codec.issue(&user).unwrap();
        assert_eq!(codec.verify(&token).unwrap(), user);
    }

    #[test]
    fn test_short_secret_rejected() {
        let result = SessionCodec::new("short", DEFAULT_SESSION_TTL_SECS);
        assert!(matches!(result, Err(SessionError::InvalidSecret(_))));
    }

    #[test]
    fn test_non_positive_ttl_rejected() {
        assert!(SessionCodec::new(SECRET, 0).is_err());
    }

    #[test]
    fn test_token_signed_with_other_secret_rejected() {
        let codec = SessionCodec::new(SECRET, 3600).unwrap();
        let other = SessionCodec::new("another-secret-that-is-long-enough-too", 3600).unwrap();
        let token = other.issue(&user()).unwrap();
        assert!(matches!(codec.verify(&token), Err(SessionError::Invalid)));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let codec = SessionCodec::new(SECRET, 3600).unwrap();
        let token = codec.issue(&user()).unwrap();
        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();

        // Graft an administrator payload onto the original signature.
        let mut admin = user();
        admin.role = "administrador".to_string();
        let forged = codec.issue(&admin).unwrap();
        parts[1] = forged.split('.').nth(1).unwrap().to_string();
        let tampered = parts.join(".");

        assert!(matches!(codec.verify(&tampered), Err(SessionError::Invalid)));
    }

    #[test]
    fn test_unsigned_blob_rejected() {
        let codec = SessionCodec::new(SECRET, 3600).unwrap();
        let blob = "eyJpZCI6IjEiLCJyb2xlIjoiYWRtaW5pc3RyYWRvciJ9";
        assert!(codec.verify(blob).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let codec = SessionCodec::with_leeway(SECRET, 3600, 0).unwrap();
        let token = codec.issue_with_ttl(&user(), -120).unwrap();
        assert!(matches!(codec.verify(&token), Err(SessionError::Expired)));
    }

    #[test]
    fn test_debug_redacts_keys() {
        let codec = SessionCodec::new(SECRET, 3600).unwrap();
        let debug = format!("{:?}", codec);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains(SECRET));
    }
}
