//! Bearer token verification against the process-wide HS256 signing secret.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::principal::Principal;
use crate::error::AppError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing credential")]
    Missing,
    #[error("malformed credential: {0}")]
    Malformed(String),
    #[error("credential expired")]
    Expired,
    #[error("credential signature rejected")]
    BadSignature,
    #[error("could not sign credential: {0}")]
    Signing(String),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::unauthenticated("unauthenticated".to_string(), err.to_string())
    }
}

/// Token payload. `id` and `isAdmin` match the claims issued by the login service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub id: String,
    #[serde(rename = "isAdmin", default)]
    pub is_admin: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<u64>,
}

impl Claims {
    pub fn new<S: Into<String>>(id: S, is_admin: bool) -> Self {
        Self { id: id.into(), is_admin, iat: None, exp: None }
    }

    pub fn expiring_at(mut self, exp: u64) -> Self {
        self.exp = Some(exp);
        self
    }
}

pub trait TokenVerifier: Send + Sync {
    fn verify(&self, credential: Option<&str>) -> Result<Principal, AuthError>;
}

pub struct JwtVerifier {
    decoding: DecodingKey,
    encoding: EncodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Tokens without `exp` are accepted; `exp` is still checked when present.
        validation.required_spec_claims.clear();
        Self {
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }
}

impl TokenVerifier for JwtVerifier {
    fn verify(&self, credential: Option<&str>) -> Result<Principal, AuthError> {
        let token = credential.map(str::trim).filter(|t| !t.is_empty()).ok_or(AuthError::Missing)?;
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::Expired,
            ErrorKind::InvalidSignature => AuthError::BadSignature,
            _ => AuthError::Malformed(e.to_string()),
        })?;
        Ok(Principal { subject_id: data.claims.id, is_admin: data.claims.is_admin })
    }
}

/// Strip the `Bearer ` scheme from an Authorization header value.
pub fn bearer_token(header: &str) -> &str {
    header.strip_prefix("Bearer ").unwrap_or(header).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> u64 { chrono::Utc::now().timestamp() as u64 }

    #[test]
    fn verifies_signed_admin_token() {
        let v = JwtVerifier::new("s3cret");
        let token = v.sign(&Claims::new("u-1", true)).unwrap();
        let p = v.verify(Some(&token)).unwrap();
        assert_eq!(p, Principal::admin("u-1"));
    }

    #[test]
    fn is_admin_defaults_to_false() {
        let v = JwtVerifier::new("s3cret");
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &serde_json::json!({"id": "u-2"}),
            &EncodingKey::from_secret(b"s3cret"),
        )
        .unwrap();
        assert_eq!(v.verify(Some(&token)).unwrap(), Principal::user("u-2"));
    }

    #[test]
    fn rejects_missing_and_garbage() {
        let v = JwtVerifier::new("s3cret");
        assert_eq!(v.verify(None), Err(AuthError::Missing));
        assert_eq!(v.verify(Some("  ")), Err(AuthError::Missing));
        assert!(matches!(v.verify(Some("abc.def")), Err(AuthError::Malformed(_))));
    }

    #[test]
    fn rejects_foreign_signature() {
        let other = JwtVerifier::new("other");
        let token = other.sign(&Claims::new("u-1", true)).unwrap();
        assert_eq!(JwtVerifier::new("s3cret").verify(Some(&token)), Err(AuthError::BadSignature));
    }

    #[test]
    fn rejects_expired() {
        let v = JwtVerifier::new("s3cret");
        let token = v.sign(&Claims::new("u-1", false).expiring_at(now() - 3600)).unwrap();
        assert_eq!(v.verify(Some(&token)), Err(AuthError::Expired));
        let fresh = v.sign(&Claims::new("u-1", false).expiring_at(now() + 3600)).unwrap();
        assert!(v.verify(Some(&fresh)).is_ok());
    }

    #[test]
    fn bearer_prefix_is_stripped() {
        assert_eq!(bearer_token("Bearer abc"), "abc");
        assert_eq!(bearer_token("abc"), "abc");
    }
}
