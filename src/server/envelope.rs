//! Uniform `{success, data?, message?, error?}` response wrapper and per-route error shaping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::Value;
use tracing::error;

use crate::error::{AppError, ErrorClass};
use crate::identity::Tier;

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

impl<T> Envelope<T> {
    pub fn data(data: T) -> Self {
        Self { success: true, data: Some(data), message: None, error: None }
    }

    pub fn with_message(data: T, message: &str) -> Self {
        Self { success: true, data: Some(data), message: Some(message.to_string()), error: None }
    }
}

impl Envelope<()> {
    pub fn message(message: &str) -> Self {
        Self { success: true, data: None, message: Some(message.to_string()), error: None }
    }

    pub fn failure(error: Value) -> Self {
        Self { success: false, data: None, message: None, error: Some(error) }
    }
}

pub type Reply<T> = Result<(StatusCode, Json<Envelope<T>>), ApiError>;

pub fn ok<T>(status: StatusCode, envelope: Envelope<T>) -> Reply<T> {
    Ok((status, Json(envelope)))
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: Envelope<()>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

pub fn login_message(tier: Tier) -> &'static str {
    match tier {
        Tier::Admin => "Please login as admin.",
        Tier::User => "Please login.",
    }
}

/// How a route reports failures. Auth, request and not-found errors keep their own status;
/// everything else uses the fallback. A fallback without a message passes the raw error through.
#[derive(Debug, Clone, Copy)]
pub struct ErrorShape {
    pub tier: Tier,
    pub fallback_status: StatusCode,
    pub fallback_message: Option<&'static str>,
}

impl ErrorShape {
    pub const fn new(tier: Tier, fallback_status: StatusCode, fallback_message: Option<&'static str>) -> Self {
        Self { tier, fallback_status, fallback_message }
    }

    pub fn reject(&self, err: AppError) -> ApiError {
        match err.class() {
            ErrorClass::Auth => ApiError { status: StatusCode::UNAUTHORIZED, body: Envelope::failure(Value::from(login_message(self.tier))) },
            ErrorClass::Request | ErrorClass::Missing => ApiError {
                status: StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::BAD_REQUEST),
                body: Envelope::failure(Value::from(err.message())),
            },
            ErrorClass::Fault => {
                error!(target: "cohort::http", code = err.code_str(), "request failed: {}", err);
                let detail = match self.fallback_message {
                    Some(m) => Value::from(m),
                    None => serde_json::to_value(&err).unwrap_or_else(|_| Value::from(err.message())),
                };
                ApiError { status: self.fallback_status, body: Envelope::failure(detail) }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAW: ErrorShape = ErrorShape::new(Tier::Admin, StatusCode::BAD_REQUEST, None);
    const COARSE: ErrorShape = ErrorShape::new(Tier::User, StatusCode::INTERNAL_SERVER_ERROR, Some("Internal server error"));

    #[test]
    fn auth_failures_use_tier_login_message() {
        let e = RAW.reject(AppError::forbidden("p", "x"));
        assert_eq!(e.status, StatusCode::UNAUTHORIZED);
        assert_eq!(e.body.error, Some(Value::from("Please login as admin.")));
        let e = COARSE.reject(AppError::unauthenticated("u", "x"));
        assert_eq!(e.body.error, Some(Value::from("Please login.")));
    }

    #[test]
    fn not_found_keeps_404() {
        let e = RAW.reject(AppError::not_found("not_found", "Participant not found"));
        assert_eq!(e.status, StatusCode::NOT_FOUND);
        assert_eq!(e.body.error, Some(Value::from("Participant not found")));
        assert!(!e.body.success);
    }

    #[test]
    fn faults_pass_raw_error_through_without_fallback_message() {
        let e = RAW.reject(AppError::validation("validation_error", "name is required"));
        assert_eq!(e.status, StatusCode::BAD_REQUEST);
        let err = e.body.error.unwrap();
        assert_eq!(err["type"], "validation");
        assert_eq!(err["message"], "name is required");
    }

    #[test]
    fn faults_use_coarse_message_when_configured() {
        let e = COARSE.reject(AppError::invalid_state("no_episode", "nothing to patch"));
        assert_eq!(e.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(e.body.error, Some(Value::from("Internal server error")));
    }

    #[test]
    fn success_envelope_omits_absent_fields() {
        let v = serde_json::to_value(Envelope::message("participant deleted")).unwrap();
        assert_eq!(v, serde_json::json!({"success": true, "message": "participant deleted"}));
    }
}
