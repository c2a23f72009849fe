//! Unified application error model and mapping helpers.
//! One error enum is shared by the resource service and the HTTP boundary; component
//! errors (token verification, store, config) convert into it.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppError {
    Unauthenticated { code: String, message: String },
    InsufficientPrivilege { code: String, message: String },
    InvalidRequest { code: String, message: String },
    NotFound { code: String, message: String },
    Validation { code: String, message: String },
    InvalidState { code: String, message: String },
    Internal { code: String, message: String },
}

/// Coarse classification used by the HTTP boundary when shaping envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Auth,
    Request,
    Missing,
    Fault,
}

impl AppError {
    pub fn code_str(&self) -> &str {
        match self {
            AppError::Unauthenticated { code, .. }
            | AppError::InsufficientPrivilege { code, .. }
            | AppError::InvalidRequest { code, .. }
            | AppError::NotFound { code, .. }
            | AppError::Validation { code, .. }
            | AppError::InvalidState { code, .. }
            | AppError::Internal { code, .. } => code.as_str(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::Unauthenticated { message, .. }
            | AppError::InsufficientPrivilege { message, .. }
            | AppError::InvalidRequest { message, .. }
            | AppError::NotFound { message, .. }
            | AppError::Validation { message, .. }
            | AppError::InvalidState { message, .. }
            | AppError::Internal { message, .. } => message.as_str(),
        }
    }

    pub fn unauthenticated<S: Into<String>>(code: S, msg: S) -> Self { AppError::Unauthenticated { code: code.into(), message: msg.into() } }
    pub fn forbidden<S: Into<String>>(code: S, msg: S) -> Self { AppError::InsufficientPrivilege { code: code.into(), message: msg.into() } }
    pub fn invalid_request<S: Into<String>>(code: S, msg: S) -> Self { AppError::InvalidRequest { code: code.into(), message: msg.into() } }
    pub fn not_found<S: Into<String>>(code: S, msg: S) -> Self { AppError::NotFound { code: code.into(), message: msg.into() } }
    pub fn validation<S: Into<String>>(code: S, msg: S) -> Self { AppError::Validation { code: code.into(), message: msg.into() } }
    pub fn invalid_state<S: Into<String>>(code: S, msg: S) -> Self { AppError::InvalidState { code: code.into(), message: msg.into() } }
    pub fn internal<S: Into<String>>(code: S, msg: S) -> Self { AppError::Internal { code: code.into(), message: msg.into() } }

    /// Map to HTTP status code. Insufficient privilege is reported as 401, not 403.
    pub fn http_status(&self) -> u16 {
        match self {
            AppError::Unauthenticated { .. } => 401,
            AppError::InsufficientPrivilege { .. } => 401,
            AppError::InvalidRequest { .. } => 400,
            AppError::NotFound { .. } => 404,
            AppError::Validation { .. } => 400,
            AppError::InvalidState { .. } => 500,
            AppError::Internal { .. } => 500,
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            AppError::Unauthenticated { .. } | AppError::InsufficientPrivilege { .. } => ErrorClass::Auth,
            AppError::InvalidRequest { .. } => ErrorClass::Request,
            AppError::NotFound { .. } => ErrorClass::Missing,
            AppError::Validation { .. } | AppError::InvalidState { .. } | AppError::Internal { .. } => ErrorClass::Fault,
        }
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code_str(), self.message())
    }
}

impl std::error::Error for AppError {}

pub type AppResult<T> = Result<T, AppError>;

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal { code: "internal_error".into(), message: err.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_mapping() {
        assert_eq!(AppError::unauthenticated("auth", "no").http_status(), 401);
        assert_eq!(AppError::forbidden("privilege", "no").http_status(), 401);
        assert_eq!(AppError::invalid_request("bad_input", "oops").http_status(), 400);
        assert_eq!(AppError::not_found("not_found", "missing").http_status(), 404);
        assert_eq!(AppError::validation("validation", "name").http_status(), 400);
        assert_eq!(AppError::invalid_state("state", "empty").http_status(), 500);
        assert_eq!(AppError::internal("internal", "panic").http_status(), 500);
    }

    #[test]
    fn classes_group_auth_and_faults() {
        assert_eq!(AppError::forbidden("a", "b").class(), ErrorClass::Auth);
        assert_eq!(AppError::unauthenticated("a", "b").class(), ErrorClass::Auth);
        assert_eq!(AppError::validation("a", "b").class(), ErrorClass::Fault);
        assert_eq!(AppError::invalid_state("a", "b").class(), ErrorClass::Fault);
        assert_eq!(AppError::not_found("a", "b").class(), ErrorClass::Missing);
    }

    #[test]
    fn serializes_with_type_tag() {
        let v = serde_json::to_value(AppError::validation("validation_error", "name is required")).unwrap();
        assert_eq!(v["type"], "validation");
        assert_eq!(v["code"], "validation_error");
        assert_eq!(v["message"], "name is required");
    }
}
