//! Request extractors that authenticate the bearer credential and enforce the route tier
//! before any body is parsed.

use axum::extract::FromRequestParts;
use axum::http::StatusCode;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use tracing::warn;

use super::AppState;
use super::envelope::{ApiError, ErrorShape};
use crate::error::AppError;
use crate::identity::{Principal, Tier, authorize_tier, bearer_token};

fn authenticate(parts: &Parts, state: &AppState, tier: Tier) -> Result<Principal, AppError> {
    let header = parts.headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    let principal = state.verifier.verify(header.map(bearer_token)).map_err(|e| {
        warn!(target: "cohort::auth", path = %parts.uri.path(), "authentication failed: {}", e);
        AppError::from(e)
    })?;
    if !authorize_tier(&principal, tier).is_allowed() {
        warn!(target: "cohort::auth", subject = %principal.subject_id, path = %parts.uri.path(), "insufficient privilege");
        return Err(AppError::forbidden("insufficient_privilege", "administrator required"));
    }
    Ok(principal)
}

fn reject(tier: Tier, err: AppError) -> ApiError {
    // Auth errors never reach the fallback, so its status is irrelevant here.
    ErrorShape::new(tier, StatusCode::UNAUTHORIZED, None).reject(err)
}

/// Any verified principal.
pub struct UserAuth(pub Principal);

/// A verified principal holding the admin flag.
pub struct AdminAuth(pub Principal);

impl FromRequestParts<AppState> for UserAuth {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        authenticate(parts, state, Tier::User).map(UserAuth).map_err(|e| reject(Tier::User, e))
    }
}

impl FromRequestParts<AppState> for AdminAuth {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        authenticate(parts, state, Tier::Admin).map(AdminAuth).map_err(|e| reject(Tier::Admin, e))
    }
}
