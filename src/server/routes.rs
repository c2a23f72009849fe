//! `/participants` handlers. Each handler authenticates through its extractor, then runs the
//! service call under a panic guard and shapes the outcome with the route's `ErrorShape`.

use std::future::Future;
use std::panic::AssertUnwindSafe;

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use futures_util::FutureExt;
use serde::Deserialize;
use tracing::error;

use super::AppState;
use super::envelope::{ApiError, Envelope, ErrorShape, Reply, ok};
use super::extract::{AdminAuth, UserAuth};
use crate::error::{AppError, AppResult};
use crate::identity::Tier;
use crate::model::{CommentRecord, EpisodeRecord, NewParticipant, Participant};

const LIST_PARTICIPANTS: ErrorShape = ErrorShape::new(Tier::User, StatusCode::INTERNAL_SERVER_ERROR, Some("Server error while fetching participants."));
const ADMIN_RAW: ErrorShape = ErrorShape::new(Tier::Admin, StatusCode::BAD_REQUEST, None);
const PATCH_EPISODE: ErrorShape = ErrorShape::new(Tier::Admin, StatusCode::INTERNAL_SERVER_ERROR, Some("Internal server error"));
const ADD_COMMENT: ErrorShape = ErrorShape::new(Tier::Admin, StatusCode::BAD_REQUEST, Some("Error: could not add comment"));
const LIST_COMMENTS: ErrorShape = ErrorShape::new(Tier::User, StatusCode::BAD_REQUEST, Some("Error: Something wrong happened"));

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub role: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CommentPayload {
    #[serde(default)]
    pub comment: Option<String>,
}

/// Run a service call, converting errors and panics into the route's envelope.
async fn guarded<T, F>(shape: ErrorShape, fut: F) -> Result<T, ApiError>
where
    F: Future<Output = AppResult<T>>,
{
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(shape.reject(e)),
        Err(panic_payload) => {
            let msg = if let Some(s) = panic_payload.downcast_ref::<&str>() { *s }
                      else if let Some(s) = panic_payload.downcast_ref::<String>() { s.as_str() }
                      else { "panic" };
            error!(target: "panic", "participant handler panic: {}", msg);
            Err(shape.reject(AppError::internal("internal_panic", "internal server error")))
        }
    }
}

fn body<T>(shape: ErrorShape, payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(v)| v)
        .map_err(|rej| shape.reject(AppError::invalid_request("invalid_body".to_string(), rej.body_text())))
}

pub async fn list_participants(
    State(state): State<AppState>,
    UserAuth(principal): UserAuth,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Reply<Vec<Participant>> {
    // An unparsable query string is reported the same way as missing parameters.
    let q = query.map(|Query(q)| q).unwrap_or_default();
    let found = guarded(
        LIST_PARTICIPANTS,
        state.service.list_participants(&principal, q.role.as_deref(), q.name.as_deref()),
    )
    .await?;
    ok(StatusCode::OK, Envelope::data(found))
}

pub async fn create_participant(
    State(state): State<AppState>,
    AdminAuth(principal): AdminAuth,
    payload: Result<Json<NewParticipant>, JsonRejection>,
) -> Reply<Participant> {
    let draft = body(ADMIN_RAW, payload)?;
    let created = guarded(ADMIN_RAW, state.service.create_participant(&principal, draft)).await?;
    ok(StatusCode::CREATED, Envelope::with_message(created, "Participant created successfuly"))
}

pub async fn get_participant(
    State(state): State<AppState>,
    AdminAuth(principal): AdminAuth,
    Path(id): Path<String>,
) -> Reply<Participant> {
    let found = guarded(ADMIN_RAW, state.service.get_participant(&principal, &id)).await?;
    ok(StatusCode::OK, Envelope::with_message(found, "participant found"))
}

pub async fn delete_participant(
    State(state): State<AppState>,
    AdminAuth(principal): AdminAuth,
    Path(id): Path<String>,
) -> Reply<()> {
    guarded(ADMIN_RAW, state.service.delete_participant(&principal, &id)).await?;
    ok(StatusCode::OK, Envelope::message("participant deleted"))
}

pub async fn set_episode(
    State(state): State<AppState>,
    AdminAuth(principal): AdminAuth,
    Path(id): Path<String>,
    payload: Result<Json<EpisodeRecord>, JsonRejection>,
) -> Reply<Participant> {
    let episode = body(ADMIN_RAW, payload)?;
    let updated = guarded(ADMIN_RAW, state.service.set_episode(&principal, &id, episode)).await?;
    ok(StatusCode::OK, Envelope::with_message(updated, "Participant updated successfully"))
}

pub async fn append_episode(
    State(state): State<AppState>,
    AdminAuth(principal): AdminAuth,
    Path(id): Path<String>,
    payload: Result<Json<EpisodeRecord>, JsonRejection>,
) -> Reply<Participant> {
    let episode = body(ADMIN_RAW, payload)?;
    let updated = guarded(ADMIN_RAW, state.service.append_episode(&principal, &id, episode)).await?;
    ok(StatusCode::OK, Envelope::with_message(updated, "Episode added successfully"))
}

pub async fn patch_episode(
    State(state): State<AppState>,
    AdminAuth(principal): AdminAuth,
    Path(id): Path<String>,
    payload: Result<Json<EpisodeRecord>, JsonRejection>,
) -> Reply<Participant> {
    let episode = body(PATCH_EPISODE, payload)?;
    let updated = guarded(PATCH_EPISODE, state.service.patch_episode(&principal, &id, episode)).await?;
    ok(StatusCode::OK, Envelope::with_message(updated, "Episode updated successfully"))
}

pub async fn delete_episode(
    State(state): State<AppState>,
    AdminAuth(principal): AdminAuth,
    Path(id): Path<String>,
) -> Reply<()> {
    guarded(ADMIN_RAW, state.service.delete_episode(&principal, &id)).await?;
    ok(StatusCode::OK, Envelope::message("Episode deleted successfully"))
}

pub async fn add_comment(
    State(state): State<AppState>,
    AdminAuth(principal): AdminAuth,
    Path(id): Path<String>,
    payload: Result<Json<CommentPayload>, JsonRejection>,
) -> Reply<Participant> {
    // A missing or unparsable body is treated like an empty comment.
    let text = payload.ok().and_then(|Json(p)| p.comment).unwrap_or_default();
    let updated = guarded(ADD_COMMENT, state.service.add_comment(&principal, &id, &text)).await?;
    ok(StatusCode::CREATED, Envelope::with_message(updated, "comment added succesfully"))
}

pub async fn list_comments(
    State(state): State<AppState>,
    UserAuth(principal): UserAuth,
    Path(id): Path<String>,
) -> Reply<Vec<CommentRecord>> {
    let comments = guarded(LIST_COMMENTS, state.service.list_comments(&principal, &id)).await?;
    ok(StatusCode::OK, Envelope::with_message(comments, "comment fetched"))
}
