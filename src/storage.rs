//!
//! cohort storage module
//! ---------------------
//! Persistence seam for participant documents. The resource service only needs
//! find-by-id, find-by-filter, insert, save and delete; every call is async and
//! operates on whole documents with last-write-wins semantics.
//!
//! `save` replaces the stored document wholesale. A caller that loads, mutates
//! and saves is therefore racing any other writer of the same participant; the
//! store does not detect or prevent lost updates.
//!
//! Participant ids arrive as raw path text. Stores parse them and report
//! unparsable ids as `StoreError::Cast`, mirroring a document database that
//! rejects malformed object ids at query time.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::error::AppError;
use crate::model::{NewParticipant, Participant, ParticipantFilter};

mod memory;

pub use memory::MemoryStore;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("cast to id failed for value \"{0}\"")]
    Cast(String),
    #[error("participant validation failed: {0}")]
    Validation(String),
    #[error("no document found for id \"{0}\"")]
    DocumentMissing(String),
    #[error("store backend error: {0}")]
    Backend(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Cast(_) => AppError::validation("cast_error".to_string(), err.to_string()),
            StoreError::Validation(_) => AppError::validation("validation_error".to_string(), err.to_string()),
            StoreError::DocumentMissing(_) => AppError::not_found("not_found".to_string(), "Participant not found".to_string()),
            StoreError::Backend(_) => AppError::internal("store_error".to_string(), err.to_string()),
        }
    }
}

#[async_trait]
pub trait ParticipantStore: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<Participant>, StoreError>;

    /// Matching participants in insertion order.
    async fn find(&self, filter: &ParticipantFilter) -> Result<Vec<Participant>, StoreError>;

    /// Validate and persist a new participant, assigning its id.
    async fn insert(&self, draft: NewParticipant) -> Result<Participant, StoreError>;

    /// Replace the stored document. Fails with `DocumentMissing` if it was deleted meanwhile.
    async fn save(&self, participant: &Participant) -> Result<(), StoreError>;

    /// Remove a participant and everything nested under it. Absent ids are not an error.
    async fn delete(&self, id: &str) -> Result<Option<Participant>, StoreError>;
}

/// Store handle shared across request handlers.
pub type SharedStore = Arc<dyn ParticipantStore>;
