//! Participant resource service.
//!
//! Every operation checks the access policy first and only then touches the store, so a
//! denied call never leaves partial writes behind. Nested episode/comment updates load the
//! participant, mutate it in memory and save the whole document back; concurrent writers of
//! the same participant can overwrite each other's changes.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use crate::error::{AppError, AppResult};
use crate::identity::{Action, Principal, UserDirectory, authorize};
use crate::model::{CommentRecord, EpisodeRecord, NewParticipant, Participant, ParticipantFilter};
use crate::storage::SharedStore;

pub const ROLE_SUPERVISOR: &str = "supervisor";
pub const ROLE_PARTICIPANT: &str = "participant";

#[derive(Clone)]
pub struct ResourceService {
    store: SharedStore,
    directory: Arc<dyn UserDirectory>,
}

fn not_found() -> AppError {
    AppError::not_found("not_found", "Participant not found")
}

fn gate(principal: &Principal, action: Action) -> AppResult<()> {
    let decision = authorize(principal, action);
    if !decision.is_allowed() {
        warn!(target: "cohort::access", subject = %principal.subject_id, ?action, "denied");
    }
    decision.into_result(action)
}

impl ResourceService {
    pub fn new(store: SharedStore, directory: Arc<dyn UserDirectory>) -> Self {
        Self { store, directory }
    }

    async fn load(&self, id: &str) -> AppResult<Participant> {
        self.store.find_by_id(id).await?.ok_or_else(not_found)
    }

    /// Listing scope is chosen by the caller-declared `role`, not by the principal's tier.
    pub async fn list_participants(
        &self,
        principal: &Principal,
        role: Option<&str>,
        name: Option<&str>,
    ) -> AppResult<Vec<Participant>> {
        gate(principal, Action::ListParticipants)?;
        let (Some(role), Some(name)) = (role.filter(|r| !r.is_empty()), name.filter(|n| !n.is_empty())) else {
            return Err(AppError::invalid_request("missing_role", "Missing or invalid user role in the request."));
        };
        debug!(target: "cohort::service", role, name, "list participants");
        let filter = match role {
            ROLE_SUPERVISOR => ParticipantFilter::All,
            ROLE_PARTICIPANT => ParticipantFilter::NameEquals(name.to_string()),
            _ => return Ok(Vec::new()),
        };
        Ok(self.store.find(&filter).await?)
    }

    pub async fn create_participant(&self, principal: &Principal, body: NewParticipant) -> AppResult<Participant> {
        gate(principal, Action::CreateParticipant)?;
        Ok(self.store.insert(body).await?)
    }

    pub async fn get_participant(&self, principal: &Principal, id: &str) -> AppResult<Participant> {
        gate(principal, Action::ReadParticipant)?;
        self.load(id).await
    }

    /// Deleting an unknown id still succeeds.
    pub async fn delete_participant(&self, principal: &Principal, id: &str) -> AppResult<()> {
        gate(principal, Action::DeleteParticipant)?;
        let removed = self.store.delete(id).await?;
        debug!(target: "cohort::service", id, existed = removed.is_some(), "delete participant");
        Ok(())
    }

    /// Replace the whole episode slot with exactly one record.
    pub async fn set_episode(&self, principal: &Principal, id: &str, episode: EpisodeRecord) -> AppResult<Participant> {
        gate(principal, Action::SetEpisode)?;
        let mut p = self.load(id).await?;
        p.episodes = Some(vec![episode]);
        self.store.save(&p).await?;
        Ok(p)
    }

    pub async fn append_episode(&self, principal: &Principal, id: &str, episode: EpisodeRecord) -> AppResult<Participant> {
        gate(principal, Action::AppendEpisode)?;
        let mut p = self.load(id).await?;
        p.episodes.get_or_insert_with(Vec::new).push(episode);
        self.store.save(&p).await?;
        Ok(p)
    }

    /// Overwrite the first episode in place.
    pub async fn patch_episode(&self, principal: &Principal, id: &str, episode: EpisodeRecord) -> AppResult<Participant> {
        gate(principal, Action::PatchEpisode)?;
        let mut p = self.load(id).await?;
        let Some(first) = p.episodes.as_mut().and_then(|eps| eps.first_mut()) else {
            return Err(AppError::invalid_state("no_episode", "participant has no episode to update"));
        };
        *first = episode;
        self.store.save(&p).await?;
        Ok(p)
    }

    /// Clear the episode slot; already-absent slots stay absent.
    pub async fn delete_episode(&self, principal: &Principal, id: &str) -> AppResult<Participant> {
        gate(principal, Action::DeleteEpisode)?;
        let mut p = self.load(id).await?;
        p.episodes = None;
        self.store.save(&p).await?;
        Ok(p)
    }

    /// Append a comment authored by the caller's profile name.
    pub async fn add_comment(&self, principal: &Principal, id: &str, text: &str) -> AppResult<Participant> {
        gate(principal, Action::AddComment)?;
        if text.is_empty() {
            return Err(AppError::invalid_request("missing_comment", "Error: comment is required"));
        }
        let mut p = self.load(id).await?;
        let author = self
            .directory
            .display_name(&principal.subject_id)
            .await?
            .ok_or_else(|| AppError::invalid_state("unknown_profile", "commenting user has no profile"))?;
        p.comments.push(CommentRecord { name: author, message: text.to_string(), created_at: Utc::now() });
        self.store.save(&p).await?;
        Ok(p)
    }

    pub async fn list_comments(&self, principal: &Principal, id: &str) -> AppResult<Vec<CommentRecord>> {
        gate(principal, Action::ListComments)?;
        Ok(self.load(id).await?.comments)
    }
}
