//! Participant document model: participants own an optional episode sequence and an
//! ordered comment sequence. Wire names follow the stored document layout.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(Uuid);

impl ParticipantId {
    pub fn generate() -> Self { ParticipantId(Uuid::new_v4()) }
}

impl Display for ParticipantId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ParticipantId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(ParticipantId)
    }
}

/// Before/after stress pair. Both fields are required together.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpisodeRecord {
    #[serde(rename = "INITIAL_STRESS")]
    pub initial_stress: f64,
    #[serde(rename = "FINAL_STRESS")]
    pub final_stress: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentRecord {
    /// Author display name, resolved from the commenting principal.
    pub name: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    /// `None` once the episode slot has been cleared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episodes: Option<Vec<EpisodeRecord>>,
    #[serde(default)]
    pub comments: Vec<CommentRecord>,
}

/// Creation payload. Nested state is never accepted at creation time.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewParticipant {
    #[serde(default)]
    pub name: Option<String>,
}

impl NewParticipant {
    pub fn named<S: Into<String>>(name: S) -> Self { Self { name: Some(name.into()) } }
}

/// Read filter understood by the participant store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParticipantFilter {
    All,
    NameEquals(String),
}

impl ParticipantFilter {
    pub fn matches(&self, p: &Participant) -> bool {
        match self {
            ParticipantFilter::All => true,
            ParticipantFilter::NameEquals(name) => p.name == *name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn episode_uses_upper_case_wire_names() {
        let ep: EpisodeRecord = serde_json::from_str(r#"{"INITIAL_STRESS":5,"FINAL_STRESS":2}"#).unwrap();
        assert_eq!(ep, EpisodeRecord { initial_stress: 5.0, final_stress: 2.0 });
        let partial = serde_json::from_str::<EpisodeRecord>(r#"{"INITIAL_STRESS":5}"#);
        assert!(partial.is_err(), "partial episodes must not deserialize");
    }

    #[test]
    fn cleared_episode_slot_is_omitted() {
        let p = Participant { id: ParticipantId::generate(), name: "Alice".into(), episodes: None, comments: vec![] };
        let v = serde_json::to_value(&p).unwrap();
        assert!(v.get("episodes").is_none());
        assert_eq!(v["comments"], serde_json::json!([]));
    }

    #[test]
    fn participant_id_parses_uuid_text() {
        let id = ParticipantId::generate();
        let parsed: ParticipantId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("not-an-id".parse::<ParticipantId>().is_err());
    }
}
