use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use super::{ParticipantStore, StoreError};
use crate::model::{NewParticipant, Participant, ParticipantFilter, ParticipantId};

#[derive(Clone)]
struct Entry {
    /// Insertion sequence; listing order.
    seq: u64,
    doc: Participant,
}

/// In-process participant store. Each call takes the lock once, so individual
/// operations are atomic while read-modify-write sequences across calls are not.
#[derive(Clone, Default)]
pub struct MemoryStore {
    docs: Arc<RwLock<HashMap<ParticipantId, Entry>>>,
    next_seq: Arc<AtomicU64>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }

    pub fn len(&self) -> usize { self.docs.read().len() }

    pub fn is_empty(&self) -> bool { self.docs.read().is_empty() }

    fn parse_id(id: &str) -> Result<ParticipantId, StoreError> {
        id.parse::<ParticipantId>().map_err(|_| StoreError::Cast(id.to_string()))
    }
}

#[async_trait]
impl ParticipantStore for MemoryStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<Participant>, StoreError> {
        let id = Self::parse_id(id)?;
        Ok(self.docs.read().get(&id).map(|e| e.doc.clone()))
    }

    async fn find(&self, filter: &ParticipantFilter) -> Result<Vec<Participant>, StoreError> {
        let guard = self.docs.read();
        let mut hits: Vec<&Entry> = guard.values().filter(|e| filter.matches(&e.doc)).collect();
        hits.sort_by_key(|e| e.seq);
        Ok(hits.into_iter().map(|e| e.doc.clone()).collect())
    }

    async fn insert(&self, draft: NewParticipant) -> Result<Participant, StoreError> {
        let name = match draft.name {
            Some(n) if !n.trim().is_empty() => n,
            _ => return Err(StoreError::Validation("name: Path `name` is required.".to_string())),
        };
        let doc = Participant { id: ParticipantId::generate(), name, episodes: Some(Vec::new()), comments: Vec::new() };
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.docs.write().insert(doc.id, Entry { seq, doc: doc.clone() });
        debug!(target: "cohort::storage", "insert: id={} name='{}'", doc.id, doc.name);
        Ok(doc)
    }

    async fn save(&self, participant: &Participant) -> Result<(), StoreError> {
        let mut guard = self.docs.write();
        match guard.get_mut(&participant.id) {
            Some(entry) => {
                entry.doc = participant.clone();
                Ok(())
            }
            None => Err(StoreError::DocumentMissing(participant.id.to_string())),
        }
    }

    async fn delete(&self, id: &str) -> Result<Option<Participant>, StoreError> {
        let id = Self::parse_id(id)?;
        let removed = self.docs.write().remove(&id).map(|e| e.doc);
        debug!(target: "cohort::storage", "delete: id={} existed={}", id, removed.is_some());
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EpisodeRecord;

    #[tokio::test]
    async fn insert_assigns_id_and_empty_nested_state() {
        let store = MemoryStore::new();
        let p = store.insert(NewParticipant::named("Alice")).await.unwrap();
        assert_eq!(p.name, "Alice");
        assert_eq!(p.episodes, Some(vec![]));
        assert!(p.comments.is_empty());
        let again = store.find_by_id(&p.id.to_string()).await.unwrap();
        assert_eq!(again, Some(p));
    }

    #[tokio::test]
    async fn insert_requires_name() {
        let store = MemoryStore::new();
        let err = store.insert(NewParticipant::default()).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        let err = store.insert(NewParticipant::named("  ")).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn find_preserves_insertion_order_and_filters_by_exact_name() {
        let store = MemoryStore::new();
        for n in ["Cleo", "Alice", "Bob", "Alice"] {
            store.insert(NewParticipant::named(n)).await.unwrap();
        }
        let all: Vec<String> = store.find(&ParticipantFilter::All).await.unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(all, vec!["Cleo", "Alice", "Bob", "Alice"]);
        let alices = store.find(&ParticipantFilter::NameEquals("Alice".into())).await.unwrap();
        assert_eq!(alices.len(), 2);
        let none = store.find(&ParticipantFilter::NameEquals("alice".into())).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn malformed_ids_are_cast_errors() {
        let store = MemoryStore::new();
        assert!(matches!(store.find_by_id("123").await, Err(StoreError::Cast(_))));
        assert!(matches!(store.delete("xyz").await, Err(StoreError::Cast(_))));
    }

    #[tokio::test]
    async fn save_replaces_whole_document() {
        let store = MemoryStore::new();
        let mut p = store.insert(NewParticipant::named("Alice")).await.unwrap();
        p.episodes = Some(vec![EpisodeRecord { initial_stress: 3.0, final_stress: 1.0 }]);
        store.save(&p).await.unwrap();
        let loaded = store.find_by_id(&p.id.to_string()).await.unwrap().unwrap();
        assert_eq!(loaded.episodes.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn save_after_delete_reports_missing_document() {
        let store = MemoryStore::new();
        let p = store.insert(NewParticipant::named("Alice")).await.unwrap();
        assert!(store.delete(&p.id.to_string()).await.unwrap().is_some());
        assert!(matches!(store.save(&p).await, Err(StoreError::DocumentMissing(_))));
        assert!(store.delete(&p.id.to_string()).await.unwrap().is_none());
    }
}
