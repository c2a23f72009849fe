//! Principal → profile lookup used to stamp comment authors.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::storage::StoreError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Display name for a subject, `None` when no profile exists.
    async fn display_name(&self, subject_id: &str) -> Result<Option<String>, StoreError>;
}

#[derive(Clone, Default)]
pub struct InMemoryDirectory {
    profiles: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self { Self::default() }

    pub fn with_profiles<I: IntoIterator<Item = UserProfile>>(profiles: I) -> Self {
        let dir = Self::new();
        for p in profiles { dir.upsert(p); }
        dir
    }

    /// Load a JSON array of `{id, name}` profiles.
    pub fn load_json(path: &Path) -> Result<Self, StoreError> {
        let bytes = std::fs::read(path).map_err(|e| StoreError::Backend(format!("{}: {}", path.display(), e)))?;
        let profiles: Vec<UserProfile> = serde_json::from_slice(&bytes)
            .map_err(|e| StoreError::Backend(format!("{}: {}", path.display(), e)))?;
        Ok(Self::with_profiles(profiles))
    }

    pub fn upsert(&self, profile: UserProfile) {
        self.profiles.write().insert(profile.id, profile.name);
    }

    pub fn len(&self) -> usize { self.profiles.read().len() }

    pub fn is_empty(&self) -> bool { self.profiles.read().is_empty() }
}

#[async_trait]
impl UserDirectory for InMemoryDirectory {
    async fn display_name(&self, subject_id: &str) -> Result<Option<String>, StoreError> {
        Ok(self.profiles.read().get(subject_id).cloned())
    }
}
