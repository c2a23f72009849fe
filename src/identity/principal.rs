use serde::{Deserialize, Serialize};

/// Authenticated identity for a single request. Derived from a verified token and never persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Principal {
    pub subject_id: String,
    #[serde(default)]
    pub is_admin: bool,
}

impl Principal {
    pub fn user<S: Into<String>>(subject_id: S) -> Self {
        Self { subject_id: subject_id.into(), is_admin: false }
    }

    pub fn admin<S: Into<String>>(subject_id: S) -> Self {
        Self { subject_id: subject_id.into(), is_admin: true }
    }
}
