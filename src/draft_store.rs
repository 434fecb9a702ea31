//! Per-user storage for in-progress wizard drafts.
//!
//! Drafts hold unsaved form edits, so losing one costs the user some retyping
//! while trusting a bad one corrupts their progress report. The store
//! therefore seals every entry with a SHA-256 checksum and validates it on
//! read; a corrupt or tampered entry, or a draft owned by a different user
//! than the one asking, is evicted and reported as absent. The engine then
//! proceeds with the server record alone.

use crate::models::DraftRecord;
use moka::future::Cache;
use sha2::{Digest, Sha256};
use std::time::Duration;

/// Cached draft wrapper with integrity checksum.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct SealedDraft {
    /// Serialized [`DraftRecord`] JSON.
    data: String,
    /// SHA-256 of `data`, hex encoded.
    checksum: String,
}

impl SealedDraft {
    fn seal(data: String) -> Self {
        let checksum = Self::compute_checksum(&data);
        Self { data, checksum }
    }

    fn compute_checksum(data: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(data.as_bytes());
        hex::encode(hasher.finalize())
    }

    fn is_valid(&self) -> bool {
        Self::compute_checksum(&self.data) == self.checksum
    }
}

/// Draft storage keyed by user id.
#[derive(Clone)]
pub struct DraftStore {
    cache: Cache<String, String>,
}

impl DraftStore {
    pub fn new(ttl_secs: u64, max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .time_to_live(Duration::from_secs(ttl_secs))
            .max_capacity(max_capacity)
            .build();
        Self { cache }
    }

    /// Stores a draft under its owner's user id.
    pub async fn save(&self, draft: &DraftRecord) {
        let data = serde_json::to_string(draft).unwrap_or_default();
        let sealed = SealedDraft::seal(data);
        let serialized = serde_json::to_string(&sealed).unwrap_or_default();
        self.cache.insert(draft.user_id.clone(), serialized).await;
        tracing::debug!("Draft saved for user {} (step {})", draft.user_id, draft.step);
    }

    /// Loads the draft for a user, or `None` when no usable draft exists.
    ///
    /// Corrupt entries and drafts owned by a different user are evicted, not
    /// returned; the caller must not see a draft it cannot trust.
    pub async fn load(&self, user_id: &str) -> Option<DraftRecord> {
        let serialized = self.cache.get(user_id).await?;

        let sealed: SealedDraft = match serde_json::from_str(&serialized) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Discarding unparseable draft entry for user {}: {}", user_id, e);
                self.cache.invalidate(user_id).await;
                return None;
            }
        };

        if !sealed.is_valid() {
            tracing::warn!(
                "Draft checksum mismatch for user {}, discarding entry",
                user_id
            );
            self.cache.invalidate(user_id).await;
            return None;
        }

        let draft: DraftRecord = match serde_json::from_str(&sealed.data) {
            Ok(draft) => draft,
            Err(e) => {
                tracing::warn!("Discarding malformed draft for user {}: {}", user_id, e);
                self.cache.invalidate(user_id).await;
                return None;
            }
        };

        if draft.user_id != user_id {
            tracing::warn!(
                "Draft under key {} belongs to user {}, discarding stale entry",
                user_id,
                draft.user_id
            );
            self.cache.invalidate(user_id).await;
            return None;
        }

        Some(draft)
    }

    /// Removes a user's draft.
    pub async fn delete(&self, user_id: &str) {
        self.cache.invalidate(user_id).await;
        tracing::debug!("Draft deleted for user {}", user_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn draft_for(user_id: &str) -> DraftRecord {
        DraftRecord {
            user_id: user_id.to_string(),
            step: 2,
            last_updated: Utc::now(),
            form_data: serde_json::from_value(json!({"nationality": 4})).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_save_and_load_roundtrip() {
        let store = DraftStore::new(60, 100);
        let draft = draft_for("u1");

        store.save(&draft).await;
        assert_eq!(store.load("u1").await, Some(draft));
    }

    #[tokio::test]
    async fn test_load_missing_is_none() {
        let store = DraftStore::new(60, 100);
        assert_eq!(store.load("nobody").await, None);
    }

    #[tokio::test]
    async fn test_foreign_owner_draft_discarded() {
        let store = DraftStore::new(60, 100);
        let mut draft = draft_for("previous-user");
        // Simulate a stale entry left under another user's key.
        draft.user_id = "previous-user".to_string();
        let data = serde_json::to_string(&draft).unwrap();
        let sealed = SealedDraft::seal(data);
        store
            .cache
            .insert("current-user".to_string(), serde_json::to_string(&sealed).unwrap())
            .await;

        assert_eq!(store.load("current-user").await, None);
        // Entry was evicted, not just hidden.
        assert_eq!(store.cache.get("current-user").await, None);
    }

    #[tokio::test]
    async fn test_tampered_entry_discarded() {
        let store = DraftStore::new(60, 100);
        let draft = draft_for("u2");
        store.save(&draft).await;

        let tampered = store
            .cache
            .get("u2")
            .await
            .unwrap()
            .replace("nationality", "tampered_key");
        store.cache.insert("u2".to_string(), tampered).await;

        assert_eq!(store.load("u2").await, None);
    }

    #[tokio::test]
    async fn test_corrupt_json_discarded() {
        let store = DraftStore::new(60, 100);
        store
            .cache
            .insert("u3".to_string(), "{not json".to_string())
            .await;

        assert_eq!(store.load("u3").await, None);
        assert_eq!(store.cache.get("u3").await, None);
    }

    #[tokio::test]
    async fn test_delete_removes_draft() {
        let store = DraftStore::new(60, 100);
        let draft = draft_for("u4");
        store.save(&draft).await;
        store.delete("u4").await;

        assert_eq!(store.load("u4").await, None);
    }
}
