//! The link registry: the only component that reads or writes link state.
//!
//! Each backend guarantees that a code is claimed by at most one link, and
//! that visits are counted with an atomic increment so concurrent visits
//! are never lost.

pub mod memory;
pub mod sqlite;

use crate::{error::LinkError, models::Link};
use async_trait::async_trait;

pub use memory::MemoryRegistry;
pub use sqlite::SqliteRegistry;

#[async_trait]
pub trait LinkRegistry: Send + Sync + 'static {
    /// Insert a new link with zero clicks.
    ///
    /// Returns [`LinkError::CodeConflict`] if `code` is already taken. The
    /// existence check and the insert are a single atomic step.
    async fn create(&self, code: &str, target_url: &str) -> Result<Link, LinkError>;

    /// Point lookup by code. No side effects.
    async fn get(&self, code: &str) -> Result<Link, LinkError>;

    /// Snapshot of every link, newest first.
    async fn list_all(&self) -> Result<Vec<Link>, LinkError>;

    /// Increment `total_clicks`, stamp `last_clicked`, and return the updated
    /// link.
    async fn record_visit(&self, code: &str) -> Result<Link, LinkError>;

    /// Remove a link permanently.
    async fn delete(&self, code: &str) -> Result<(), LinkError>;
}

/// Behavior every backend must share. Run from each backend's test module.
#[cfg(test)]
pub(crate) mod conformance {
    use super::*;

    pub async fn create_then_get(registry: &dyn LinkRegistry) {
        let created = registry.create("abc123", "https://example.com/page").await.unwrap();
        assert_eq!(created.code, "abc123");
        assert_eq!(created.total_clicks, 0);
        assert!(created.last_clicked.is_none());

        let fetched = registry.get("abc123").await.unwrap();
        assert_eq!(fetched, created);
    }

    pub async fn duplicate_code_conflicts(registry: &dyn LinkRegistry) {
        registry.create("abc123", "https://one.example").await.unwrap();
        let err = registry.create("abc123", "https://two.example").await.unwrap_err();
        assert!(matches!(err, LinkError::CodeConflict));

        let kept = registry.get("abc123").await.unwrap();
        assert_eq!(kept.target_url, "https://one.example");
    }

    pub async fn codes_are_case_sensitive(registry: &dyn LinkRegistry) {
        registry.create("abcDEF", "https://one.example").await.unwrap();
        registry.create("abcdef", "https://two.example").await.unwrap();
        assert_eq!(registry.get("abcDEF").await.unwrap().target_url, "https://one.example");
        assert_eq!(registry.get("abcdef").await.unwrap().target_url, "https://two.example");
    }

    pub async fn record_visit_counts(registry: &dyn LinkRegistry) {
        let created = registry.create("visit1", "https://example.com").await.unwrap();

        let first = registry.record_visit("visit1").await.unwrap();
        assert_eq!(first.total_clicks, 1);
        let first_seen = first.last_clicked.expect("last_clicked set after a visit");
        assert!(first_seen >= created.created_at);
        assert!(first.updated_at >= created.updated_at);

        let second = registry.record_visit("visit1").await.unwrap();
        assert_eq!(second.total_clicks, 2);
        assert!(second.last_clicked.unwrap() >= first_seen);
        assert_eq!(second.created_at, created.created_at);
        assert_eq!(second.id, created.id);
    }

    pub async fn missing_codes(registry: &dyn LinkRegistry) {
        assert!(matches!(registry.get("nope00").await, Err(LinkError::NotFound)));
        assert!(matches!(registry.record_visit("nope00").await, Err(LinkError::NotFound)));
        assert!(matches!(registry.delete("nope00").await, Err(LinkError::NotFound)));
        assert!(registry.list_all().await.unwrap().is_empty());
    }

    pub async fn delete_is_final(registry: &dyn LinkRegistry) {
        registry.create("gone01", "https://example.com").await.unwrap();
        registry.delete("gone01").await.unwrap();

        assert!(matches!(registry.get("gone01").await, Err(LinkError::NotFound)));
        assert!(matches!(registry.record_visit("gone01").await, Err(LinkError::NotFound)));
        assert!(matches!(registry.delete("gone01").await, Err(LinkError::NotFound)));

        // The code is free again once deleted, with a fresh identity.
        let again = registry.create("gone01", "https://other.example").await.unwrap();
        assert_eq!(again.total_clicks, 0);
    }

    pub async fn list_is_newest_first(registry: &dyn LinkRegistry) {
        for code in ["first1", "second", "third3"] {
            registry.create(code, "https://example.com").await.unwrap();
        }
        let codes: Vec<String> = registry
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.code)
            .collect();
        assert_eq!(codes, ["third3", "second", "first1"]);
    }
}
