use super::LinkRegistry;
use crate::{
    error::LinkError,
    models::{self, Link},
};
use async_trait::async_trait;
use dashmap::{mapref::entry::Entry, DashMap};
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

#[derive(Debug, Clone)]
struct Slot {
    /// Insertion sequence, breaks `created_at` ties when listing.
    seq: u64,
    link: Link,
}

/// Ephemeral registry keyed by code.
///
/// Backed by a DashMap: `create` claims a vacant entry and `record_visit`
/// mutates the record while holding the shard's write guard, so both are
/// atomic per code without any global lock. Nothing survives a restart.
#[derive(Clone, Debug, Default)]
pub struct MemoryRegistry {
    inner: Arc<DashMap<String, Slot>>,
    next_seq: Arc<AtomicU64>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of links currently stored.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[async_trait]
impl LinkRegistry for MemoryRegistry {
    async fn create(&self, code: &str, target_url: &str) -> Result<Link, LinkError> {
        match self.inner.entry(code.to_owned()) {
            Entry::Occupied(_) => Err(LinkError::CodeConflict),
            Entry::Vacant(vacant) => {
                let link = Link::new(code, target_url);
                let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
                vacant.insert(Slot {
                    seq,
                    link: link.clone(),
                });
                Ok(link)
            }
        }
    }

    async fn get(&self, code: &str) -> Result<Link, LinkError> {
        self.inner
            .get(code)
            .map(|slot| slot.link.clone())
            .ok_or(LinkError::NotFound)
    }

    async fn list_all(&self) -> Result<Vec<Link>, LinkError> {
        let mut slots: Vec<Slot> = self.inner.iter().map(|r| r.value().clone()).collect();
        slots.sort_by(|a, b| {
            b.link
                .created_at
                .cmp(&a.link.created_at)
                .then(b.seq.cmp(&a.seq))
        });
        Ok(slots.into_iter().map(|s| s.link).collect())
    }

    async fn record_visit(&self, code: &str) -> Result<Link, LinkError> {
        let mut slot = self.inner.get_mut(code).ok_or(LinkError::NotFound)?;
        let now = models::now();
        slot.link.total_clicks += 1;
        slot.link.last_clicked = Some(now);
        slot.link.updated_at = now;
        Ok(slot.link.clone())
    }

    async fn delete(&self, code: &str) -> Result<(), LinkError> {
        self.inner
            .remove(code)
            .map(|_| ())
            .ok_or(LinkError::NotFound)
    }
}
