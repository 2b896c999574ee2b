//! Contact persistence.
//!
//! Every operation is scoped to an [`Owner`]: a record that exists but belongs
//! to someone else is reported exactly like a missing one.

mod memory;
mod postgres;

use async_trait::async_trait;
use serde::Deserialize;

use crate::model::{Contact, ContactDraft, ContactId, Owner};

pub use memory::MemoryContactStore;
pub use postgres::PgContactStore;

pub const DEFAULT_LIMIT: i64 = 10_000;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("contact not found: {0}")]
    NotFound(ContactId),

    #[error("database error")]
    Database(#[from] sqlx::Error),

    #[error("migration error")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// Listing options.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactQuery {
    /// Case-insensitive substring matched against names, phone and email.
    pub q: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ContactQuery {
    pub fn search_term(&self) -> Option<&str> {
        self.q.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, DEFAULT_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}

#[async_trait]
pub trait ContactStore: Send + Sync {
    async fn insert(&self, owner: &Owner, draft: ContactDraft) -> StoreResult<Contact>;

    async fn fetch(&self, owner: &Owner, id: ContactId) -> StoreResult<Contact>;

    /// Contacts ordered by first name, then last name, then id.
    async fn fetch_all(&self, owner: &Owner, query: &ContactQuery) -> StoreResult<Vec<Contact>>;

    async fn update(&self, owner: &Owner, id: ContactId, draft: ContactDraft)
        -> StoreResult<Contact>;

    async fn delete(&self, owner: &Owner, id: ContactId) -> StoreResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_defaults() {
        let query = ContactQuery::default();
        assert_eq!(query.limit(), DEFAULT_LIMIT);
        assert_eq!(query.offset(), 0);
        assert_eq!(query.search_term(), None);
    }

    #[test]
    fn query_clamps_paging_and_ignores_blank_search() {
        let query = ContactQuery {
            q: Some("   ".to_string()),
            limit: Some(0),
            offset: Some(-5),
        };
        assert_eq!(query.limit(), 1);
        assert_eq!(query.offset(), 0);
        assert_eq!(query.search_term(), None);

        let query = ContactQuery {
            q: Some(" zane ".to_string()),
            limit: Some(1_000_000),
            offset: None,
        };
        assert_eq!(query.limit(), DEFAULT_LIMIT);
        assert_eq!(query.search_term(), Some("zane"));
    }
}
