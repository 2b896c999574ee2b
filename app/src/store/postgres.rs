use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};

use super::{ContactQuery, ContactStore, StoreError, StoreResult};
use crate::model::{timestamp_now, Contact, ContactDraft, ContactId, Owner};
use crate::schema::contact_columns;

const INSERT_SQL: &str = concat!(
    "INSERT INTO contacts (",
    contact_columns!(),
    ") VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING ",
    contact_columns!()
);

const FETCH_SQL: &str = concat!(
    "SELECT ",
    contact_columns!(),
    " FROM contacts WHERE id = $1 AND owner = $2"
);

const FETCH_ALL_SQL: &str = concat!(
    "SELECT ",
    contact_columns!(),
    " FROM contacts
    WHERE owner = $1
      AND ($2::TEXT IS NULL
           OR first_name ILIKE $2
           OR last_name ILIKE $2
           OR phone_number ILIKE $2
           OR email ILIKE $2)
    ORDER BY first_name COLLATE \"C\", last_name COLLATE \"C\", id
    LIMIT $3 OFFSET $4"
);

// updated_at must move forward even if the clock has not.
const UPDATE_SQL: &str = concat!(
    "UPDATE contacts
    SET first_name = $3,
        last_name = $4,
        phone_number = $5,
        email = $6,
        address = $7,
        updated_at = GREATEST($8, updated_at + INTERVAL '1 microsecond')
    WHERE id = $1 AND owner = $2
    RETURNING ",
    contact_columns!()
);

const DELETE_SQL: &str = "DELETE FROM contacts WHERE id = $1 AND owner = $2";

/// PostgreSQL-backed store. Each write is a single statement.
#[derive(Debug, Clone)]
pub struct PgContactStore {
    pool: PgPool,
}

impl PgContactStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Applies the embedded migrations under `migrations/`.
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

/// `ILIKE` pattern matching `term` anywhere, with wildcards in `term` escaped.
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

#[async_trait]
impl ContactStore for PgContactStore {
    async fn insert(&self, owner: &Owner, draft: ContactDraft) -> StoreResult<Contact> {
        let contact = Contact::new(owner.clone(), draft);

        let inserted = sqlx::query_as::<_, Contact>(INSERT_SQL)
            .bind(contact.id)
            .bind(contact.owner.as_str())
            .bind(&contact.first_name)
            .bind(&contact.last_name)
            .bind(&contact.phone_number)
            .bind(&contact.email)
            .bind(&contact.address)
            .bind(contact.created_at)
            .bind(contact.updated_at)
            .fetch_one(&self.pool)
            .await?;

        Ok(inserted)
    }

    async fn fetch(&self, owner: &Owner, id: ContactId) -> StoreResult<Contact> {
        sqlx::query_as::<_, Contact>(FETCH_SQL)
            .bind(id)
            .bind(owner.as_str())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound(id))
    }

    async fn fetch_all(&self, owner: &Owner, query: &ContactQuery) -> StoreResult<Vec<Contact>> {
        let results = sqlx::query_as::<_, Contact>(FETCH_ALL_SQL)
            .bind(owner.as_str())
            .bind(query.search_term().map(contains_pattern))
            .bind(query.limit())
            .bind(query.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(results)
    }

    async fn update(
        &self,
        owner: &Owner,
        id: ContactId,
        draft: ContactDraft,
    ) -> StoreResult<Contact> {
        sqlx::query_as::<_, Contact>(UPDATE_SQL)
            .bind(id)
            .bind(owner.as_str())
            .bind(draft.first_name)
            .bind(draft.last_name)
            .bind(draft.phone_number)
            .bind(draft.email)
            .bind(draft.address)
            .bind(timestamp_now())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound(id))
    }

    async fn delete(&self, owner: &Owner, id: ContactId) -> StoreResult<()> {
        let result = sqlx::query(DELETE_SQL)
            .bind(id)
            .bind(owner.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }
}
