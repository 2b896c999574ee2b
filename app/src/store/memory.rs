use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{ContactQuery, ContactStore, StoreError, StoreResult};
use crate::model::{Contact, ContactDraft, ContactId, Owner};

/// Process-local store used when no database is configured.
#[derive(Debug, Default)]
pub struct MemoryContactStore {
    contacts: RwLock<HashMap<ContactId, Contact>>,
}

impl MemoryContactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records across all owners.
    pub async fn len(&self) -> usize {
        self.contacts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn matches_search(contact: &Contact, term: &str) -> bool {
    let term = term.to_lowercase();
    [
        &contact.first_name,
        &contact.last_name,
        &contact.phone_number,
        &contact.email,
    ]
    .iter()
    .any(|value| value.to_lowercase().contains(&term))
}

#[async_trait]
impl ContactStore for MemoryContactStore {
    async fn insert(&self, owner: &Owner, draft: ContactDraft) -> StoreResult<Contact> {
        let contact = Contact::new(owner.clone(), draft);
        self.contacts
            .write()
            .await
            .insert(contact.id, contact.clone());
        Ok(contact)
    }

    async fn fetch(&self, owner: &Owner, id: ContactId) -> StoreResult<Contact> {
        self.contacts
            .read()
            .await
            .get(&id)
            .filter(|contact| &contact.owner == owner)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn fetch_all(&self, owner: &Owner, query: &ContactQuery) -> StoreResult<Vec<Contact>> {
        let contacts = self.contacts.read().await;
        let mut found: Vec<&Contact> = contacts
            .values()
            .filter(|contact| &contact.owner == owner)
            .filter(|contact| query.search_term().map_or(true, |q| matches_search(contact, q)))
            .collect();
        found.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

        Ok(found
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.limit() as usize)
            .cloned()
            .collect())
    }

    async fn update(
        &self,
        owner: &Owner,
        id: ContactId,
        draft: ContactDraft,
    ) -> StoreResult<Contact> {
        let mut contacts = self.contacts.write().await;
        let contact = contacts
            .get_mut(&id)
            .filter(|contact| &contact.owner == owner)
            .ok_or(StoreError::NotFound(id))?;
        contact.apply(draft);
        Ok(contact.clone())
    }

    async fn delete(&self, owner: &Owner, id: ContactId) -> StoreResult<()> {
        let mut contacts = self.contacts.write().await;
        match contacts.get(&id) {
            Some(contact) if &contact.owner == owner => {
                contacts.remove(&id);
                Ok(())
            }
            _ => Err(StoreError::NotFound(id)),
        }
    }
}
