//! Contact records and the identities they hang off.
//!
//! A [`Contact`] always belongs to exactly one [`Owner`]. Its `id` and
//! `created_at` never change after creation; `updated_at` only moves forward.

use std::fmt;

use chrono::{DateTime, Duration, SubsecRound, Utc};
use sqlx::FromRow;
use uuid::Uuid;

pub type ContactId = Uuid;

/// Name of the authenticated user a contact belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(transparent)]
pub struct Owner(String);

impl Owner {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Contact {
    pub id: ContactId,
    pub owner: Owner,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub email: String,
    pub address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Editable fields of a contact after validation.
///
/// Only [`ContactForm::validate`](crate::validation::ContactForm::validate)
/// produces these, so stores can write them without re-checking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactDraft {
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub email: String,
    pub address: String,
}

impl Contact {
    /// Builds a fresh record with a new id and equal creation/update stamps.
    pub fn new(owner: Owner, draft: ContactDraft) -> Self {
        let now = timestamp_now();
        Self {
            id: Uuid::new_v4(),
            owner,
            first_name: draft.first_name,
            last_name: draft.last_name,
            phone_number: draft.phone_number,
            email: draft.email,
            address: draft.address,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces every editable field and bumps `updated_at`.
    pub fn apply(&mut self, draft: ContactDraft) {
        self.first_name = draft.first_name;
        self.last_name = draft.last_name;
        self.phone_number = draft.phone_number;
        self.email = draft.email;
        self.address = draft.address;
        self.updated_at = touched_at(self.updated_at);
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Key of the default listing order.
    pub fn sort_key(&self) -> (&str, &str, ContactId) {
        (&self.first_name, &self.last_name, self.id)
    }
}

/// Current time at the precision PostgreSQL keeps (microseconds).
pub fn timestamp_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Update stamp for a record last touched at `previous`; always strictly later.
pub fn touched_at(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = timestamp_now();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(first: &str, last: &str) -> ContactDraft {
        ContactDraft {
            first_name: first.to_string(),
            last_name: last.to_string(),
            phone_number: "555-0100".to_string(),
            email: "someone@example.com".to_string(),
            address: String::new(),
        }
    }

    #[test]
    fn new_contact_has_equal_timestamps() {
        let contact = Contact::new(Owner::new("alice"), draft("Amy", "Zane"));
        assert_eq!(contact.created_at, contact.updated_at);
        assert_eq!(contact.full_name(), "Amy Zane");
    }

    #[test]
    fn apply_moves_updated_at_forward_and_keeps_identity() {
        let mut contact = Contact::new(Owner::new("alice"), draft("Amy", "Zane"));
        let before = contact.clone();

        contact.apply(draft("Amelia", "Zane"));

        assert_eq!(contact.id, before.id);
        assert_eq!(contact.owner, before.owner);
        assert_eq!(contact.created_at, before.created_at);
        assert!(contact.updated_at > before.updated_at);
        assert_eq!(contact.first_name, "Amelia");
    }

    #[test]
    fn touched_at_is_strictly_later_even_for_future_stamps() {
        let future = timestamp_now() + Duration::seconds(60);
        assert_eq!(touched_at(future), future + Duration::microseconds(1));
    }

    #[test]
    fn timestamps_are_truncated_to_microseconds() {
        let now = timestamp_now();
        assert_eq!(now.timestamp_subsec_nanos() % 1_000, 0);
    }
}
