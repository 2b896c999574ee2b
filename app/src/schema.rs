//! Layout of the `contacts` table. The DDL lives in `migrations/`.

/// Column list shared by every query that returns whole contact rows.
macro_rules! contact_columns {
    () => {
        "id, owner, first_name, last_name, phone_number, email, address, created_at, updated_at"
    };
}

pub(crate) use contact_columns;
