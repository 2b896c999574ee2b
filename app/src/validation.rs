//! Form input and field-level checks for contacts.

use std::net::IpAddr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::model::{Contact, ContactDraft};

pub const NAME_MAX_CHARS: usize = 50;
pub const PHONE_MAX_CHARS: usize = 15;
pub const EMAIL_MAX_CHARS: usize = 254;

// Local part: dot-atom or quoted string.
static EMAIL_USER_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)^(?:[-!#$%&'*+/=?^_`{}|~0-9A-Z]+(?:\.[-!#$%&'*+/=?^_`{}|~0-9A-Z]+)*",
        r#"|"(?:[\x01-\x08\x0b\x0c\x0e-\x1f!#-\[\]-\x7f]|\\[\x01-\x09\x0b\x0c\x0e-\x7f])*")$"#,
    ))
    .expect("email user pattern compiles")
});

// Dotted ASCII domain; the last label may not end in a hyphen.
static EMAIL_DOMAIN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:[A-Z0-9](?:[A-Z0-9-]{0,61}[A-Z0-9])?\.)+[A-Z0-9-]{1,62}[A-Z0-9]\.?$",
    )
    .expect("email domain pattern compiles")
});

static EMAIL_LITERAL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\[([A-F0-9:.]+)\]$").expect("email literal pattern compiles")
});

/// Domains accepted even though they are not dotted.
const EMAIL_DOMAIN_ALLOWLIST: &[&str] = &["localhost"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    FirstName,
    LastName,
    PhoneNumber,
    Email,
    Address,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::FirstName,
        Field::LastName,
        Field::PhoneNumber,
        Field::Email,
        Field::Address,
    ];

    /// Form field name, as submitted by the browser.
    pub fn name(self) -> &'static str {
        match self {
            Field::FirstName => "first_name",
            Field::LastName => "last_name",
            Field::PhoneNumber => "phone_number",
            Field::Email => "email",
            Field::Address => "address",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::FirstName => "First Name",
            Field::LastName => "Last Name",
            Field::PhoneNumber => "Phone Number",
            Field::Email => "Email",
            Field::Address => "Address",
        }
    }

    /// Upper bound on the value length in characters, if any.
    pub fn max_chars(self) -> Option<usize> {
        match self {
            Field::FirstName | Field::LastName => Some(NAME_MAX_CHARS),
            Field::PhoneNumber => Some(PHONE_MAX_CHARS),
            Field::Email => Some(EMAIL_MAX_CHARS),
            Field::Address => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub message: String,
}

/// Every constraint a submitted form violated, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("{} field error(s)", .errors.len())]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    fn push(&mut self, field: Field, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    pub fn has(&self, field: Field) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    pub fn messages(&self, field: Field) -> impl Iterator<Item = &str> {
        self.errors
            .iter()
            .filter(move |e| e.field == field)
            .map(|e| e.message.as_str())
    }
}

/// Raw values of the contact form. Missing fields arrive as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ContactForm {
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub email: String,
    pub address: String,
}

impl ContactForm {
    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::FirstName => &self.first_name,
            Field::LastName => &self.last_name,
            Field::PhoneNumber => &self.phone_number,
            Field::Email => &self.email,
            Field::Address => &self.address,
        }
    }

    /// Checks every field and returns the trimmed values, or all errors found.
    pub fn validate(&self) -> Result<ContactDraft, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        for field in Field::ALL {
            let value = self.value(field).trim();
            if value.is_empty() {
                if field != Field::Address {
                    errors.push(field, "This field is required.");
                }
                continue;
            }
            // PostgreSQL text columns cannot hold NUL.
            if value.contains('\0') {
                errors.push(field, "Null characters are not allowed.");
                continue;
            }
            if let Some(max) = field.max_chars() {
                let count = value.chars().count();
                if count > max {
                    errors.push(
                        field,
                        format!("Ensure this value has at most {max} characters (it has {count})."),
                    );
                    continue;
                }
            }
            if field == Field::Email && !is_valid_email(value) {
                errors.push(field, "Enter a valid email address.");
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ContactDraft {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            phone_number: self.phone_number.trim().to_string(),
            email: self.email.trim().to_string(),
            address: self.address.trim().to_string(),
        })
    }
}

impl From<&Contact> for ContactForm {
    fn from(contact: &Contact) -> Self {
        Self {
            first_name: contact.first_name.clone(),
            last_name: contact.last_name.clone(),
            phone_number: contact.phone_number.clone(),
            email: contact.email.clone(),
            address: contact.address.clone(),
        }
    }
}

/// Syntax check for email addresses. Internationalized domains are checked
/// in their IDNA (punycode) form.
pub fn is_valid_email(value: &str) -> bool {
    let Some((user, domain)) = value.rsplit_once('@') else {
        return false;
    };
    if !EMAIL_USER_PATTERN.is_match(user) {
        return false;
    }
    if EMAIL_DOMAIN_ALLOWLIST.contains(&domain) || is_valid_email_domain(domain) {
        return true;
    }
    idna::domain_to_ascii(domain).is_ok_and(|ascii| is_valid_email_domain(&ascii))
}

fn is_valid_email_domain(domain: &str) -> bool {
    if EMAIL_DOMAIN_PATTERN.is_match(domain) {
        return true;
    }
    EMAIL_LITERAL_PATTERN
        .captures(domain)
        .and_then(|caps| caps.get(1))
        .is_some_and(|ip| ip.as_str().parse::<IpAddr>().is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> ContactForm {
        ContactForm {
            first_name: "Amy".to_string(),
            last_name: "Zane".to_string(),
            phone_number: "+1 555 0100".to_string(),
            email: "amy.zane@example.com".to_string(),
            address: "12 Harbour Road".to_string(),
        }
    }

    #[test]
    fn accepts_valid_form() {
        let draft = valid_form().validate().unwrap();
        assert_eq!(draft.first_name, "Amy");
        assert_eq!(draft.email, "amy.zane@example.com");
    }

    #[test]
    fn trims_surrounding_whitespace() {
        let mut form = valid_form();
        form.first_name = "  Amy ".to_string();
        form.address = "\n".to_string();
        let draft = form.validate().unwrap();
        assert_eq!(draft.first_name, "Amy");
        assert_eq!(draft.address, "");
    }

    #[test]
    fn first_name_length_boundary() {
        let mut form = valid_form();
        form.first_name = "a".repeat(50);
        assert!(form.validate().is_ok());

        form.first_name = "a".repeat(51);
        let errors = form.validate().unwrap_err();
        assert!(errors.has(Field::FirstName));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        let mut form = valid_form();
        form.last_name = "é".repeat(50);
        assert!(form.validate().is_ok());
    }

    #[test]
    fn phone_number_over_fifteen_characters_is_rejected() {
        let mut form = valid_form();
        form.phone_number = "1".repeat(15);
        assert!(form.validate().is_ok());

        form.phone_number = "1".repeat(16);
        assert!(form.validate().unwrap_err().has(Field::PhoneNumber));
    }

    #[test]
    fn missing_required_fields_are_all_reported() {
        let errors = ContactForm::default().validate().unwrap_err();
        let fields: Vec<Field> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                Field::FirstName,
                Field::LastName,
                Field::PhoneNumber,
                Field::Email
            ]
        );
        assert!(!errors.has(Field::Address));
    }

    #[test]
    fn rejects_malformed_email() {
        let mut form = valid_form();
        form.email = "not-an-email".to_string();
        let errors = form.validate().unwrap_err();
        assert_eq!(
            errors.messages(Field::Email).collect::<Vec<_>>(),
            vec!["Enter a valid email address."]
        );
    }

    #[test]
    fn email_syntax() {
        for ok in [
            "a@b.co",
            "first.last+tag@sub.example.org",
            "o'hara@example.ie",
            "x_y@my-host.example.com",
            "a@localhost",
            "user@bücher.de",
            "user@example.com.",
            "user@[127.0.0.1]",
            "user@[::1]",
            "user@example.xn--p1ai",
            "\"john..doe\"@example.com",
        ] {
            assert!(is_valid_email(ok), "{ok} should be valid");
        }
        for bad in [
            "plain",
            "@example.com",
            "a@",
            "a@LOCALHOST.",
            "a..b@example.com",
            ".a@example.com",
            "a@-host.com",
            "a@host.c",
            "a b@example.com",
            "a@exa_mple.com",
            "a@example.com-",
            "user@[999.0.0.1]",
            "user@[not-an-ip]",
            "a@example..com",
        ] {
            assert!(!is_valid_email(bad), "{bad} should be invalid");
        }
    }

    #[test]
    fn null_characters_are_rejected_in_every_field() {
        for field in Field::ALL {
            let mut form = valid_form();
            let value = match field {
                Field::FirstName => &mut form.first_name,
                Field::LastName => &mut form.last_name,
                Field::PhoneNumber => &mut form.phone_number,
                Field::Email => &mut form.email,
                Field::Address => &mut form.address,
            };
            value.insert(1, '\0');

            let errors = form.validate().unwrap_err();
            assert_eq!(
                errors.messages(field).collect::<Vec<_>>(),
                vec!["Null characters are not allowed."],
                "{field:?}"
            );
            assert_eq!(errors.len(), 1, "{field:?}");
        }
    }

    #[test]
    fn form_from_contact_round_trips_editable_fields() {
        let draft = valid_form().validate().unwrap();
        let contact = Contact::new(crate::model::Owner::new("alice"), draft);
        assert_eq!(ContactForm::from(&contact), valid_form());
    }
}
