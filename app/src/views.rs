//! Server-rendered HTML pages.
//!
//! Every value that came from a user passes through [`escape`] before it is
//! written into markup.

use std::fmt::Write;

use crate::model::{Contact, Owner};
use crate::validation::{ContactForm, Field, ValidationErrors};

/// Success messages shown after a redirect. Only these can be displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Created,
    Updated,
    Deleted,
}

impl Notice {
    pub fn from_param(value: &str) -> Option<Self> {
        match value {
            "created" => Some(Notice::Created),
            "updated" => Some(Notice::Updated),
            "deleted" => Some(Notice::Deleted),
            _ => None,
        }
    }

    pub fn as_param(self) -> &'static str {
        match self {
            Notice::Created => "created",
            Notice::Updated => "updated",
            Notice::Deleted => "deleted",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Notice::Created => "Contact created successfully!",
            Notice::Updated => "Contact updated successfully!",
            Notice::Deleted => "Contact deleted successfully!",
        }
    }
}

pub fn escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn layout(title: &str, notice: Option<Notice>, body: &str) -> String {
    let mut page = String::new();
    let _ = write!(
        page,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title} | Phonebook</title>\n</head>\n<body>\n<main class=\"container\">\n",
        title = escape(title),
    );
    if let Some(notice) = notice {
        let _ = writeln!(
            page,
            "<div class=\"alert alert-success\" role=\"alert\">{}</div>",
            notice.message()
        );
    }
    let _ = write!(page, "<h1>{}</h1>\n{body}</main>\n</body>\n</html>\n", escape(title));
    page
}

pub fn contact_list_page(
    owner: &Owner,
    contacts: &[Contact],
    search: Option<&str>,
    notice: Option<Notice>,
) -> String {
    let mut body = String::new();
    let _ = writeln!(
        body,
        "<p class=\"owner\">Signed in as {}</p>",
        escape(owner.as_str())
    );
    let _ = writeln!(
        body,
        "<form method=\"get\" action=\"/contacts\" class=\"search\">\
         <input type=\"search\" name=\"q\" value=\"{}\" placeholder=\"Search contacts\">\
         <button type=\"submit\">Search</button></form>",
        escape(search.unwrap_or_default())
    );
    body.push_str("<p><a href=\"/contacts/new\" class=\"btn\">Add Contact</a></p>\n");

    if contacts.is_empty() {
        body.push_str("<p class=\"empty\">No contacts found.</p>\n");
        return layout("Contacts", notice, &body);
    }

    body.push_str(
        "<table class=\"table\">\n<thead><tr><th>Name</th><th>Phone Number</th>\
         <th>Email</th><th></th></tr></thead>\n<tbody>\n",
    );
    for contact in contacts {
        let _ = writeln!(
            body,
            "<tr><td><a href=\"/contacts/{id}\">{name}</a></td><td>{phone}</td><td>{email}</td>\
             <td><a href=\"/contacts/{id}/edit\">Edit</a> <a href=\"/contacts/{id}/delete\">Delete</a></td></tr>",
            id = contact.id,
            name = escape(&contact.full_name()),
            phone = escape(&contact.phone_number),
            email = escape(&contact.email),
        );
    }
    body.push_str("</tbody>\n</table>\n");
    layout("Contacts", notice, &body)
}

pub fn contact_detail_page(contact: &Contact, notice: Option<Notice>) -> String {
    let mut body = String::new();
    body.push_str("<dl class=\"contact\">\n");
    for (label, value) in [
        ("First Name", contact.first_name.as_str()),
        ("Last Name", contact.last_name.as_str()),
        ("Phone Number", contact.phone_number.as_str()),
        ("Email", contact.email.as_str()),
        ("Address", contact.address.as_str()),
    ] {
        let _ = writeln!(body, "<dt>{label}</dt><dd>{}</dd>", escape(value));
    }
    let _ = writeln!(
        body,
        "<dt>Created</dt><dd>{}</dd>\n<dt>Updated</dt><dd>{}</dd>",
        contact.created_at.format("%Y-%m-%d %H:%M"),
        contact.updated_at.format("%Y-%m-%d %H:%M"),
    );
    body.push_str("</dl>\n");
    let _ = writeln!(
        body,
        "<p><a href=\"/contacts/{id}/edit\">Edit</a> <a href=\"/contacts/{id}/delete\">Delete</a> \
         <a href=\"/contacts\">Back to list</a></p>",
        id = contact.id
    );
    layout(&contact.full_name(), notice, &body)
}

fn form_field(body: &mut String, field: Field, form: &ContactForm, errors: &ValidationErrors) {
    let name = field.name();
    let label = field.label();
    let value = escape(form.value(field));
    let maxlength = field
        .max_chars()
        .map(|max| format!(" maxlength=\"{max}\""))
        .unwrap_or_default();

    let _ = write!(
        body,
        "<div class=\"field{}\">\n<label for=\"id_{name}\">{label}</label>\n",
        if errors.has(field) { " has-error" } else { "" }
    );
    match field {
        Field::Address => {
            let _ = writeln!(
                body,
                "<textarea name=\"{name}\" id=\"id_{name}\" class=\"form-control\" rows=\"3\" \
                 placeholder=\"{label}\">{value}</textarea>"
            );
        }
        _ => {
            let input_type = if field == Field::Email { "email" } else { "text" };
            let _ = writeln!(
                body,
                "<input type=\"{input_type}\" name=\"{name}\" id=\"id_{name}\" class=\"form-control\" \
                 placeholder=\"{label}\" value=\"{value}\"{maxlength} required>"
            );
        }
    }
    let messages: Vec<&str> = errors.messages(field).collect();
    if !messages.is_empty() {
        body.push_str("<ul class=\"errorlist\">");
        for message in messages {
            let _ = write!(body, "<li>{}</li>", escape(message));
        }
        body.push_str("</ul>\n");
    }
    body.push_str("</div>\n");
}

/// Create or edit form, re-populated with `form` and annotated with `errors`.
pub fn contact_form_page(
    title: &str,
    action: &str,
    form: &ContactForm,
    errors: &ValidationErrors,
) -> String {
    let mut body = String::new();
    if !errors.is_empty() {
        body.push_str("<p class=\"errornote\">Please correct the errors below.</p>\n");
    }
    let _ = writeln!(body, "<form method=\"post\" action=\"{}\">", escape(action));
    for field in Field::ALL {
        form_field(&mut body, field, form, errors);
    }
    body.push_str("<button type=\"submit\">Save</button> <a href=\"/contacts\">Cancel</a>\n</form>\n");
    layout(title, None, &body)
}

pub fn contact_delete_page(contact: &Contact) -> String {
    let body = format!(
        "<p>Are you sure you want to delete \"{name}\"?</p>\n\
         <form method=\"post\" action=\"/contacts/{id}/delete\">\n\
         <input type=\"hidden\" name=\"confirm\" value=\"yes\">\n\
         <button type=\"submit\">Yes, delete</button> <a href=\"/contacts/{id}\">Cancel</a>\n\
         </form>\n",
        name = escape(&contact.full_name()),
        id = contact.id,
    );
    layout("Delete Contact", None, &body)
}

pub fn not_found_page() -> String {
    layout(
        "Not Found",
        None,
        "<p>The requested contact does not exist.</p>\n<p><a href=\"/contacts\">Back to list</a></p>\n",
    )
}

pub fn unauthorized_page() -> String {
    layout("Sign-in Required", None, "<p>You must be signed in to manage contacts.</p>\n")
}

pub fn server_error_page() -> String {
    layout("Server Error", None, "<p>Something went wrong. Please try again later.</p>\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ContactDraft;

    fn contact(first: &str, last: &str) -> Contact {
        Contact::new(
            Owner::new("alice"),
            ContactDraft {
                first_name: first.to_string(),
                last_name: last.to_string(),
                phone_number: "555-0100".to_string(),
                email: "amy@example.com".to_string(),
                address: String::new(),
            },
        )
    }

    #[test]
    fn escape_html_special_characters() {
        assert_eq!(
            escape(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#x27;Jerry&#x27;&lt;/a&gt;"
        );
    }

    #[test]
    fn notice_params() {
        for notice in [Notice::Created, Notice::Updated, Notice::Deleted] {
            assert_eq!(Notice::from_param(notice.as_param()), Some(notice));
        }
        assert_eq!(Notice::from_param("<script>"), None);
    }

    #[test]
    fn list_page_escapes_names_and_shows_notice() {
        let page = contact_list_page(
            &Owner::new("alice"),
            &[contact("<b>Amy</b>", "Zane")],
            None,
            Some(Notice::Created),
        );
        assert!(page.contains("&lt;b&gt;Amy&lt;/b&gt; Zane"));
        assert!(!page.contains("<b>Amy</b>"));
        assert!(page.contains("Contact created successfully!"));
    }

    #[test]
    fn empty_list_page() {
        let page = contact_list_page(&Owner::new("alice"), &[], Some("nobody"), None);
        assert!(page.contains("No contacts found."));
        assert!(page.contains("value=\"nobody\""));
    }

    #[test]
    fn form_page_keeps_values_and_lists_errors() {
        let form = ContactForm {
            email: "not-an-email".to_string(),
            ..Default::default()
        };
        let errors = form.validate().unwrap_err();
        let page = contact_form_page("Add Contact", "/contacts/new", &form, &errors);

        assert!(page.contains("value=\"not-an-email\""));
        assert!(page.contains("Enter a valid email address."));
        assert!(page.contains("This field is required."));
        assert!(page.contains("maxlength=\"50\""));
        assert!(page.contains("<textarea name=\"address\""));
    }

    #[test]
    fn delete_page_posts_confirmation() {
        let c = contact("Amy", "Zane");
        let page = contact_delete_page(&c);
        assert!(page.contains(&format!("action=\"/contacts/{}/delete\"", c.id)));
        assert!(page.contains("name=\"confirm\" value=\"yes\""));
    }
}
