use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::{Extension, Form};
use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::AppError;
use crate::model::{ContactId, Owner};
use crate::store::ContactQuery;
use crate::validation::{ContactForm, ValidationErrors};
use crate::views::{self, Notice};
use crate::AppState;

const CREATE_TITLE: &str = "Add Contact";
const EDIT_TITLE: &str = "Edit Contact";

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    q: Option<String>,
    limit: Option<i64>,
    offset: Option<i64>,
    notice: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NoticeParams {
    notice: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteConfirmation {
    #[serde(default)]
    confirm: String,
}

impl DeleteConfirmation {
    fn is_confirmed(&self) -> bool {
        self.confirm == "yes"
    }
}

fn parse_notice(raw: Option<&str>) -> Option<Notice> {
    raw.and_then(Notice::from_param)
}

// Malformed ids cannot name a contact, so they are simply not found.
fn parse_id(raw: &str) -> Result<ContactId, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound)
}

fn redirect_with_notice(path: &str, notice: Notice) -> Response {
    Redirect::to(&format!("{path}?notice={}", notice.as_param())).into_response()
}

fn form_with_errors(
    title: &str,
    action: &str,
    form: &ContactForm,
    errors: &ValidationErrors,
) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Html(views::contact_form_page(title, action, form, errors)),
    )
        .into_response()
}

pub async fn index() -> Redirect {
    Redirect::to("/contacts")
}

pub async fn contact_list(
    State(state): State<AppState>,
    Extension(owner): Extension<Owner>,
    Query(params): Query<ListParams>,
) -> Result<Html<String>, AppError> {
    let query = ContactQuery {
        q: params.q,
        limit: params.limit,
        offset: params.offset,
    };
    let contacts = state.store.fetch_all(&owner, &query).await?;

    Ok(Html(views::contact_list_page(
        &owner,
        &contacts,
        query.search_term(),
        parse_notice(params.notice.as_deref()),
    )))
}

pub async fn contact_detail(
    State(state): State<AppState>,
    Extension(owner): Extension<Owner>,
    Path(id): Path<String>,
    Query(params): Query<NoticeParams>,
) -> Result<Html<String>, AppError> {
    let contact = state.store.fetch(&owner, parse_id(&id)?).await?;
    Ok(Html(views::contact_detail_page(
        &contact,
        parse_notice(params.notice.as_deref()),
    )))
}

pub async fn contact_create_form() -> Html<String> {
    Html(views::contact_form_page(
        CREATE_TITLE,
        "/contacts/new",
        &ContactForm::default(),
        &ValidationErrors::default(),
    ))
}

pub async fn contact_create(
    State(state): State<AppState>,
    Extension(owner): Extension<Owner>,
    Form(form): Form<ContactForm>,
) -> Result<Response, AppError> {
    let draft = match form.validate() {
        Ok(draft) => draft,
        Err(errors) => {
            debug!(%owner, errors = errors.len(), "contact create rejected");
            return Ok(form_with_errors(CREATE_TITLE, "/contacts/new", &form, &errors));
        }
    };

    let contact = state.store.insert(&owner, draft).await?;
    info!(id = %contact.id, %owner, "contact created");
    Ok(redirect_with_notice("/contacts", Notice::Created))
}

pub async fn contact_update_form(
    State(state): State<AppState>,
    Extension(owner): Extension<Owner>,
    Path(id): Path<String>,
) -> Result<Html<String>, AppError> {
    let contact = state.store.fetch(&owner, parse_id(&id)?).await?;
    Ok(Html(views::contact_form_page(
        EDIT_TITLE,
        &format!("/contacts/{}/edit", contact.id),
        &ContactForm::from(&contact),
        &ValidationErrors::default(),
    )))
}

pub async fn contact_update(
    State(state): State<AppState>,
    Extension(owner): Extension<Owner>,
    Path(id): Path<String>,
    Form(form): Form<ContactForm>,
) -> Result<Response, AppError> {
    let existing = state.store.fetch(&owner, parse_id(&id)?).await?;
    let action = format!("/contacts/{}/edit", existing.id);

    let draft = match form.validate() {
        Ok(draft) => draft,
        Err(errors) => {
            debug!(id = %existing.id, %owner, errors = errors.len(), "contact update rejected");
            return Ok(form_with_errors(EDIT_TITLE, &action, &form, &errors));
        }
    };

    let contact = state.store.update(&owner, existing.id, draft).await?;
    info!(id = %contact.id, %owner, "contact updated");
    Ok(redirect_with_notice(
        &format!("/contacts/{}", contact.id),
        Notice::Updated,
    ))
}

pub async fn contact_delete_form(
    State(state): State<AppState>,
    Extension(owner): Extension<Owner>,
    Path(id): Path<String>,
) -> Result<Html<String>, AppError> {
    let contact = state.store.fetch(&owner, parse_id(&id)?).await?;
    Ok(Html(views::contact_delete_page(&contact)))
}

/// Deletes only when the confirmation field is present; otherwise re-asks.
pub async fn contact_delete(
    State(state): State<AppState>,
    Extension(owner): Extension<Owner>,
    Path(id): Path<String>,
    confirmation: Option<Form<DeleteConfirmation>>,
) -> Result<Response, AppError> {
    let contact = state.store.fetch(&owner, parse_id(&id)?).await?;

    let confirmed = confirmation.is_some_and(|Form(c)| c.is_confirmed());
    if !confirmed {
        debug!(id = %contact.id, %owner, "contact delete not confirmed");
        return Ok(Html(views::contact_delete_page(&contact)).into_response());
    }

    state.store.delete(&owner, contact.id).await?;
    info!(id = %contact.id, %owner, "contact deleted");
    Ok(redirect_with_notice("/contacts", Notice::Deleted))
}

pub async fn not_found() -> AppError {
    AppError::NotFound
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_ids_are_not_found() {
        assert!(matches!(parse_id("42"), Err(AppError::NotFound)));
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string()).unwrap(), id);
    }

    #[test]
    fn unknown_notices_are_dropped() {
        assert_eq!(parse_notice(Some("updated")), Some(Notice::Updated));
        assert_eq!(parse_notice(Some("pwned")), None);
        assert_eq!(parse_notice(None), None);
    }

    #[test]
    fn delete_needs_explicit_yes() {
        assert!(DeleteConfirmation {
            confirm: "yes".to_string()
        }
        .is_confirmed());
        assert!(!DeleteConfirmation::default().is_confirmed());
    }

    #[test]
    fn redirects_carry_notice() {
        let resp = redirect_with_notice("/contacts", Notice::Deleted);
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            resp.headers().get("location").unwrap(),
            "/contacts?notice=deleted"
        );
    }
}
