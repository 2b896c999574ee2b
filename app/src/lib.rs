//! Phonebook: per-user contact management over server-rendered HTML forms.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod model;
mod schema;
pub mod store;
pub mod validation;
pub mod views;

use std::sync::Arc;

use axum::http::HeaderName;
use axum::routing::get;
use axum::{middleware, Router};
use tower_http::trace::TraceLayer;

use crate::store::ContactStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ContactStore>,
    pub auth_header: HeaderName,
}

impl AppState {
    pub fn new(store: Arc<dyn ContactStore>, auth_header: HeaderName) -> Self {
        Self { store, auth_header }
    }
}

pub fn build_router(state: AppState) -> Router {
    let contacts = Router::new()
        .route("/contacts", get(handlers::contact_list))
        .route(
            "/contacts/new",
            get(handlers::contact_create_form).post(handlers::contact_create),
        )
        .route("/contacts/:id", get(handlers::contact_detail))
        .route(
            "/contacts/:id/edit",
            get(handlers::contact_update_form).post(handlers::contact_update),
        )
        .route(
            "/contacts/:id/delete",
            get(handlers::contact_delete_form).post(handlers::contact_delete),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_owner,
        ));

    Router::new()
        .route("/", get(handlers::index))
        .merge(contacts)
        .fallback(handlers::not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
