//! Resolves the request's [`Owner`] from a header set by the fronting proxy.
//!
//! The proxy is trusted to authenticate the user; requests that reach the
//! service without the header are rejected with 401.

use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderName, StatusCode};
use axum::middleware::Next;
use axum::response::{Html, IntoResponse, Response};
use tracing::warn;

use crate::model::Owner;
use crate::views;
use crate::AppState;

pub async fn require_owner(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    match owner_from_headers(req.headers(), &state.auth_header) {
        Some(owner) => {
            req.extensions_mut().insert(owner);
            next.run(req).await
        }
        None => {
            warn!(path = %req.uri().path(), "rejecting request without authenticated user");
            unauthorized_response()
        }
    }
}

fn owner_from_headers(headers: &HeaderMap, name: &HeaderName) -> Option<Owner> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(Owner::new)
}

fn unauthorized_response() -> Response {
    (StatusCode::UNAUTHORIZED, Html(views::unauthorized_page())).into_response()
}
