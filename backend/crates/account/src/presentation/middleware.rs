//! Session Middleware
//!
//! Guards protected routes: resolves the bearer token into an [`Identity`]
//! and stores it in the request extensions for handlers to extract.

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use crate::application::{Identity, SessionFacade};
use crate::error::AuthError;

/// Middleware that requires a valid session token
pub async fn require_session(
    State(sessions): State<Arc<SessionFacade>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    let Some(identity) = sessions.resolve_from_headers(req.headers()) else {
        return Err(AuthError::SessionInvalid.into_response());
    };

    tracing::debug!(user_id = %identity.user_id, "Session resolved");
    req.extensions_mut().insert::<Identity>(identity);

    Ok(next.run(req).await)
}
