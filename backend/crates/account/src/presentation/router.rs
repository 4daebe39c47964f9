//! Account Router

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::application::config::AuthConfig;
use crate::domain::repository::AccountStore;
use crate::presentation::handlers::{self, AccountAppState};
use crate::presentation::middleware::require_session;

/// Create the account router for any storage adapter
///
/// Routes are relative; the binary nests them under `/api`.
pub fn account_router<R>(repo: R, config: AuthConfig) -> Router
where
    R: AccountStore,
{
    let state = AccountAppState::new(repo, config);
    let sessions = state.sessions.clone();

    let protected = Router::new()
        .route(
            "/auth/profile",
            get(handlers::get_profile::<R>).put(handlers::update_profile::<R>),
        )
        .route("/user/me", get(handlers::me::<R>))
        .route(
            "/progress",
            get(handlers::get_progress::<R>).post(handlers::post_progress::<R>),
        )
        .route_layer(middleware::from_fn_with_state(sessions, require_session));

    Router::new()
        .route("/auth/register", post(handlers::register::<R>))
        .route("/auth/login", post(handlers::login::<R>))
        .route("/auth/logout", post(handlers::logout::<R>))
        .merge(protected)
        .with_state(state)
}
