//! HTTP Handlers

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::{Extension, Json};
use std::sync::Arc;

use platform::client::extract_bearer_token;

use crate::application::config::AuthConfig;
use crate::application::{
    Identity, PasswordService, ProgressService, SessionFacade, SignInInput, SignInUseCase,
    SignUpInput, SignUpUseCase, UpdateProfileInput, UpdateProfileUseCase,
};
use crate::domain::entity::user::User;
use crate::domain::repository::AccountStore;
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    AuthResponse, LoginRequest, LogoutResponse, ProfileResponse, ProgressRequest,
    ProgressResponse, ProgressUpdateResponse, RegisterRequest, UpdateProfileRequest,
    UserEnvelope, UserResponse,
};
use crate::presentation::extract::ValidJson;

/// Shared state for account handlers
#[derive(Clone)]
pub struct AccountAppState<R>
where
    R: AccountStore,
{
    pub repo: Arc<R>,
    pub passwords: Arc<PasswordService>,
    pub sessions: Arc<SessionFacade>,
}

impl<R> AccountAppState<R>
where
    R: AccountStore,
{
    pub fn new(repo: R, config: AuthConfig) -> Self {
        let passwords = PasswordService::from_config(&config);
        let sessions = SessionFacade::from_config(&config);
        Self {
            repo: Arc::new(repo),
            passwords: Arc::new(passwords),
            sessions: Arc::new(sessions),
        }
    }
}

// ============================================================================
// Register / Login / Logout
// ============================================================================

/// POST /api/auth/register
pub async fn register<R>(
    State(state): State<AccountAppState<R>>,
    ValidJson(req): ValidJson<RegisterRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: AccountStore,
{
    let use_case = SignUpUseCase::new(
        state.repo.clone(),
        state.passwords.clone(),
        state.sessions.clone(),
    );

    let input = SignUpInput {
        email: req.email,
        user_name: req.username,
        password: req.password,
        leetcode_name: req.leetcode_username,
    };

    let output = use_case.execute(input).await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: UserResponse::from(&output.user),
            token: output.token,
        }),
    ))
}

/// POST /api/auth/login
pub async fn login<R>(
    State(state): State<AccountAppState<R>>,
    ValidJson(req): ValidJson<LoginRequest>,
) -> AuthResult<Json<AuthResponse>>
where
    R: AccountStore,
{
    let use_case = SignInUseCase::new(
        state.repo.clone(),
        state.passwords.clone(),
        state.sessions.clone(),
    );

    let output = use_case
        .execute(SignInInput {
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok(Json(AuthResponse {
        user: UserResponse::from(&output.user),
        token: output.token,
    }))
}

/// POST /api/auth/logout
///
/// Always succeeds, with or without a token.
pub async fn logout<R>(
    State(state): State<AccountAppState<R>>,
    headers: HeaderMap,
) -> Json<LogoutResponse>
where
    R: AccountStore,
{
    let success = match extract_bearer_token(&headers) {
        Some(token) => state.sessions.destroy_session(token),
        None => true,
    };

    Json(LogoutResponse { success })
}

// ============================================================================
// Profile
// ============================================================================

/// GET /api/auth/profile
pub async fn get_profile<R>(
    State(state): State<AccountAppState<R>>,
    Extension(identity): Extension<Identity>,
) -> AuthResult<Json<ProfileResponse>>
where
    R: AccountStore,
{
    let user = load_user(&state, &identity).await?;
    let stats = ProgressService::new(state.repo.clone())
        .get(&identity.user_id)
        .await?;

    Ok(Json(ProfileResponse {
        user: UserResponse::from(&user),
        stats: ProgressResponse::from(stats),
    }))
}

/// PUT /api/auth/profile
pub async fn update_profile<R>(
    State(state): State<AccountAppState<R>>,
    Extension(identity): Extension<Identity>,
    ValidJson(req): ValidJson<UpdateProfileRequest>,
) -> AuthResult<Json<UserEnvelope>>
where
    R: AccountStore,
{
    let use_case = UpdateProfileUseCase::new(state.repo.clone());

    let input = UpdateProfileInput {
        email: req.email,
        user_name: req.username,
        leetcode_name: req.leetcode_username,
    };

    let user = use_case.execute(&identity.user_id, input).await?;

    Ok(Json(UserEnvelope {
        user: UserResponse::from(&user),
    }))
}

/// GET /api/user/me
pub async fn me<R>(
    State(state): State<AccountAppState<R>>,
    Extension(identity): Extension<Identity>,
) -> AuthResult<Json<UserEnvelope>>
where
    R: AccountStore,
{
    let user = load_user(&state, &identity).await?;

    Ok(Json(UserEnvelope {
        user: UserResponse::from(&user),
    }))
}

// ============================================================================
// Progress
// ============================================================================

/// GET /api/progress
pub async fn get_progress<R>(
    State(state): State<AccountAppState<R>>,
    Extension(identity): Extension<Identity>,
) -> AuthResult<Json<ProgressResponse>>
where
    R: AccountStore,
{
    let stats = ProgressService::new(state.repo.clone())
        .get(&identity.user_id)
        .await?;

    Ok(Json(ProgressResponse::from(stats)))
}

/// POST /api/progress
pub async fn post_progress<R>(
    State(state): State<AccountAppState<R>>,
    Extension(identity): Extension<Identity>,
    ValidJson(req): ValidJson<ProgressRequest>,
) -> AuthResult<Json<ProgressUpdateResponse>>
where
    R: AccountStore,
{
    let service = ProgressService::new(state.repo.clone());

    let stats = match req {
        ProgressRequest::QuestionSolved { difficulty } => {
            service.record_solved(&identity.user_id, difficulty).await?
        }
        ProgressRequest::UpdateStats { stats } => {
            service.update(&identity.user_id, stats.into()).await?
        }
    };

    Ok(Json(ProgressUpdateResponse {
        success: true,
        stats: ProgressResponse::from(stats),
    }))
}

// ============================================================================
// Helpers
// ============================================================================

/// A valid token for a deleted user still resolves to 404
async fn load_user<R>(state: &AccountAppState<R>, identity: &Identity) -> AuthResult<User>
where
    R: AccountStore,
{
    state
        .repo
        .find_by_id(&identity.user_id)
        .await?
        .ok_or(AuthError::UserNotFound)
}
