//! Sign In Use Case
//!
//! Verifies email + password and issues a session token. Hashes created
//! with weaker parameters than currently configured are upgraded in place.

use std::fmt;
use std::sync::Arc;

use crate::application::hasher::{PasswordService, Verification};
use crate::application::session::SessionFacade;
use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{email::Email, user_password::RawPassword};
use crate::error::{AuthError, AuthResult};

pub struct SignInInput {
    pub email: String,
    pub password: String,
}

pub struct SignInOutput {
    pub user: User,
    pub token: String,
}

impl fmt::Debug for SignInOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignInOutput")
            .field("user_id", &self.user.user_id)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

pub struct SignInUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    passwords: Arc<PasswordService>,
    sessions: Arc<SessionFacade>,
}

impl<U> SignInUseCase<U>
where
    U: UserRepository,
{
    pub fn new(
        user_repo: Arc<U>,
        passwords: Arc<PasswordService>,
        sessions: Arc<SessionFacade>,
    ) -> Self {
        Self {
            user_repo,
            passwords,
            sessions,
        }
    }

    pub async fn execute(&self, input: SignInInput) -> AuthResult<SignInOutput> {
        if input.email.trim().is_empty() {
            return Err(AuthError::Validation(
                "Email and password are required".to_string(),
            ));
        }
        let raw_password = RawPassword::for_login(input.password)?;

        // A malformed email cannot belong to anyone
        let email = Email::new(&input.email).map_err(|_| AuthError::InvalidCredentials)?;

        let mut user = self
            .user_repo
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let upgraded = match self
            .passwords
            .verify_and_upgrade(raw_password, user.password.clone())
            .await?
        {
            Verification::Mismatch => {
                tracing::warn!(user_id = %user.user_id, "Password mismatch");
                return Err(AuthError::InvalidCredentials);
            }
            Verification::Match { upgraded } => upgraded,
        };

        if let Some(password) = upgraded {
            // Not fatal: the old hash still verifies, so retry on next login
            match self
                .user_repo
                .set_password_hash(&user.user_id, &password)
                .await
            {
                Ok(()) => {
                    tracing::info!(user_id = %user.user_id, "Password hash upgraded");
                    user.set_password(password);
                }
                Err(e) => {
                    tracing::warn!(user_id = %user.user_id, error = %e, "Password rehash failed");
                }
            }
        }

        let token = self.sessions.create_session(&user.user_id, &user.email)?;

        tracing::info!(user_id = %user.user_id, "User signed in");

        Ok(SignInOutput { user, token })
    }
}
