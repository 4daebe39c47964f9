//! Sign Up Use Case
//!
//! Registers a user, creates the zero progress record and signs them in.

use std::fmt;
use std::sync::Arc;

use crate::application::hasher::PasswordService;
use crate::application::session::SessionFacade;
use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    email::Email, leetcode_name::LeetcodeName, user_name::UserName, user_password::RawPassword,
};
use crate::error::{AuthError, AuthResult};

pub struct SignUpInput {
    pub email: String,
    pub user_name: String,
    pub password: String,
    pub leetcode_name: Option<String>,
}

pub struct SignUpOutput {
    pub user: User,
    pub token: String,
}

impl fmt::Debug for SignUpOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignUpOutput")
            .field("user_id", &self.user.user_id)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

pub struct SignUpUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    passwords: Arc<PasswordService>,
    sessions: Arc<SessionFacade>,
}

impl<U> SignUpUseCase<U>
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

    pub async fn execute(&self, input: SignUpInput) -> AuthResult<SignUpOutput> {
        if input.email.trim().is_empty() || input.user_name.trim().is_empty() {
            return Err(AuthError::Validation(
                "Email, username, and password are required".to_string(),
            ));
        }

        let email = Email::new(&input.email)?;
        let user_name = UserName::new(&input.user_name)?;
        let leetcode_name = input
            .leetcode_name
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(LeetcodeName::new)
            .transpose()?;
        let raw_password = RawPassword::new(input.password)?;

        // Fail fast before paying for a hash; `create` re-checks atomically.
        if self.user_repo.exists_by_email(&email).await? {
            return Err(AuthError::EmailTaken);
        }
        if self.user_repo.exists_by_user_name(&user_name).await? {
            return Err(AuthError::UserNameTaken);
        }
        if let Some(name) = &leetcode_name {
            if self.user_repo.exists_by_leetcode_name(name).await? {
                return Err(AuthError::LeetcodeNameTaken);
            }
        }

        let password = self.passwords.hash(raw_password).await?;
        let user = User::new(email, user_name, leetcode_name, password);

        self.user_repo.create(&user).await?;

        let token = self.sessions.create_session(&user.user_id, &user.email)?;

        tracing::info!(
            user_id = %user.user_id,
            user_name = %user.user_name,
            "User registered"
        );

        Ok(SignUpOutput { user, token })
    }
}
