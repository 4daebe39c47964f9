//! Update Profile Use Case

use std::sync::Arc;

use crate::domain::entity::user::{User, UserPatch};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    email::Email, leetcode_name::LeetcodeName, user_id::UserId, user_name::UserName,
};
use crate::error::{AuthError, AuthResult};

/// Blank or absent fields are left unchanged
#[derive(Debug, Default)]
pub struct UpdateProfileInput {
    pub email: Option<String>,
    pub user_name: Option<String>,
    pub leetcode_name: Option<String>,
}

pub struct UpdateProfileUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
}

impl<U> UpdateProfileUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>) -> Self {
        Self { user_repo }
    }

    pub async fn execute(&self, user_id: &UserId, input: UpdateProfileInput) -> AuthResult<User> {
        let patch = UserPatch {
            email: non_blank(input.email).map(Email::new).transpose()?,
            user_name: non_blank(input.user_name)
                .map(UserName::new)
                .transpose()?,
            leetcode_name: non_blank(input.leetcode_name)
                .map(LeetcodeName::new)
                .transpose()?,
        };

        if patch.is_empty() {
            return self
                .user_repo
                .find_by_id(user_id)
                .await?
                .ok_or(AuthError::UserNotFound);
        }

        let user = self.user_repo.update(user_id, &patch).await?;

        tracing::info!(user_id = %user_id, "Profile updated");

        Ok(user)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
