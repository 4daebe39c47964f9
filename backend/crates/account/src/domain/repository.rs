//! Repository Traits
//!
//! Interfaces for data persistence. Implementations live in the
//! infrastructure layer and own the atomicity guarantees described on each
//! method.

use crate::domain::entity::{
    progress::ProgressStats,
    user::{User, UserPatch},
};
use crate::domain::value_object::{
    email::Email, leetcode_name::LeetcodeName, user_id::UserId, user_name::UserName,
    user_password::UserPassword,
};
use crate::error::AuthResult;

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Insert a new user together with its all-zero progress record
    ///
    /// Uniqueness of email, user name and LeetCode name is checked and
    /// written atomically. A clash fails with the matching `*Taken` error.
    async fn create(&self, user: &User) -> AuthResult<()>;

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>>;

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>>;

    /// Apply a partial update and return the stored result
    ///
    /// Only fields that actually change are re-checked for uniqueness.
    /// Fails with `UserNotFound` for an unknown ID.
    async fn update(&self, user_id: &UserId, patch: &UserPatch) -> AuthResult<User>;

    /// Replace the stored password hash
    async fn set_password_hash(&self, user_id: &UserId, password: &UserPassword)
    -> AuthResult<()>;

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool>;

    async fn exists_by_user_name(&self, user_name: &UserName) -> AuthResult<bool>;

    async fn exists_by_leetcode_name(&self, leetcode_name: &LeetcodeName) -> AuthResult<bool>;
}

/// Progress statistics repository trait
#[trait_variant::make(ProgressRepository: Send)]
pub trait LocalProgressRepository {
    /// Stored record, or `None` if the user has none yet
    async fn get(&self, user_id: &UserId) -> AuthResult<Option<ProgressStats>>;

    /// Atomic read-modify-write of one user's record
    ///
    /// `f` runs with exclusive access to the record; concurrent calls for
    /// the same user are serialized. Fails with `UserNotFound` if the user
    /// does not exist.
    async fn modify<F>(&self, user_id: &UserId, f: F) -> AuthResult<ProgressStats>
    where
        F: FnOnce(&mut ProgressStats) + Send;
}

/// Everything the HTTP layer needs from storage
pub trait AccountStore: UserRepository + ProgressRepository + Clone + Send + Sync + 'static {}

impl<T> AccountStore for T where T: UserRepository + ProgressRepository + Clone + Send + Sync + 'static
{}
