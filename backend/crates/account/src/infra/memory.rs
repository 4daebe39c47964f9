//! In-Memory Repository
//!
//! Used when no database is configured, and by tests.
//!
//! - Users and their uniqueness indexes live behind a single `RwLock`, so
//!   checking and claiming an email/user name/LeetCode name is one step.
//! - Progress records each have their own `Mutex`, so updates for
//!   different users never wait on each other.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::{Mutex, RwLock};

use crate::domain::entity::{
    progress::ProgressStats,
    user::{User, UserPatch},
};
use crate::domain::repository::{ProgressRepository, UserRepository};
use crate::domain::value_object::{
    email::Email, leetcode_name::LeetcodeName, user_id::UserId, user_name::UserName,
    user_password::UserPassword,
};
use crate::error::{AuthError, AuthResult};

#[derive(Default)]
struct UserTable {
    by_id: HashMap<UserId, User>,
    by_email: HashMap<String, UserId>,
    by_user_name: HashMap<String, UserId>,
    by_leetcode_name: HashMap<String, UserId>,
}

impl UserTable {
    /// Conflict if `key` is held by anyone other than `owner`
    fn claimed_by_other(
        index: &HashMap<String, UserId>,
        key: &str,
        owner: Option<&UserId>,
    ) -> bool {
        index.get(key).is_some_and(|holder| Some(holder) != owner)
    }

    fn check_unique(
        &self,
        email: Option<&Email>,
        user_name: Option<&UserName>,
        leetcode_name: Option<&LeetcodeName>,
        owner: Option<&UserId>,
    ) -> AuthResult<()> {
        if let Some(email) = email {
            if Self::claimed_by_other(&self.by_email, email.as_str(), owner) {
                return Err(AuthError::EmailTaken);
            }
        }
        if let Some(name) = user_name {
            if Self::claimed_by_other(&self.by_user_name, name.canonical(), owner) {
                return Err(AuthError::UserNameTaken);
            }
        }
        if let Some(name) = leetcode_name {
            if Self::claimed_by_other(&self.by_leetcode_name, name.canonical(), owner) {
                return Err(AuthError::LeetcodeNameTaken);
            }
        }
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryAccountRepository {
    users: Arc<RwLock<UserTable>>,
    stats: Arc<DashMap<UserId, Arc<Mutex<ProgressStats>>>>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn user_count(&self) -> usize {
        self.users.read().await.by_id.len()
    }
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for InMemoryAccountRepository {
    async fn create(&self, user: &User) -> AuthResult<()> {
        let mut table = self.users.write().await;

        if table.by_id.contains_key(&user.user_id) {
            return Err(AuthError::Internal("Duplicate user ID".to_string()));
        }

        table.check_unique(
            Some(&user.email),
            Some(&user.user_name),
            user.leetcode_name.as_ref(),
            None,
        )?;

        table
            .by_email
            .insert(user.email.as_str().to_string(), user.user_id);
        table
            .by_user_name
            .insert(user.user_name.canonical().to_string(), user.user_id);
        if let Some(name) = &user.leetcode_name {
            table
                .by_leetcode_name
                .insert(name.canonical().to_string(), user.user_id);
        }
        table.by_id.insert(user.user_id, user.clone());

        // Inserted under the user write guard so a visible user always has stats
        self.stats
            .insert(user.user_id, Arc::new(Mutex::new(ProgressStats::default())));

        Ok(())
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        let table = self.users.read().await;
        Ok(table
            .by_email
            .get(email.as_str())
            .and_then(|id| table.by_id.get(id))
            .cloned())
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        Ok(self.users.read().await.by_id.get(user_id).cloned())
    }

    async fn update(&self, user_id: &UserId, patch: &UserPatch) -> AuthResult<User> {
        let mut table = self.users.write().await;

        let current = table
            .by_id
            .get(user_id)
            .cloned()
            .ok_or(AuthError::UserNotFound)?;

        let new_email = patch.changed_email(&current);
        let new_user_name = patch.changed_user_name(&current);
        let new_leetcode_name = patch.changed_leetcode_name(&current);

        table.check_unique(new_email, new_user_name, new_leetcode_name, Some(user_id))?;

        if let Some(email) = new_email {
            table.by_email.remove(current.email.as_str());
            table.by_email.insert(email.as_str().to_string(), *user_id);
        }
        if let Some(name) = new_user_name {
            table.by_user_name.remove(current.user_name.canonical());
            table
                .by_user_name
                .insert(name.canonical().to_string(), *user_id);
        }
        if let Some(name) = new_leetcode_name {
            if let Some(old) = &current.leetcode_name {
                table.by_leetcode_name.remove(old.canonical());
            }
            table
                .by_leetcode_name
                .insert(name.canonical().to_string(), *user_id);
        }

        let mut updated = current;
        updated.apply_patch(patch, Utc::now());
        table.by_id.insert(*user_id, updated.clone());

        Ok(updated)
    }

    async fn set_password_hash(
        &self,
        user_id: &UserId,
        password: &UserPassword,
    ) -> AuthResult<()> {
        let mut table = self.users.write().await;
        let user = table.by_id.get_mut(user_id).ok_or(AuthError::UserNotFound)?;
        user.set_password(password.clone());
        Ok(())
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        Ok(self.users.read().await.by_email.contains_key(email.as_str()))
    }

    async fn exists_by_user_name(&self, user_name: &UserName) -> AuthResult<bool> {
        Ok(self
            .users
            .read()
            .await
            .by_user_name
            .contains_key(user_name.canonical()))
    }

    async fn exists_by_leetcode_name(&self, leetcode_name: &LeetcodeName) -> AuthResult<bool> {
        Ok(self
            .users
            .read()
            .await
            .by_leetcode_name
            .contains_key(leetcode_name.canonical()))
    }
}

// ============================================================================
// Progress Repository Implementation
// ============================================================================

impl InMemoryAccountRepository {
    /// Clone the per-user cell out so no map shard lock is held across `.await`
    fn stats_cell(&self, user_id: &UserId) -> Option<Arc<Mutex<ProgressStats>>> {
        self.stats.get(user_id).map(|entry| Arc::clone(entry.value()))
    }
}

impl ProgressRepository for InMemoryAccountRepository {
    async fn get(&self, user_id: &UserId) -> AuthResult<Option<ProgressStats>> {
        match self.stats_cell(user_id) {
            Some(cell) => Ok(Some(cell.lock().await.clone())),
            None => Ok(None),
        }
    }

    async fn modify<F>(&self, user_id: &UserId, f: F) -> AuthResult<ProgressStats>
    where
        F: FnOnce(&mut ProgressStats) + Send,
    {
        let cell = self.stats_cell(user_id).ok_or(AuthError::UserNotFound)?;
        let mut stats = cell.lock().await;
        f(&mut *stats);
        Ok(stats.clone())
    }
}
