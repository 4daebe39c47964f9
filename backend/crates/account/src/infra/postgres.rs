//! PostgreSQL Repository Implementations
//!
//! Uniqueness is enforced by the unique constraints in
//! `database/migrations`; a violation is mapped back to the field it names.
//! Progress updates lock the row with `SELECT ... FOR UPDATE` inside a
//! transaction.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

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

const USER_COLUMNS: &str = r#"
    user_id,
    email,
    user_name,
    leetcode_name,
    password_hash,
    created_at,
    updated_at
"#;

const STATS_COLUMNS: &str = r#"
    total_attempted,
    total_solved,
    easy_solved,
    medium_solved,
    hard_solved,
    current_streak,
    longest_streak,
    enrolled_paths,
    completed_paths,
    last_activity_date
"#;

/// PostgreSQL-backed account repository
#[derive(Clone)]
pub struct PgAccountRepository {
    pool: PgPool,
}

impl PgAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for PgAccountRepository {
    async fn create(&self, user: &User) -> AuthResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO users (
                user_id,
                email,
                user_name,
                user_name_canonical,
                leetcode_name,
                leetcode_name_canonical,
                password_hash,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(user.email.as_str())
        .bind(user.user_name.original())
        .bind(user.user_name.canonical())
        .bind(user.leetcode_name.as_ref().map(|n| n.original()))
        .bind(user.leetcode_name.as_ref().map(|n| n.canonical()))
        .bind(user.password.as_phc_string())
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(map_unique_violation)?;

        sqlx::query("INSERT INTO user_stats (user_id) VALUES ($1)")
            .bind(user.user_id.as_uuid())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE user_id = $1"
        ))
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn update(&self, user_id: &UserId, patch: &UserPatch) -> AuthResult<User> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE user_id = $1 FOR UPDATE"
        ))
        .bind(user_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AuthError::UserNotFound)?;

        let mut user = row.into_user()?;
        user.apply_patch(patch, Utc::now());

        // Unchanged values match their own row and never trip the constraints
        sqlx::query(
            r#"
            UPDATE users SET
                email = $2,
                user_name = $3,
                user_name_canonical = $4,
                leetcode_name = $5,
                leetcode_name_canonical = $6,
                updated_at = $7
            WHERE user_id = $1
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(user.email.as_str())
        .bind(user.user_name.original())
        .bind(user.user_name.canonical())
        .bind(user.leetcode_name.as_ref().map(|n| n.original()))
        .bind(user.leetcode_name.as_ref().map(|n| n.canonical()))
        .bind(user.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(map_unique_violation)?;

        tx.commit().await?;

        Ok(user)
    }

    async fn set_password_hash(
        &self,
        user_id: &UserId,
        password: &UserPassword,
    ) -> AuthResult<()> {
        let updated = sqlx::query(
            "UPDATE users SET password_hash = $2, updated_at = $3 WHERE user_id = $1",
        )
        .bind(user_id.as_uuid())
        .bind(password.as_phc_string())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(AuthError::UserNotFound);
        }

        Ok(())
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(email.as_str())
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn exists_by_user_name(&self, user_name: &UserName) -> AuthResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE user_name_canonical = $1)",
        )
        .bind(user_name.canonical())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn exists_by_leetcode_name(&self, leetcode_name: &LeetcodeName) -> AuthResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE leetcode_name_canonical = $1)",
        )
        .bind(leetcode_name.canonical())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}

// ============================================================================
// Progress Repository Implementation
// ============================================================================

impl ProgressRepository for PgAccountRepository {
    async fn get(&self, user_id: &UserId) -> AuthResult<Option<ProgressStats>> {
        let row = sqlx::query_as::<_, StatsRow>(&format!(
            "SELECT {STATS_COLUMNS} FROM user_stats WHERE user_id = $1"
        ))
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(StatsRow::into_stats).transpose()
    }

    async fn modify<F>(&self, user_id: &UserId, f: F) -> AuthResult<ProgressStats>
    where
        F: FnOnce(&mut ProgressStats) + Send,
    {
        let mut tx = self.pool.begin().await?;

        let user_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE user_id = $1)")
                .bind(user_id.as_uuid())
                .fetch_one(&mut *tx)
                .await?;
        if !user_exists {
            return Err(AuthError::UserNotFound);
        }

        // Baseline for users created before the stats table existed
        sqlx::query("INSERT INTO user_stats (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
            .bind(user_id.as_uuid())
            .execute(&mut *tx)
            .await?;

        let row = sqlx::query_as::<_, StatsRow>(&format!(
            "SELECT {STATS_COLUMNS} FROM user_stats WHERE user_id = $1 FOR UPDATE"
        ))
        .bind(user_id.as_uuid())
        .fetch_one(&mut *tx)
        .await?;

        let mut stats = row.into_stats()?;
        f(&mut stats);

        sqlx::query(
            r#"
            UPDATE user_stats SET
                total_attempted = $2,
                total_solved = $3,
                easy_solved = $4,
                medium_solved = $5,
                hard_solved = $6,
                current_streak = $7,
                longest_streak = $8,
                enrolled_paths = $9,
                completed_paths = $10,
                last_activity_date = $11
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(i64::from(stats.total_attempted))
        .bind(i64::from(stats.total_solved))
        .bind(i64::from(stats.easy_solved))
        .bind(i64::from(stats.medium_solved))
        .bind(i64::from(stats.hard_solved))
        .bind(i64::from(stats.current_streak))
        .bind(i64::from(stats.longest_streak))
        .bind(i64::from(stats.enrolled_paths))
        .bind(i64::from(stats.completed_paths))
        .bind(stats.last_activity_date)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(stats)
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: Uuid,
    email: String,
    user_name: String,
    leetcode_name: Option<String>,
    password_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> AuthResult<User> {
        Ok(User {
            user_id: UserId::from_uuid(self.user_id),
            email: Email::from_db(self.email),
            user_name: UserName::from_db(&self.user_name),
            leetcode_name: self.leetcode_name.as_deref().map(LeetcodeName::from_db),
            password: UserPassword::from_phc_string(self.password_hash)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct StatsRow {
    total_attempted: i64,
    total_solved: i64,
    easy_solved: i64,
    medium_solved: i64,
    hard_solved: i64,
    current_streak: i64,
    longest_streak: i64,
    enrolled_paths: i64,
    completed_paths: i64,
    last_activity_date: Option<DateTime<Utc>>,
}

impl StatsRow {
    fn into_stats(self) -> AuthResult<ProgressStats> {
        Ok(ProgressStats {
            total_attempted: counter(self.total_attempted, "total_attempted")?,
            total_solved: counter(self.total_solved, "total_solved")?,
            easy_solved: counter(self.easy_solved, "easy_solved")?,
            medium_solved: counter(self.medium_solved, "medium_solved")?,
            hard_solved: counter(self.hard_solved, "hard_solved")?,
            current_streak: counter(self.current_streak, "current_streak")?,
            longest_streak: counter(self.longest_streak, "longest_streak")?,
            enrolled_paths: counter(self.enrolled_paths, "enrolled_paths")?,
            completed_paths: counter(self.completed_paths, "completed_paths")?,
            last_activity_date: self.last_activity_date,
        })
    }
}

fn counter(value: i64, column: &str) -> AuthResult<u32> {
    u32::try_from(value)
        .map_err(|_| AuthError::Internal(format!("Out of range value in {}: {}", column, value)))
}

/// Turn a unique-constraint violation into the matching `*Taken` error
fn map_unique_violation(err: sqlx::Error) -> AuthError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("23505") {
            match db_err.constraint() {
                Some("users_email_key") => return AuthError::EmailTaken,
                Some("users_user_name_key") => return AuthError::UserNameTaken,
                Some("users_leetcode_name_key") => return AuthError::LeetcodeNameTaken,
                _ => {}
            }
        }
    }
    AuthError::Database(err)
}
