//! API DTOs (Data Transfer Objects)
//!
//! Request bodies accept both camelCase and snake_case field names.
//! Responses are snake_case and never carry the password hash.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entity::{
    progress::{ProgressStats, StatsPatch},
    user::User,
};
use crate::domain::value_object::difficulty::Difficulty;

// ============================================================================
// Register / Login
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default, alias = "leetcode_username")]
    pub leetcode_username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Returned by register and login
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub token: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogoutResponse {
    pub success: bool,
}

// ============================================================================
// Profile
// ============================================================================

/// Public view of a user
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub user_id: String,
    pub email: String,
    pub username: String,
    pub leetcode_username: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.user_id.to_string(),
            email: user.email.to_string(),
            username: user.user_name.original().to_string(),
            leetcode_username: user
                .leetcode_name
                .as_ref()
                .map(|n| n.original().to_string()),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UserEnvelope {
    pub user: UserResponse,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileResponse {
    pub user: UserResponse,
    pub stats: ProgressResponse,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub email: Option<String>,
    pub username: Option<String>,
    #[serde(alias = "leetcode_username")]
    pub leetcode_username: Option<String>,
}

// ============================================================================
// Progress
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ProgressResponse {
    pub total_attempted: u32,
    pub total_solved: u32,
    pub easy_solved: u32,
    pub medium_solved: u32,
    pub hard_solved: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub enrolled_paths: u32,
    pub completed_paths: u32,
    pub last_activity_date: Option<DateTime<Utc>>,
}

impl From<ProgressStats> for ProgressResponse {
    fn from(stats: ProgressStats) -> Self {
        Self {
            total_attempted: stats.total_attempted,
            total_solved: stats.total_solved,
            easy_solved: stats.easy_solved,
            medium_solved: stats.medium_solved,
            hard_solved: stats.hard_solved,
            current_streak: stats.current_streak,
            longest_streak: stats.longest_streak,
            enrolled_paths: stats.enrolled_paths,
            completed_paths: stats.completed_paths,
            last_activity_date: stats.last_activity_date,
        }
    }
}

/// Returned by `POST /progress`
#[derive(Debug, Clone, Serialize)]
pub struct ProgressUpdateResponse {
    pub success: bool,
    pub stats: ProgressResponse,
}

/// `POST /progress` body, discriminated by `action`
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ProgressRequest {
    QuestionSolved { difficulty: Difficulty },
    UpdateStats { stats: StatsUpdate },
}

/// Fields a client may set directly
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StatsUpdate {
    #[serde(alias = "enrolled_paths")]
    pub enrolled_paths: Option<u32>,
    #[serde(alias = "completed_paths")]
    pub completed_paths: Option<u32>,
    #[serde(alias = "current_streak")]
    pub current_streak: Option<u32>,
}

impl From<StatsUpdate> for StatsPatch {
    fn from(update: StatsUpdate) -> Self {
        Self {
            enrolled_paths: update.enrolled_paths,
            completed_paths: update.completed_paths,
            current_streak: update.current_streak,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_accepts_both_spellings() {
        let camel: RegisterRequest = serde_json::from_str(
            r#"{"email":"a@x.com","username":"alice","password":"pw123456","leetcodeUsername":"al"}"#,
        )
        .unwrap();
        let snake: RegisterRequest = serde_json::from_str(
            r#"{"email":"a@x.com","username":"alice","password":"pw123456","leetcode_username":"al"}"#,
        )
        .unwrap();
        assert_eq!(camel.leetcode_username.as_deref(), Some("al"));
        assert_eq!(snake.leetcode_username.as_deref(), Some("al"));
    }

    #[test]
    fn test_progress_request_actions() {
        let solved: ProgressRequest =
            serde_json::from_str(r#"{"action":"question_solved","difficulty":"hard"}"#).unwrap();
        assert!(matches!(
            solved,
            ProgressRequest::QuestionSolved {
                difficulty: Difficulty::Hard
            }
        ));

        let update: ProgressRequest = serde_json::from_str(
            r#"{"action":"update_stats","stats":{"current_streak":0,"enrolledPaths":2}}"#,
        )
        .unwrap();
        let ProgressRequest::UpdateStats { stats } = update else {
            panic!("expected update_stats");
        };
        assert_eq!(stats.current_streak, Some(0));
        assert_eq!(stats.enrolled_paths, Some(2));

        assert!(serde_json::from_str::<ProgressRequest>(r#"{"action":"delete_everything"}"#).is_err());
        assert!(
            serde_json::from_str::<ProgressRequest>(
                r#"{"action":"update_stats","stats":{"total_solved":99}}"#
            )
            .is_err()
        );
    }

    #[test]
    fn test_user_response_has_no_hash() {
        let json = serde_json::to_value(UserResponse {
            user_id: "id".into(),
            email: "a@x.com".into(),
            username: "alice".into(),
            leetcode_username: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        })
        .unwrap();
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["username"], "alice");
        assert_eq!(json["user_id"], "id");
        assert!(json.get("leetcode_username").is_some());
        assert!(json.get("created_at").is_some());
        assert!(json.get("userId").is_none());
    }

    #[test]
    fn test_progress_update_envelope() {
        let json = serde_json::to_value(ProgressUpdateResponse {
            success: true,
            stats: ProgressResponse::from(ProgressStats::default()),
        })
        .unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["stats"]["total_solved"], 0);
        assert_eq!(json["stats"]["longest_streak"], 0);
        assert!(json["stats"].get("totalSolved").is_none());
    }
}
