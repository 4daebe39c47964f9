//! Progress Statistics Engine
//!
//! Every write is one atomic read-modify-write through
//! [`ProgressRepository::modify`] and ends in [`ProgressStats::apply`], so
//! the streak recompute and activity stamp happen on a single code path.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::entity::progress::{ProgressStats, StatsPatch};
use crate::domain::repository::ProgressRepository;
use crate::domain::value_object::{difficulty::Difficulty, user_id::UserId};
use crate::error::AuthResult;

pub struct ProgressService<P>
where
    P: ProgressRepository,
{
    repo: Arc<P>,
}

impl<P> ProgressService<P>
where
    P: ProgressRepository,
{
    pub fn new(repo: Arc<P>) -> Self {
        Self { repo }
    }

    /// Current stats, all zero if nothing was recorded yet
    pub async fn get(&self, user_id: &UserId) -> AuthResult<ProgressStats> {
        Ok(self.repo.get(user_id).await?.unwrap_or_default())
    }

    /// Merge an explicit update (e.g. a streak reset)
    pub async fn update(&self, user_id: &UserId, patch: StatsPatch) -> AuthResult<ProgressStats> {
        let now = Utc::now();
        let stats = self
            .repo
            .modify(user_id, move |stats| stats.apply(&patch, now))
            .await?;

        tracing::debug!(user_id = %user_id, current_streak = stats.current_streak, "Stats updated");

        Ok(stats)
    }

    /// Count a solved question
    pub async fn record_solved(
        &self,
        user_id: &UserId,
        difficulty: Difficulty,
    ) -> AuthResult<ProgressStats> {
        let now = Utc::now();
        let stats = self
            .repo
            .modify(user_id, move |stats| stats.record_solved(difficulty, now))
            .await?;

        tracing::info!(
            user_id = %user_id,
            difficulty = %difficulty,
            total_solved = stats.total_solved,
            current_streak = stats.current_streak,
            "Question solved"
        );

        Ok(stats)
    }
}
