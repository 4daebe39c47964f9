//! Progress Statistics Entity
//!
//! Per-user learning counters.
//!
//! ## Invariants
//! - `total_solved == easy_solved + medium_solved + hard_solved` after every
//!   recorded solve
//! - `longest_streak >= current_streak` after every write
//! - `current_streak` only grows through [`ProgressStats::record_solved`];
//!   resets come from an explicit [`StatsPatch`]

use chrono::{DateTime, Utc};

use crate::domain::value_object::difficulty::Difficulty;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressStats {
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

/// Fields an explicit stats update may set; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsPatch {
    pub current_streak: Option<u32>,
    pub enrolled_paths: Option<u32>,
    pub completed_paths: Option<u32>,
}

impl ProgressStats {
    /// Merge `patch`, then recompute derived fields
    ///
    /// Every write goes through here.
    pub fn apply(&mut self, patch: &StatsPatch, now: DateTime<Utc>) {
        if let Some(v) = patch.current_streak {
            self.current_streak = v;
        }
        if let Some(v) = patch.enrolled_paths {
            self.enrolled_paths = v;
        }
        if let Some(v) = patch.completed_paths {
            self.completed_paths = v;
        }

        self.longest_streak = self.longest_streak.max(self.current_streak);
        self.last_activity_date = Some(now);
    }

    /// Count one solved question of the given difficulty
    pub fn record_solved(&mut self, difficulty: Difficulty, now: DateTime<Utc>) {
        self.total_solved = self.total_solved.saturating_add(1);
        self.total_attempted = self.total_attempted.saturating_add(1);
        self.current_streak = self.current_streak.saturating_add(1);

        let counter = match difficulty {
            Difficulty::Easy => &mut self.easy_solved,
            Difficulty::Medium => &mut self.medium_solved,
            Difficulty::Hard => &mut self.hard_solved,
        };
        *counter = counter.saturating_add(1);

        self.apply(&StatsPatch::default(), now);
    }

    pub fn solved_sum_matches(&self) -> bool {
        u64::from(self.easy_solved) + u64::from(self.medium_solved) + u64::from(self.hard_solved)
            == u64::from(self.total_solved)
    }
}
