use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::SessionId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SummaryError {
    #[error("completed_at is before started_at")]
    InvalidTimeRange,

    #[error("score ({score}) exceeds total questions ({total})")]
    ScoreExceedsTotal { score: u32, total: u32 },

    #[error("answered ({answered}) + timed out ({timed_out}) exceeds total ({total})")]
    CountMismatch {
        answered: u32,
        timed_out: u32,
        total: u32,
    },
}

/// Aggregate result of a finished quiz session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSummary {
    session_id: SessionId,
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
    total: u32,
    score: u32,
    answered: u32,
    timed_out: u32,
    ended_early: bool,
}

impl QuizSummary {
    /// Build a summary for a completed session.
    ///
    /// # Errors
    ///
    /// Returns `SummaryError::InvalidTimeRange` if `completed_at` is before `started_at`.
    /// Returns `SummaryError::ScoreExceedsTotal` or `SummaryError::CountMismatch` if the
    /// counters cannot describe a real session.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        session_id: SessionId,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
        total: u32,
        score: u32,
        answered: u32,
        timed_out: u32,
        ended_early: bool,
    ) -> Result<Self, SummaryError> {
        if completed_at < started_at {
            return Err(SummaryError::InvalidTimeRange);
        }
        if score > total {
            return Err(SummaryError::ScoreExceedsTotal { score, total });
        }
        if answered.saturating_add(timed_out) > total {
            return Err(SummaryError::CountMismatch {
                answered,
                timed_out,
                total,
            });
        }

        Ok(Self {
            session_id,
            started_at,
            completed_at,
            total,
            score,
            answered,
            timed_out,
            ended_early,
        })
    }

    #[must_use]
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn answered(&self) -> u32 {
        self.answered
    }

    #[must_use]
    pub fn timed_out(&self) -> u32 {
        self.timed_out
    }

    #[must_use]
    pub fn ended_early(&self) -> bool {
        self.ended_early
    }

    /// Score as a whole percentage, rounded down. An empty quiz scores 0%.
    #[must_use]
    pub fn percentage(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        self.score * 100 / self.total
    }
}
