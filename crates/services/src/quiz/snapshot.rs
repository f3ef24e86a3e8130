use std::time::Duration;

use bergen_core::model::{QuizSummary, SessionId};

/// Where the current question is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    /// Question entered, options not shown yet.
    AwaitingOptions,
    /// Options shown, countdown running.
    OptionsVisible,
    /// An answer was chosen; the result is not revealed yet.
    AnswerSelected,
    /// The countdown ran out. The result is revealed and an explicit advance is required.
    TimedOut,
    /// The answer's result is revealed.
    ResultRevealed,
    Completed,
}

/// How an option should be styled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionMark {
    Neutral,
    /// Chosen, result pending.
    Selected,
    Correct,
    /// The chosen answer was wrong.
    Wrong,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionView {
    pub text: String,
    pub mark: OptionMark,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionView {
    pub term: String,
    pub category: String,
    pub explanation: Option<String>,
    pub options: Vec<OptionView>,
}

impl QuestionView {
    #[must_use]
    pub fn option_texts(&self) -> Vec<&str> {
        self.options.iter().map(|o| o.text.as_str()).collect()
    }
}

/// Immutable view of a quiz session, published after every transition.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizSnapshot {
    pub session_id: SessionId,
    pub phase: QuizPhase,
    pub current_index: usize,
    pub total: usize,
    pub score: u32,
    pub question: Option<QuestionView>,
    pub selected_answer: Option<String>,
    pub timed_out: bool,
    pub result_revealed: bool,
    /// True when the question waits for an explicit advance (after a timeout).
    pub awaiting_advance: bool,
    pub completed: bool,
    pub time_remaining: Duration,
    /// Remaining share of the countdown, for the timer bar.
    pub time_fraction: f32,
    pub summary: Option<QuizSummary>,
}
