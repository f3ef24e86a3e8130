use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};

use bergen_core::model::{QuizQuestion, QuizSummary, SessionId, WordEntry};
use storage::WordBank;

use super::snapshot::{OptionMark, OptionView, QuestionView, QuizPhase, QuizSnapshot};
use crate::Clock;
use crate::config::QuizConfig;

/// Whether a transition changed the session.
///
/// Invalid transitions are not errors: they are reported as `Ignored` and leave the
/// session untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Transition {
    Applied,
    Ignored,
}

impl Transition {
    #[must_use]
    pub fn is_applied(self) -> bool {
        matches!(self, Transition::Applied)
    }
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One run through up to `question_count` quiz questions.
///
/// The session is a pure state machine: it never sleeps or spawns. Callers feed it
/// ticks and user actions one at a time (see `QuizController`).
pub struct QuizSession {
    id: SessionId,
    clock: Clock,
    rng: StdRng,
    config: QuizConfig,
    questions: Vec<QuizQuestion>,
    current: usize,
    score: u32,
    answered: u32,
    timed_out_count: u32,
    selected_answer: Option<String>,
    options_visible: bool,
    timed_out: bool,
    result_revealed: bool,
    completed: bool,
    ended_early: bool,
    time_remaining: Duration,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl QuizSession {
    /// Sample questions from `bank` and enter the first one.
    ///
    /// A bank with fewer entries than `config.question_count` yields a shorter session;
    /// an empty bank yields a session that is already completed.
    #[must_use]
    pub fn start(bank: &WordBank, config: &QuizConfig, clock: Clock) -> Self {
        Self::start_with_rng(bank, config, clock, config.rng())
    }

    #[must_use]
    pub fn start_with_rng(
        bank: &WordBank,
        config: &QuizConfig,
        clock: Clock,
        mut rng: StdRng,
    ) -> Self {
        let entries = bank.sample_with(config.question_count, &mut rng);
        Self::from_entries(&entries, config, clock, rng)
    }

    /// Build a session from an explicit entry list, keeping at most `question_count`.
    #[must_use]
    pub fn from_entries(
        entries: &[WordEntry],
        config: &QuizConfig,
        clock: Clock,
        mut rng: StdRng,
    ) -> Self {
        let questions: Vec<QuizQuestion> = entries
            .iter()
            .take(config.question_count)
            .map(|entry| QuizQuestion::from_entry(entry, &mut rng))
            .collect();
        let started_at = clock.now();

        let mut session = Self {
            id: SessionId::new(),
            clock,
            rng,
            config: config.clone(),
            questions,
            current: 0,
            score: 0,
            answered: 0,
            timed_out_count: 0,
            selected_answer: None,
            options_visible: false,
            timed_out: false,
            result_revealed: false,
            completed: false,
            ended_early: false,
            time_remaining: config.timings.answer_window,
            started_at,
            completed_at: None,
        };

        info!(
            session = %session.id,
            questions = session.questions.len(),
            requested = config.question_count,
            "quiz session started"
        );

        if session.questions.is_empty() {
            session.complete(false);
        } else {
            session.begin_question();
        }
        session
    }

    /// Discard this session and start a fresh one from `bank` with the same settings.
    pub fn restart(&mut self, bank: &WordBank) {
        let entries = bank.sample_with(self.config.question_count, &mut self.rng);
        let rng = self.rng.clone();
        *self = Self::from_entries(&entries, &self.config, self.clock, rng);
    }

    //
    // ─── ACCESSORS ─────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&QuizQuestion> {
        if self.completed {
            return None;
        }
        self.questions.get(self.current)
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn selected_answer(&self) -> Option<&str> {
        self.selected_answer.as_deref()
    }

    #[must_use]
    pub fn timed_out(&self) -> bool {
        self.timed_out
    }

    #[must_use]
    pub fn result_revealed(&self) -> bool {
        self.result_revealed
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completed
    }

    #[must_use]
    pub fn time_remaining(&self) -> Duration {
        self.time_remaining
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn phase(&self) -> QuizPhase {
        if self.completed {
            QuizPhase::Completed
        } else if self.timed_out {
            QuizPhase::TimedOut
        } else if self.result_revealed {
            QuizPhase::ResultRevealed
        } else if self.selected_answer.is_some() {
            QuizPhase::AnswerSelected
        } else if self.options_visible {
            QuizPhase::OptionsVisible
        } else {
            QuizPhase::AwaitingOptions
        }
    }

    //
    // ─── TRANSITIONS ───────────────────────────────────────────────────────────
    //

    fn begin_question(&mut self) {
        let Some(question) = self.questions.get_mut(self.current) else {
            return;
        };
        question.draw_options(&mut self.rng);
        self.selected_answer = None;
        self.options_visible = false;
        self.result_revealed = false;
        self.timed_out = false;
        self.time_remaining = self.config.timings.answer_window;
        debug!(session = %self.id, index = self.current, "question entered");
    }

    /// Show the options and let the countdown run.
    pub fn show_options(&mut self) -> Transition {
        if self.phase() != QuizPhase::AwaitingOptions {
            return self.ignored("show_options");
        }
        self.options_visible = true;
        Transition::Applied
    }

    /// Advance the countdown by `elapsed`; reaching zero times the question out.
    pub fn tick(&mut self, elapsed: Duration) -> Transition {
        if self.phase() != QuizPhase::OptionsVisible {
            return Transition::Ignored;
        }
        self.time_remaining = self.time_remaining.saturating_sub(elapsed);
        if self.time_remaining.is_zero() {
            return self.time_out();
        }
        Transition::Applied
    }

    /// Time out the current question: reveal immediately, award nothing.
    fn time_out(&mut self) -> Transition {
        if self.phase() != QuizPhase::OptionsVisible {
            return self.ignored("time_out");
        }
        self.time_remaining = Duration::ZERO;
        self.timed_out = true;
        self.result_revealed = true;
        self.timed_out_count = self.timed_out_count.saturating_add(1);
        debug!(session = %self.id, index = self.current, "question timed out");
        Transition::Applied
    }

    /// Select an answer. Only the first selection per question counts, and only
    /// while the options are on display and the countdown runs.
    pub fn select_answer(&mut self, answer: &str) -> Transition {
        if self.phase() != QuizPhase::OptionsVisible {
            return self.ignored("select_answer");
        }
        let Some(question) = self.questions.get(self.current) else {
            return self.ignored("select_answer");
        };
        if !question.has_option(answer) {
            return self.ignored("select_answer");
        }

        let correct = question.is_correct(answer);
        if correct {
            self.score = self.score.saturating_add(1);
        }
        self.answered = self.answered.saturating_add(1);
        self.selected_answer = Some(answer.to_owned());
        debug!(
            session = %self.id,
            index = self.current,
            correct,
            score = self.score,
            "answer selected"
        );
        Transition::Applied
    }

    /// Select the option at `index` in display order.
    pub fn select_option(&mut self, index: usize) -> Transition {
        let option = self
            .current_question()
            .and_then(|q| q.options().get(index))
            .cloned();
        match option {
            Some(option) => self.select_answer(&option),
            None => self.ignored("select_option"),
        }
    }

    /// Reveal the result of a selected answer.
    pub fn reveal_result(&mut self) -> Transition {
        if self.phase() != QuizPhase::AnswerSelected {
            return self.ignored("reveal_result");
        }
        self.result_revealed = true;
        Transition::Applied
    }

    /// Move to the next question, or complete the session after the last one.
    pub fn next_question(&mut self) -> Transition {
        if self.completed || !self.result_revealed {
            return self.ignored("next_question");
        }
        if self.current + 1 < self.questions.len() {
            self.current += 1;
            self.begin_question();
        } else {
            self.complete(false);
        }
        Transition::Applied
    }

    /// Stop now, keeping the points earned so far.
    pub fn end_early(&mut self) -> Transition {
        if self.completed {
            return self.ignored("end_early");
        }
        self.complete(true);
        Transition::Applied
    }

    fn complete(&mut self, ended_early: bool) {
        self.completed = true;
        self.ended_early = ended_early;
        self.completed_at = Some(self.clock.now());
        info!(
            session = %self.id,
            score = self.score,
            total = self.questions.len(),
            ended_early,
            "quiz session completed"
        );
    }

    fn ignored(&self, transition: &'static str) -> Transition {
        debug!(session = %self.id, transition, phase = ?self.phase(), "transition ignored");
        Transition::Ignored
    }

    //
    // ─── VIEWS ─────────────────────────────────────────────────────────────────
    //

    /// Summary of a completed session.
    #[must_use]
    pub fn summary(&self) -> Option<QuizSummary> {
        let completed_at = self.completed_at?;
        let total = u32::try_from(self.questions.len()).unwrap_or(u32::MAX);
        match QuizSummary::new(
            self.id,
            self.started_at,
            completed_at,
            total,
            self.score,
            self.answered,
            self.timed_out_count,
            self.ended_early,
        ) {
            Ok(summary) => Some(summary),
            Err(err) => {
                warn!(session = %self.id, error = %err, "could not build quiz summary");
                None
            }
        }
    }

    fn option_mark(&self, question: &QuizQuestion, option: &str) -> OptionMark {
        let chosen = self.selected_answer.as_deref() == Some(option);
        if !self.result_revealed {
            return if chosen {
                OptionMark::Selected
            } else {
                OptionMark::Neutral
            };
        }
        if question.is_correct(option) {
            OptionMark::Correct
        } else if chosen {
            OptionMark::Wrong
        } else {
            OptionMark::Neutral
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> QuizSnapshot {
        let question = self.current_question().map(|q| QuestionView {
            term: q.term().to_owned(),
            category: q.category().to_owned(),
            explanation: q.explanation().map(str::to_owned),
            options: q
                .options()
                .iter()
                .map(|text| OptionView {
                    text: text.clone(),
                    mark: self.option_mark(q, text),
                })
                .collect(),
        });
        let window = self.config.timings.answer_window;
        let time_fraction = if window.is_zero() {
            0.0
        } else {
            (self.time_remaining.as_secs_f32() / window.as_secs_f32()).clamp(0.0, 1.0)
        };

        QuizSnapshot {
            session_id: self.id,
            phase: self.phase(),
            current_index: self.current,
            total: self.questions.len(),
            score: self.score,
            question,
            selected_answer: self.selected_answer.clone(),
            timed_out: self.timed_out,
            result_revealed: self.result_revealed,
            awaiting_advance: self.timed_out && !self.completed,
            completed: self.completed,
            time_remaining: self.time_remaining,
            time_fraction,
            summary: self.summary(),
        }
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("id", &self.id)
            .field("questions_len", &self.questions.len())
            .field("current", &self.current)
            .field("score", &self.score)
            .field("phase", &self.phase())
            .field("time_remaining", &self.time_remaining)
            .field("started_at", &self.started_at)
            .field("completed_at", &self.completed_at)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
