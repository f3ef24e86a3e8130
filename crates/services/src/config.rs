//! Tunable knobs for quiz and flashcard sessions.

use rand::SeedableRng;
use rand::rngs::StdRng;
use std::time::Duration;

/// Background track played while practicing.
pub const BACKGROUND_TRACK: &str = "anitras-dream";

/// Wall-clock delays that drive one quiz question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizTimings {
    /// From entering a question until the options are shown and the countdown runs.
    pub options_delay: Duration,
    /// Countdown length per question.
    pub answer_window: Duration,
    /// Countdown tick period.
    pub tick: Duration,
    /// From selecting an answer until the result is revealed.
    pub reveal_delay: Duration,
    /// From the reveal until an answered question advances on its own.
    pub auto_advance_delay: Duration,
}

impl Default for QuizTimings {
    fn default() -> Self {
        Self {
            options_delay: Duration::from_millis(1_600),
            answer_window: Duration::from_secs(15),
            tick: Duration::from_millis(100),
            reveal_delay: Duration::from_millis(800),
            auto_advance_delay: Duration::from_millis(4_500),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizConfig {
    pub question_count: usize,
    pub timings: QuizTimings,
    /// Fixed seed for reproducible sampling; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            question_count: 10,
            timings: QuizTimings::default(),
            seed: None,
        }
    }
}

impl QuizConfig {
    #[must_use]
    pub fn with_question_count(mut self, question_count: usize) -> Self {
        self.question_count = question_count;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn rng(&self) -> StdRng {
        seeded_rng(self.seed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashcardConfig {
    pub card_count: usize,
    pub seed: Option<u64>,
}

impl Default for FlashcardConfig {
    fn default() -> Self {
        Self {
            card_count: 20,
            seed: None,
        }
    }
}

impl FlashcardConfig {
    #[must_use]
    pub fn rng(&self) -> StdRng {
        seeded_rng(self.seed)
    }
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}
