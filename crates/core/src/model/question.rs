use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};

use crate::model::WordEntry;

/// Maximum number of options shown for a single question (a 2×2 grid).
pub const MAX_OPTIONS: usize = 4;

/// Wrong options drawn next to the single correct one.
pub const MAX_WRONG_OPTIONS: usize = MAX_OPTIONS - 1;

/// A multiple-choice presentation of one `WordEntry`.
///
/// `options` always holds exactly one correct answer and up to three wrong ones.
/// The full set of correct answers is kept for scoring, and the wrong-option pool
/// is kept so the display can be redrawn each time the question is entered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizQuestion {
    term: String,
    category: String,
    options: Vec<String>,
    correct_answers: Vec<String>,
    wrong_pool: Vec<String>,
    explanation: Option<String>,
}

impl QuizQuestion {
    /// Derive a question from a word entry and draw its first option set.
    #[must_use]
    pub fn from_entry<R: Rng + ?Sized>(entry: &WordEntry, rng: &mut R) -> Self {
        let mut question = Self {
            term: entry.term().to_owned(),
            category: entry.category().to_owned(),
            options: Vec::with_capacity(MAX_OPTIONS),
            correct_answers: entry.correct_options().to_vec(),
            wrong_pool: entry.wrong_options().to_vec(),
            explanation: entry.explanation().map(|lines| lines.join(" ")),
        };
        question.draw_options(rng);
        question
    }

    /// Pick one correct answer and up to three distinct wrong answers, then shuffle.
    pub fn draw_options<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let mut options = Vec::with_capacity(MAX_OPTIONS);
        if let Some(correct) = self.correct_answers.choose(rng) {
            options.push(correct.clone());
        }
        options.extend(
            self.wrong_pool
                .choose_multiple(rng, MAX_WRONG_OPTIONS)
                .cloned(),
        );
        options.shuffle(rng);
        self.options = options;
    }

    #[must_use]
    pub fn term(&self) -> &str {
        &self.term
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Options in display order.
    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_answers(&self) -> &[String] {
        &self.correct_answers
    }

    #[must_use]
    pub fn explanation(&self) -> Option<&str> {
        self.explanation.as_deref()
    }

    #[must_use]
    pub fn is_correct(&self, answer: &str) -> bool {
        self.correct_answers.iter().any(|c| c == answer)
    }

    #[must_use]
    pub fn has_option(&self, answer: &str) -> bool {
        self.options.iter().any(|o| o == answer)
    }
}
