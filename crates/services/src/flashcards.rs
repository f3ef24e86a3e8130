use rand::rngs::StdRng;
use std::sync::Arc;
use tracing::debug;

use bergen_core::model::WordEntry;
use storage::WordBank;

use crate::config::FlashcardConfig;

/// Tap-through flashcards: term on the front, meaning and explanation on the back.
///
/// Tapping a hidden card reveals it; tapping a revealed card moves on. After the
/// last card a fresh random set is drawn.
#[derive(Debug)]
pub struct FlashcardSession {
    bank: Arc<WordBank>,
    card_count: usize,
    rng: StdRng,
    cards: Vec<WordEntry>,
    current: usize,
    showing_answer: bool,
    rounds: u32,
}

impl FlashcardSession {
    #[must_use]
    pub fn new(bank: Arc<WordBank>, config: &FlashcardConfig) -> Self {
        let mut session = Self {
            bank,
            card_count: config.card_count,
            rng: config.rng(),
            cards: Vec::new(),
            current: 0,
            showing_answer: false,
            rounds: 0,
        };
        session.reload();
        session
    }

    fn reload(&mut self) {
        self.cards = self.bank.sample_with(self.card_count, &mut self.rng);
        self.current = 0;
        self.showing_answer = false;
        self.rounds = self.rounds.saturating_add(1);
        debug!(cards = self.cards.len(), round = self.rounds, "loaded flashcards");
    }

    #[must_use]
    pub fn current(&self) -> Option<&WordEntry> {
        self.cards.get(self.current)
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    #[must_use]
    pub fn showing_answer(&self) -> bool {
        self.showing_answer
    }

    /// How many card sets have been drawn, including the first.
    #[must_use]
    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    #[must_use]
    pub fn front(&self) -> Option<&str> {
        self.current().map(WordEntry::term)
    }

    #[must_use]
    pub fn back(&self) -> Option<String> {
        self.current().map(back_text)
    }

    pub fn tap(&mut self) {
        if self.cards.is_empty() {
            return;
        }
        if !self.showing_answer {
            self.showing_answer = true;
        } else if self.current + 1 < self.cards.len() {
            self.current += 1;
            self.showing_answer = false;
        } else {
            self.reload();
        }
    }
}

fn back_text(entry: &WordEntry) -> String {
    let mut text = entry.correct_options().join("\n");
    if let Some(lines) = entry.explanation() {
        text.push_str("\n\n");
        text.push_str(&lines.join("\n"));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use bergen_core::model::WordChapter;

    fn bank(n: usize) -> Arc<WordBank> {
        let entries = (0..n)
            .map(|i| {
                WordEntry::new(
                    format!("ord{i}"),
                    vec![format!("betydning {i}"), format!("alternativ {i}")],
                    Vec::new(),
                    (i == 0).then(|| vec!["Første linje.".to_owned(), "Andre linje.".to_owned()]),
                    "Uttrykk",
                )
                .unwrap()
            })
            .collect();
        Arc::new(WordBank::new(vec![WordChapter::new("Uttrykk", entries)]))
    }

    fn config(card_count: usize) -> FlashcardConfig {
        FlashcardConfig {
            card_count,
            seed: Some(5),
        }
    }

    #[test]
    fn tap_reveals_then_advances() {
        let mut cards = FlashcardSession::new(bank(5), &config(3));
        assert_eq!(cards.len(), 3);
        assert!(!cards.showing_answer());

        cards.tap();
        assert!(cards.showing_answer());
        assert_eq!(cards.current_index(), 0);

        cards.tap();
        assert!(!cards.showing_answer());
        assert_eq!(cards.current_index(), 1);
    }

    #[test]
    fn tapping_past_the_last_card_reloads() {
        let mut cards = FlashcardSession::new(bank(5), &config(2));
        for _ in 0..4 {
            cards.tap();
        }
        assert_eq!(cards.rounds(), 2);
        assert_eq!(cards.current_index(), 0);
        assert!(!cards.showing_answer());
        assert_eq!(cards.len(), 2);
    }

    #[test]
    fn back_lists_meanings_then_explanation() {
        let bank = bank(1);
        let cards = FlashcardSession::new(bank, &config(1));
        assert_eq!(cards.front(), Some("ord0"));
        assert_eq!(
            cards.back().unwrap(),
            "betydning 0\nalternativ 0\n\nFørste linje.\nAndre linje."
        );
    }

    #[test]
    fn empty_bank_has_no_cards() {
        let mut cards = FlashcardSession::new(Arc::new(WordBank::default()), &config(20));
        cards.tap();
        assert!(cards.is_empty());
        assert!(cards.front().is_none());
        assert!(!cards.showing_answer());
    }
}
