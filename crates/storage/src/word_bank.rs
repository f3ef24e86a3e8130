use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};

use bergen_core::model::{WordChapter, WordEntry};

use crate::repository::{StorageError, WordRepository};

/// Immutable word collection grouped by category.
///
/// Sampling never repeats an entry within one call and never fails: asking for more
/// entries than exist returns everything available, in random order.
#[derive(Debug, Clone, Default)]
pub struct WordBank {
    chapters: Vec<WordChapter>,
    entries: Vec<WordEntry>,
}

impl WordBank {
    #[must_use]
    pub fn new(chapters: Vec<WordChapter>) -> Self {
        let entries = chapters
            .iter()
            .flat_map(|c| c.entries().iter().cloned())
            .collect();
        Self { chapters, entries }
    }

    /// Load a bank from any word source.
    ///
    /// # Errors
    ///
    /// Propagates `StorageError` from the repository.
    pub async fn load(repo: &dyn WordRepository) -> Result<Self, StorageError> {
        let chapters = repo.load_chapters().await?;
        Ok(Self::new(chapters))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn entries(&self) -> &[WordEntry] {
        &self.entries
    }

    /// Category names in load order.
    #[must_use]
    pub fn category_names(&self) -> Vec<&str> {
        self.chapters.iter().map(WordChapter::name).collect()
    }

    #[must_use]
    pub fn chapter(&self, name: &str) -> Option<&WordChapter> {
        self.chapters.iter().find(|c| c.name() == name)
    }

    /// Up to `n` distinct entries in random order.
    #[must_use]
    pub fn sample(&self, n: usize) -> Vec<WordEntry> {
        self.sample_with(n, &mut rand::rng())
    }

    #[must_use]
    pub fn sample_with<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Vec<WordEntry> {
        shuffled_prefix(&self.entries, n, rng)
    }

    /// Up to `n` distinct entries from one category; an unknown category yields nothing.
    #[must_use]
    pub fn sample_from_category(&self, name: &str, n: usize) -> Vec<WordEntry> {
        self.sample_from_category_with(name, n, &mut rand::rng())
    }

    #[must_use]
    pub fn sample_from_category_with<R: Rng + ?Sized>(
        &self,
        name: &str,
        n: usize,
        rng: &mut R,
    ) -> Vec<WordEntry> {
        self.chapter(name)
            .map(|chapter| shuffled_prefix(chapter.entries(), n, rng))
            .unwrap_or_default()
    }

    #[must_use]
    pub fn random_entry(&self) -> Option<&WordEntry> {
        self.random_entry_with(&mut rand::rng())
    }

    #[must_use]
    pub fn random_entry_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&WordEntry> {
        self.entries.choose(rng)
    }
}

fn shuffled_prefix<R: Rng + ?Sized>(
    entries: &[WordEntry],
    n: usize,
    rng: &mut R,
) -> Vec<WordEntry> {
    let mut picked: Vec<WordEntry> = entries.to_vec();
    picked.shuffle(rng);
    picked.truncate(n);
    picked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryRepository;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    fn chapter(name: &str, terms: &[&str]) -> WordChapter {
        let entries = terms
            .iter()
            .map(|t| {
                WordEntry::new(
                    *t,
                    vec![format!("{t} riktig")],
                    vec![format!("{t} feil")],
                    None,
                    name,
                )
                .unwrap()
            })
            .collect();
        WordChapter::new(name, entries)
    }

    fn bank() -> WordBank {
        WordBank::new(vec![
            chapter("Uttrykk", &["a", "b", "c"]),
            chapter("Personer", &["pjokk", "tøs"]),
        ])
    }

    #[test]
    fn sample_is_without_replacement_and_capped() {
        let bank = bank();
        let mut rng = StdRng::seed_from_u64(42);

        let three = bank.sample_with(3, &mut rng);
        let terms: HashSet<_> = three.iter().map(WordEntry::term).collect();
        assert_eq!(three.len(), 3);
        assert_eq!(terms.len(), 3);

        let all = bank.sample_with(50, &mut rng);
        assert_eq!(all.len(), bank.len());
    }

    #[test]
    fn category_sampling_stays_in_category() {
        let bank = bank();
        let picked = bank.sample_from_category("Personer", 10);
        assert_eq!(picked.len(), 2);
        assert!(picked.iter().all(|e| e.category() == "Personer"));
        assert!(bank.sample_from_category("Ukjent", 3).is_empty());
    }

    #[test]
    fn categories_keep_load_order() {
        assert_eq!(bank().category_names(), vec!["Uttrykk", "Personer"]);
    }

    #[test]
    fn empty_bank_samples_nothing() {
        let bank = WordBank::default();
        assert!(bank.is_empty());
        assert!(bank.sample(10).is_empty());
        assert!(bank.random_entry().is_none());
    }

    #[tokio::test]
    async fn loads_from_repository() {
        let repo = InMemoryRepository::with_chapters(vec![chapter("Uttrykk", &["a"])]);
        let bank = WordBank::load(&repo).await.unwrap();
        assert_eq!(bank.len(), 1);
        assert_eq!(bank.entries()[0].category(), "Uttrykk");
    }
}
