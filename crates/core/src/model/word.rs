use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum WordError {
    #[error("term cannot be empty")]
    EmptyTerm,

    #[error("word `{term}` has no correct options")]
    NoCorrectOptions { term: String },
}

//
// ─── PERSISTED SHAPE ───────────────────────────────────────────────────────────
//

/// A single word record as it appears in a chapter JSON file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordRecord {
    pub term: String,
    pub correct_options: Vec<String>,
    #[serde(default)]
    pub wrong_options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_explanation: Option<Vec<String>>,
}

/// A chapter file: one category name plus its entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterRecord {
    pub chapter: String,
    pub entries: Vec<WordRecord>,
}

//
// ─── DOMAIN TYPES ──────────────────────────────────────────────────────────────
//

/// A dialect term with its correct and incorrect definitions.
///
/// Options are stored as ordered sets: duplicates are dropped (first occurrence wins)
/// and a wrong option never repeats a correct one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordEntry {
    term: String,
    correct_options: Vec<String>,
    wrong_options: Vec<String>,
    explanation: Option<Vec<String>>,
    category: String,
}

impl WordEntry {
    /// Build a validated word entry.
    ///
    /// # Errors
    ///
    /// Returns `WordError::EmptyTerm` if the term is blank.
    /// Returns `WordError::NoCorrectOptions` if no non-blank correct option remains.
    pub fn new(
        term: impl Into<String>,
        correct_options: impl IntoIterator<Item = String>,
        wrong_options: impl IntoIterator<Item = String>,
        explanation: Option<Vec<String>>,
        category: impl Into<String>,
    ) -> Result<Self, WordError> {
        let term = term.into().trim().to_owned();
        if term.is_empty() {
            return Err(WordError::EmptyTerm);
        }

        let correct_options = dedup_options(correct_options, &[]);
        if correct_options.is_empty() {
            return Err(WordError::NoCorrectOptions { term });
        }
        let wrong_options = dedup_options(wrong_options, &correct_options);
        let explanation = explanation.filter(|lines| !lines.is_empty());

        Ok(Self {
            term,
            correct_options,
            wrong_options,
            explanation,
            category: category.into(),
        })
    }

    /// Convert a persisted record into a domain entry tagged with `category`.
    ///
    /// # Errors
    ///
    /// Same as [`WordEntry::new`].
    pub fn from_record(record: WordRecord, category: &str) -> Result<Self, WordError> {
        Self::new(
            record.term,
            record.correct_options,
            record.wrong_options,
            record.long_explanation,
            category,
        )
    }

    #[must_use]
    pub fn term(&self) -> &str {
        &self.term
    }

    #[must_use]
    pub fn correct_options(&self) -> &[String] {
        &self.correct_options
    }

    #[must_use]
    pub fn wrong_options(&self) -> &[String] {
        &self.wrong_options
    }

    #[must_use]
    pub fn explanation(&self) -> Option<&[String]> {
        self.explanation.as_deref()
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn is_correct(&self, option: &str) -> bool {
        self.correct_options.iter().any(|o| o == option)
    }
}

fn dedup_options(options: impl IntoIterator<Item = String>, exclude: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for option in options {
        let option = option.trim().to_owned();
        if option.is_empty() || exclude.contains(&option) || out.contains(&option) {
            continue;
        }
        out.push(option);
    }
    out
}

/// A named group of entries, loaded from one chapter file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordChapter {
    name: String,
    entries: Vec<WordEntry>,
}

impl WordChapter {
    #[must_use]
    pub fn new(name: impl Into<String>, entries: Vec<WordEntry>) -> Self {
        Self {
            name: name.into(),
            entries,
        }
    }

    /// Convert a chapter record, keeping every valid entry.
    ///
    /// Invalid entries are returned alongside the chapter instead of failing it.
    #[must_use]
    pub fn from_record(record: ChapterRecord) -> (Self, Vec<WordError>) {
        let mut entries = Vec::with_capacity(record.entries.len());
        let mut skipped = Vec::new();
        for word in record.entries {
            match WordEntry::from_record(word, &record.chapter) {
                Ok(entry) => entries.push(entry),
                Err(err) => skipped.push(err),
            }
        }
        (Self::new(record.chapter, entries), skipped)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn entries(&self) -> &[WordEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_owned()).collect()
    }

    #[test]
    fn entry_dedups_and_strips_correct_from_wrong() {
        let entry = WordEntry::new(
            "  kakebu ",
            strings(&["kakeboks", "kakeboks"]),
            strings(&["en fisk", "kakeboks", " ", "en fisk", "en buss"]),
            Some(Vec::new()),
            "Dialektord om ting og tang",
        )
        .unwrap();

        assert_eq!(entry.term(), "kakebu");
        assert_eq!(entry.correct_options(), strings(&["kakeboks"]).as_slice());
        assert_eq!(entry.wrong_options(), strings(&["en fisk", "en buss"]).as_slice());
        assert!(entry.explanation().is_none());
        assert!(entry.is_correct("kakeboks"));
        assert!(!entry.is_correct("en fisk"));
    }

    #[test]
    fn entry_requires_term_and_correct_option() {
        let err = WordEntry::new(" ", strings(&["a"]), Vec::new(), None, "c").unwrap_err();
        assert_eq!(err, WordError::EmptyTerm);

        let err = WordEntry::new("pjokk", strings(&[""]), strings(&["b"]), None, "c").unwrap_err();
        assert!(matches!(err, WordError::NoCorrectOptions { term } if term == "pjokk"));
    }

    #[test]
    fn chapter_record_parses_null_and_missing_explanations() {
        let json = r#"{
            "chapter": "Dialektord om personer",
            "entries": [
                {"term": "pjokk", "correct_options": ["liten gutt"], "wrong_options": ["gammel mann"], "long_explanation": null},
                {"term": "kjeltring", "correct_options": ["skurk"], "wrong_options": []},
                {"term": "", "correct_options": ["ugyldig"], "wrong_options": []}
            ]
        }"#;
        let record: ChapterRecord = serde_json::from_str(json).unwrap();
        let (chapter, skipped) = WordChapter::from_record(record);

        assert_eq!(chapter.name(), "Dialektord om personer");
        assert_eq!(chapter.len(), 2);
        assert_eq!(skipped, vec![WordError::EmptyTerm]);
        assert!(chapter.entries().iter().all(|e| e.category() == "Dialektord om personer"));
    }
}
