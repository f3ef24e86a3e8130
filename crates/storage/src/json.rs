//! JSON chapter sources: the copy bundled into the binary and an on-disk directory.

use async_trait::async_trait;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use bergen_core::model::{ChapterRecord, WordChapter};

use crate::repository::{StorageError, WordRepository};

/// Chapter file names (without `.json`), in load order.
pub const CHAPTER_FILES: [&str; 4] = [
    "bergenske-uttrykk",
    "bergenske-ord-betydning",
    "dialektord-ting-tang",
    "dialektord-personer",
];

const BUNDLED: [(&str, &str); 4] = [
    (
        "bergenske-uttrykk",
        include_str!("../data/bergenske-uttrykk.json"),
    ),
    (
        "bergenske-ord-betydning",
        include_str!("../data/bergenske-ord-betydning.json"),
    ),
    (
        "dialektord-ting-tang",
        include_str!("../data/dialektord-ting-tang.json"),
    ),
    (
        "dialektord-personer",
        include_str!("../data/dialektord-personer.json"),
    ),
];

/// Decode one chapter file. Invalid entries are skipped with a warning.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if `raw` is not a chapter document.
pub fn decode_chapter(file: &str, raw: &str) -> Result<WordChapter, StorageError> {
    let record: ChapterRecord = serde_json::from_str(raw)?;
    let (chapter, skipped) = WordChapter::from_record(record);
    for err in skipped {
        warn!(file, error = %err, "skipping invalid word entry");
    }
    debug!(file, chapter = chapter.name(), entries = chapter.len(), "decoded chapter");
    Ok(chapter)
}

fn finish(chapters: Vec<WordChapter>, source: &str) -> Result<Vec<WordChapter>, StorageError> {
    if chapters.is_empty() {
        warn!(source, "no word chapters could be loaded");
        return Err(StorageError::NotFound);
    }
    let words: usize = chapters.iter().map(WordChapter::len).sum();
    info!(source, words, chapters = chapters.len(), "loaded word chapters");
    Ok(chapters)
}

/// Chapters compiled into the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledRepository;

impl BundledRepository {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl WordRepository for BundledRepository {
    async fn load_chapters(&self) -> Result<Vec<WordChapter>, StorageError> {
        let mut chapters = Vec::with_capacity(BUNDLED.len());
        for (file, raw) in BUNDLED {
            match decode_chapter(file, raw) {
                Ok(chapter) => chapters.push(chapter),
                Err(err) => warn!(file, error = %err, "could not decode bundled chapter"),
            }
        }
        finish(chapters, "bundled")
    }
}

/// Chapters read from `<dir>/<file>.json`.
///
/// Missing or malformed files are skipped; loading only fails when nothing loads.
#[derive(Debug, Clone)]
pub struct JsonDirRepository {
    dir: PathBuf,
    files: Vec<String>,
}

impl JsonDirRepository {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            files: CHAPTER_FILES.iter().map(|f| (*f).to_owned()).collect(),
        }
    }

    /// Override the list of chapter files to read.
    #[must_use]
    pub fn with_files(mut self, files: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.files = files.into_iter().map(Into::into).collect();
        self
    }

    async fn load_file(&self, file: &str) -> Result<WordChapter, StorageError> {
        let path = self.dir.join(format!("{file}.json"));
        let raw = tokio::fs::read_to_string(&path).await?;
        decode_chapter(file, &raw)
    }
}

#[async_trait]
impl WordRepository for JsonDirRepository {
    async fn load_chapters(&self) -> Result<Vec<WordChapter>, StorageError> {
        let mut chapters = Vec::with_capacity(self.files.len());
        for file in &self.files {
            match self.load_file(file).await {
                Ok(chapter) => chapters.push(chapter),
                Err(err) => warn!(
                    dir = %self.dir.display(),
                    file = file.as_str(),
                    error = %err,
                    "skipping word chapter"
                ),
            }
        }
        let source = self.dir.display().to_string();
        finish(chapters, &source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const PERSONER: &str = r#"{
        "chapter": "Dialektord om personer",
        "entries": [
            {"term": "pjokk", "correct_options": ["liten gutt"], "wrong_options": ["gammel mann"]},
            {"term": "tom", "correct_options": [], "wrong_options": ["x"]}
        ]
    }"#;

    #[tokio::test]
    async fn bundled_chapters_all_decode() {
        let chapters = BundledRepository::new().load_chapters().await.unwrap();
        assert_eq!(chapters.len(), CHAPTER_FILES.len());
        assert!(chapters.iter().all(|c| !c.is_empty()));
        assert_eq!(chapters[0].name(), "Vanlige bergenske uttrykk");
    }

    #[tokio::test]
    async fn dir_skips_missing_and_malformed_files() {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        std::fs::write(temp_dir.path().join("dialektord-personer.json"), PERSONER).unwrap();
        std::fs::write(temp_dir.path().join("bergenske-uttrykk.json"), "{ not json").unwrap();

        let repo = JsonDirRepository::new(temp_dir.path());
        let chapters = repo.load_chapters().await.unwrap();

        assert_eq!(chapters.len(), 1);
        assert_eq!(chapters[0].name(), "Dialektord om personer");
        assert_eq!(chapters[0].len(), 1);
    }

    #[tokio::test]
    async fn dir_without_chapters_is_not_found() {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let err = JsonDirRepository::new(temp_dir.path())
            .load_chapters()
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound));
    }

    #[tokio::test]
    async fn custom_file_list_is_respected() {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        std::fs::write(temp_dir.path().join("egne-ord.json"), PERSONER).unwrap();

        let repo = JsonDirRepository::new(temp_dir.path()).with_files(["egne-ord"]);
        let chapters = repo.load_chapters().await.unwrap();
        assert_eq!(chapters.len(), 1);
    }

    #[test]
    fn decode_rejects_wrong_shape() {
        let err = decode_chapter("x", r#"{"entries": []}"#).unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }
}
