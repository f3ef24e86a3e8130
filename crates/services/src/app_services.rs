use std::path::Path;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use storage::{BundledRepository, JsonDirRepository, WordBank, WordRepository};

use crate::Clock;
use crate::audio::{AudioController, SilentAudio};
use crate::config::{FlashcardConfig, QuizConfig};
use crate::error::AppServicesError;
use crate::flashcards::FlashcardSession;
use crate::quiz::{QuizController, QuizHandle, QuizSnapshot};

/// Assembles app-facing services around one loaded word bank.
#[derive(Clone)]
pub struct AppServices {
    clock: Clock,
    word_bank: Arc<WordBank>,
    audio: Arc<dyn AudioController>,
    quiz: QuizConfig,
    flashcards: FlashcardConfig,
}

impl AppServices {
    /// Build services from the word data compiled into the binary.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the bundled chapters cannot be decoded.
    pub async fn bundled(clock: Clock) -> Result<Self, AppServicesError> {
        Self::from_repository(&BundledRepository::new(), clock).await
    }

    /// Build services from chapter files in `dir`.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if no chapter in `dir` can be loaded.
    pub async fn from_dir(dir: impl AsRef<Path>, clock: Clock) -> Result<Self, AppServicesError> {
        Self::from_repository(&JsonDirRepository::new(dir.as_ref()), clock).await
    }

    /// # Errors
    ///
    /// Returns `AppServicesError` if the repository fails to load.
    pub async fn from_repository(
        repo: &dyn WordRepository,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        let word_bank = Arc::new(WordBank::load(repo).await?);
        Ok(Self::new(word_bank, clock))
    }

    #[must_use]
    pub fn new(word_bank: Arc<WordBank>, clock: Clock) -> Self {
        Self {
            clock,
            word_bank,
            audio: Arc::new(SilentAudio::new()),
            quiz: QuizConfig::default(),
            flashcards: FlashcardConfig::default(),
        }
    }

    #[must_use]
    pub fn with_audio(mut self, audio: Arc<dyn AudioController>) -> Self {
        self.audio = audio;
        self
    }

    #[must_use]
    pub fn with_quiz_config(mut self, quiz: QuizConfig) -> Self {
        self.quiz = quiz;
        self
    }

    #[must_use]
    pub fn with_flashcard_config(mut self, flashcards: FlashcardConfig) -> Self {
        self.flashcards = flashcards;
        self
    }

    #[must_use]
    pub fn word_bank(&self) -> Arc<WordBank> {
        Arc::clone(&self.word_bank)
    }

    #[must_use]
    pub fn audio(&self) -> Arc<dyn AudioController> {
        Arc::clone(&self.audio)
    }

    #[must_use]
    pub fn quiz_config(&self) -> &QuizConfig {
        &self.quiz
    }

    /// Spawn a quiz controller on the current runtime.
    #[must_use]
    pub fn start_quiz(&self) -> (QuizHandle, watch::Receiver<QuizSnapshot>, JoinHandle<()>) {
        QuizController::spawn(self.word_bank(), self.quiz.clone(), self.clock)
    }

    #[must_use]
    pub fn start_flashcards(&self) -> FlashcardSession {
        FlashcardSession::new(self.word_bank(), &self.flashcards)
    }
}
