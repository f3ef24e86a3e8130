#![forbid(unsafe_code)]

pub mod app_services;
pub mod audio;
pub mod config;
pub mod error;
pub mod flashcards;
pub mod quiz;

pub use bergen_core::Clock;

pub use app_services::AppServices;
pub use audio::{AudioController, RecordingAudio, SilentAudio, Soundboard};
pub use config::{BACKGROUND_TRACK, FlashcardConfig, QuizConfig, QuizTimings};
pub use error::{AppServicesError, ControllerError};
pub use flashcards::FlashcardSession;
pub use quiz::{
    OptionMark, QuizCommand, QuizController, QuizHandle, QuizPhase, QuizSession, QuizSnapshot,
    Transition,
};
