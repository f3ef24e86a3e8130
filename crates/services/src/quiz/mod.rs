mod controller;
mod session;
mod snapshot;
mod timers;

// Public API of the quiz subsystem.
pub use crate::error::ControllerError;
pub use controller::{QuizCommand, QuizController, QuizHandle};
pub use session::{QuizSession, Transition};
pub use snapshot::{OptionMark, OptionView, QuestionView, QuizPhase, QuizSnapshot};
pub use timers::{Stamped, TimerHandle, TimerSet};
