mod ids;
mod question;
mod summary;
mod word;

pub use ids::SessionId;
pub use question::{MAX_OPTIONS, MAX_WRONG_OPTIONS, QuizQuestion};
pub use summary::{QuizSummary, SummaryError};
pub use word::{ChapterRecord, WordChapter, WordEntry, WordError, WordRecord};
