#![forbid(unsafe_code)]

pub mod json;
pub mod repository;
pub mod word_bank;

pub use json::{BundledRepository, JsonDirRepository};
pub use repository::{InMemoryRepository, StorageError, WordRepository};
pub use word_bank::WordBank;
