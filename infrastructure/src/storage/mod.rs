//! Storage adapters: the in-memory store and its JSONL history journal

mod journal;
mod memory;

pub use journal::{HistoryJournal, JournalError};
pub use memory::MemoryStore;
