//! Client-side view model
//!
//! Folds server responses into one normalized state and mirrors the tracked
//! symbol list to durable storage.

pub mod actions;
pub mod requester;
pub mod state;
pub mod storage;
pub mod store;

pub use requester::ApiClient;
pub use state::{reduce, SearchStatus, SentimentEntry, ViewEvent, ViewState};
pub use storage::{JsonFileStorage, MemoryStorage, SymbolListStorage};
pub use store::ViewStateStore;
