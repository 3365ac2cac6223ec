/// State management module
///
/// This module handles all application state, including:
/// - The storage interface and its errors (store.rs)
/// - The SQLite catalog behind it (library.rs)
/// - Shared data structures (data.rs)
/// - Persisted session preferences (prefs.rs)

pub mod data;
pub mod library;
pub mod prefs;
pub mod store;
