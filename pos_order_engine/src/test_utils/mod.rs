//! Helpers for tests that need a real, throwaway SQLite database.
pub mod prepare_env;
