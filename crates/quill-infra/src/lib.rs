//! Infrastructure implementations for Quill.
//!
//! SQLite-backed repositories (sqlx, WAL mode, split read/write pools), the
//! Gemini generation backend client, and the config loader.

pub mod config;
pub mod llm;
pub mod sqlite;
