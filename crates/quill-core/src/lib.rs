//! Business logic and repository trait definitions for Quill.
//!
//! This crate defines the "ports" (repository and generator traits) that the
//! infrastructure layer implements. It depends only on `quill-types` -- never
//! on `quill-infra` or any database/IO crate.

pub mod chat;
pub mod llm;
pub mod usage;
