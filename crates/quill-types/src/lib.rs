//! Shared domain types for Quill.
//!
//! This crate has no business logic: it defines the data shapes and error
//! enums used across the core, infrastructure, and API layers.

pub mod chat;
pub mod config;
pub mod error;
pub mod usage;
