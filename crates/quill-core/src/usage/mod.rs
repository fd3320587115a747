//! Daily usage aggregation for Quill.
//!
//! The `UsageRepository` trait defines the atomic upsert the infrastructure
//! layer implements; `UsageRecorder` wraps it with best-effort semantics so
//! telemetry faults never fail a chat exchange.

pub mod recorder;
pub mod repository;
