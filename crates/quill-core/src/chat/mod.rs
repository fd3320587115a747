//! Conversation management for Quill.
//!
//! This module defines the `ConversationRepository` trait the infrastructure
//! layer implements, the pure context/title helpers, and the `ChatService`
//! orchestrator that ties them together per incoming message.

pub mod context;
pub mod repository;
pub mod service;
pub mod title;
