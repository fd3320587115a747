//! Generation backend clients.

pub mod gemini;
