//! Generation backend abstraction.

pub mod generator;
