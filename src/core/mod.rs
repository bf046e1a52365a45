//! Core types and math primitives.

pub mod math;
pub mod types;
