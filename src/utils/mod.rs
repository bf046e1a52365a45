//! Shared utilities.

pub mod constants;
pub mod signal;
