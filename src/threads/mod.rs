//! Thread management.

pub mod fusion_thread;

pub use fusion_thread::FusionThread;
