//! Frame processing engine.

pub mod pipeline;

pub use pipeline::{FusionPipeline, PipelineConfig, SensorState};
