//! # Triveni Fusion
//!
//! Real-time 2D position estimation from an array of rigidly mounted
//! IMUs. Each sensor is dead-reckoned independently; the per-sensor
//! estimates are then reconciled geometrically and constrained by the
//! known rigid layout of the array.
//!
//! ## Architecture
//!
//! ```text
//! +----------------------------------------------------------+
//! |                     threads (fusion loop)                |
//! +----------------------------------------------------------+
//! |          engine (per-frame pipeline)                     |
//! +----------------------------------------------------------+
//! |  algorithms (alignment, fusion, history)  |  io (acq.)   |
//! +----------------------------------------------------------+
//! |  sensors (calibration, sync, uncertainty)                |
//! +----------------------------------------------------------+
//! |  core (types, math)                                      |
//! +----------------------------------------------------------+
//! ```
//!
//! Data flows bottom-up: producer threads push [`ImuSample`]s into the
//! [`SampleSynchronizer`]; the fusion thread drains complete [`Frame`]s
//! through the [`FusionPipeline`], which emits [`Estimate`]s.

pub mod algorithms;
pub mod core;
pub mod engine;
pub mod error;
pub mod io;
pub mod sensors;
pub mod threads;
pub mod utils;

pub use crate::algorithms::{align, common_point, fuse, PointHistory, ProcrustesAlignment};
pub use crate::core::math::{centroid, svd2, Mat2, Svd2};
pub use crate::core::types::{
    Estimate, Frame, ImuSample, Point2D, ReferenceGeometry, Timestamped,
};
pub use crate::engine::{FusionPipeline, PipelineConfig, SensorState};
pub use crate::error::{FusionError, Result};
pub use crate::io::{AcquisitionConfig, NoiseGenerator, SimulatedImuArray};
pub use crate::sensors::{ImuCalibration, SampleSynchronizer, UncertaintyModel};
pub use crate::threads::FusionThread;
