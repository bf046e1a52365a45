//! Error types for the fusion pipeline.

use thiserror::Error;

/// Errors surfaced by alignment, geometry construction, and the
/// pipeline front end.
#[derive(Debug, Error)]
pub enum FusionError {
    /// Point sets handed to the aligner were empty or of unequal size.
    #[error("cannot align {source_len} source points to {target_len} target points")]
    InvalidInput { source_len: usize, target_len: usize },

    /// A sample named an IMU id outside the configured array.
    #[error("IMU id {imu_id} out of range for array of {imu_count}")]
    OutOfRangeSensorId { imu_id: usize, imu_count: usize },

    /// Reference geometry point count does not match the IMU count.
    #[error("reference geometry has {points} points but {imu_count} IMUs are configured")]
    GeometryMismatch { points: usize, imu_count: usize },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, FusionError>;
