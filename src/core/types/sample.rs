//! Raw IMU measurements and time-aligned frames.

use serde::{Deserialize, Serialize};

/// One measurement from one IMU.
///
/// Acceleration is in m/s^2, angular rate in rad/s, both restricted to
/// the two planar axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImuSample {
    /// Index of the producing IMU within the array.
    pub imu_id: usize,
    /// Acquisition time in microseconds since the array started.
    pub timestamp_us: u64,
    /// Planar acceleration [ax, ay].
    pub accel: [f64; 2],
    /// Planar angular rate [gx, gy].
    pub gyro: [f64; 2],
}

/// A complete set of samples, one per IMU, sharing a single timestamp.
///
/// Frames are only ever produced by the synchronizer, which guarantees
/// exactly one sample per configured IMU, ordered by `imu_id`.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub timestamp_us: u64,
    pub samples: Vec<ImuSample>,
}

impl Frame {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
