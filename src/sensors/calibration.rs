//! Per-IMU accelerometer calibration.
//!
//! Calibration is estimated from a window of stationary samples: the
//! mean reading becomes the additive offset, and the scale is left at
//! unity until a motion-based scale estimator exists.

use serde::{Deserialize, Serialize};

/// Affine calibration for one IMU: `corrected = (raw - offset) * scale`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImuCalibration {
    pub offset: [f64; 2],
    pub scale: [f64; 2],
}

impl Default for ImuCalibration {
    fn default() -> Self {
        Self {
            offset: [0.0, 0.0],
            scale: [1.0, 1.0],
        }
    }
}

impl ImuCalibration {
    /// Estimate calibration from stationary raw readings.
    ///
    /// Returns the identity calibration when the window is empty.
    pub fn from_samples(raw: &[[f64; 2]]) -> Self {
        if raw.is_empty() {
            return Self::default();
        }
        let n = raw.len() as f64;
        let mut sum = [0.0, 0.0];
        for r in raw {
            sum[0] += r[0];
            sum[1] += r[1];
        }
        Self {
            offset: [sum[0] / n, sum[1] / n],
            scale: [1.0, 1.0],
        }
    }

    /// Apply the calibration to a raw reading.
    #[inline]
    pub fn apply(&self, raw: [f64; 2]) -> [f64; 2] {
        [
            (raw[0] - self.offset[0]) * self.scale[0],
            (raw[1] - self.offset[1]) * self.scale[1],
        ]
    }
}
