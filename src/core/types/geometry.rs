//! Reference geometry of the physical IMU array.

use crate::core::types::point::Point2D;
use crate::error::{FusionError, Result};

/// The known rigid layout of the IMU array, one point per sensor.
///
/// Sensor `i` in every frame corresponds to point `i` of the geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceGeometry {
    points: Vec<Point2D>,
}

impl ReferenceGeometry {
    /// Build a geometry from an explicit point list.
    pub fn from_points(points: Vec<Point2D>) -> Result<Self> {
        if points.is_empty() {
            return Err(FusionError::InvalidInput {
                source_len: 0,
                target_len: 0,
            });
        }
        Ok(Self { points })
    }

    /// Axis-aligned square of the given side length with one corner at
    /// the origin. The default layout for a four-IMU array.
    pub fn square(side: f64) -> Self {
        Self {
            points: vec![
                Point2D::new(0.0, 0.0),
                Point2D::new(side, 0.0),
                Point2D::new(side, side),
                Point2D::new(0.0, side),
            ],
        }
    }

    /// Unit square, the canonical four-sensor layout.
    pub fn unit_square() -> Self {
        Self::square(1.0)
    }

    pub fn points(&self) -> &[Point2D] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Check that the geometry matches the configured IMU count.
    pub fn validate_count(&self, imu_count: usize) -> Result<()> {
        if self.points.len() != imu_count {
            return Err(FusionError::GeometryMismatch {
                points: self.points.len(),
                imu_count,
            });
        }
        Ok(())
    }
}
