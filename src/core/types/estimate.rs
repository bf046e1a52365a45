//! Position estimates with circular uncertainty.

use serde::{Deserialize, Serialize};

use super::point::Point2D;

/// A 2D position with an uncertainty radius.
///
/// The true position is believed to lie within `radius` meters of
/// (`x`, `y`).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Estimate {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

impl Estimate {
    #[inline]
    pub fn new(x: f64, y: f64, radius: f64) -> Self {
        Self { x, y, radius }
    }

    #[inline]
    pub fn position(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }
}
