//! Small linear-algebra helpers for planar geometry.
//!
//! Everything here is 2D only, so the singular value decomposition is
//! computed in closed form rather than pulling in a full matrix crate.

use crate::core::types::Point2D;

/// Mean of a point set. Returns the origin for an empty slice.
pub fn centroid(points: &[Point2D]) -> Point2D {
    if points.is_empty() {
        return Point2D::default();
    }
    let n = points.len() as f64;
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    Point2D::new(sx / n, sy / n)
}

/// Sum of squared distances of a point set from a given center.
pub fn spread(points: &[Point2D], center: &Point2D) -> f64 {
    points.iter().map(|p| p.distance_squared(center)).sum()
}

/// A 2x2 matrix in row-major order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat2 {
    pub m00: f64,
    pub m01: f64,
    pub m10: f64,
    pub m11: f64,
}

impl Mat2 {
    pub const ZERO: Mat2 = Mat2 {
        m00: 0.0,
        m01: 0.0,
        m10: 0.0,
        m11: 0.0,
    };

    /// Counterclockwise rotation by `angle` radians.
    pub fn rotation(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Mat2 {
            m00: c,
            m01: -s,
            m10: s,
            m11: c,
        }
    }

    pub fn transpose(&self) -> Mat2 {
        Mat2 {
            m00: self.m00,
            m01: self.m10,
            m10: self.m01,
            m11: self.m11,
        }
    }

    pub fn det(&self) -> f64 {
        self.m00 * self.m11 - self.m01 * self.m10
    }

    pub fn mul(&self, other: &Mat2) -> Mat2 {
        Mat2 {
            m00: self.m00 * other.m00 + self.m01 * other.m10,
            m01: self.m00 * other.m01 + self.m01 * other.m11,
            m10: self.m10 * other.m00 + self.m11 * other.m10,
            m11: self.m10 * other.m01 + self.m11 * other.m11,
        }
    }

    /// Apply the matrix to a point treated as a column vector.
    pub fn apply(&self, p: &Point2D) -> Point2D {
        Point2D::new(
            self.m00 * p.x + self.m01 * p.y,
            self.m10 * p.x + self.m11 * p.y,
        )
    }

    /// Accumulate the outer product `a * b^T` into this matrix.
    pub fn add_outer(&mut self, a: &Point2D, b: &Point2D) {
        self.m00 += a.x * b.x;
        self.m01 += a.x * b.y;
        self.m10 += a.y * b.x;
        self.m11 += a.y * b.y;
    }
}

/// Result of [`svd2`]: `m = u * diag(sigma) * v^T` with orthonormal
/// `u`, `v` and `sigma[0] >= sigma[1] >= 0`.
#[derive(Debug, Clone, Copy)]
pub struct Svd2 {
    pub u: Mat2,
    pub sigma: [f64; 2],
    pub v: Mat2,
}

/// Closed-form singular value decomposition of a 2x2 matrix.
///
/// Uses the rotation-angle formulation: the matrix is expressed as a
/// left rotation, a diagonal, and a right rotation, then the sign of
/// the smaller diagonal entry is folded into `u` so both singular
/// values come out non-negative.
pub fn svd2(m: &Mat2) -> Svd2 {
    let e = (m.m00 + m.m11) / 2.0;
    let f = (m.m00 - m.m11) / 2.0;
    let g = (m.m10 + m.m01) / 2.0;
    let h = (m.m10 - m.m01) / 2.0;

    let q = (e * e + h * h).sqrt();
    let r = (f * f + g * g).sqrt();

    let sx = q + r;
    let sy = q - r;

    let a1 = g.atan2(f);
    let a2 = h.atan2(e);
    let theta = (a2 - a1) / 2.0;
    let phi = (a2 + a1) / 2.0;

    let mut u = Mat2::rotation(phi);
    let v = Mat2::rotation(-theta);

    let sigma = if sy < 0.0 {
        // Fold the sign into u's second column.
        u.m01 = -u.m01;
        u.m11 = -u.m11;
        [sx, -sy]
    } else {
        [sx, sy]
    };

    Svd2 { u, sigma, v }
}
