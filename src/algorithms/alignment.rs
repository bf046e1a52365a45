//! Rigid point-set alignment (orthogonal Procrustes).
//!
//! Finds the similarity transform (proper rotation, uniform scale,
//! translation) that best maps a source point set onto a target set
//! with known one-to-one correspondence, in the least-squares sense.
//! Reflections are never returned: when the best orthogonal map would
//! flip the plane, the nearest proper rotation is used instead.

use crate::core::math::{centroid, spread, svd2, Mat2};
use crate::core::types::Point2D;
use crate::error::{FusionError, Result};
use crate::utils::constants::DEGENERATE_VARIANCE;

/// Result of a rigid alignment.
#[derive(Debug, Clone)]
pub struct ProcrustesAlignment {
    /// Source points mapped through the fitted transform.
    pub aligned: Vec<Point2D>,
    /// Fitted proper rotation (determinant +1).
    pub rotation: Mat2,
    /// Fitted uniform scale. Falls back to 1.0 when the source set has
    /// no spread to estimate scale from.
    pub scale: f64,
    pub source_centroid: Point2D,
    pub target_centroid: Point2D,
}

impl ProcrustesAlignment {
    /// Map an arbitrary point through the fitted transform.
    pub fn transform(&self, p: &Point2D) -> Point2D {
        let c = Point2D::new(p.x - self.source_centroid.x, p.y - self.source_centroid.y);
        let r = self.rotation.apply(&c);
        Point2D::new(
            self.scale * r.x + self.target_centroid.x,
            self.scale * r.y + self.target_centroid.y,
        )
    }
}

/// Align `source` onto `target`.
///
/// The sets must be non-empty and the same length; point `i` of the
/// source corresponds to point `i` of the target.
pub fn align(source: &[Point2D], target: &[Point2D]) -> Result<ProcrustesAlignment> {
    if source.is_empty() || source.len() != target.len() {
        return Err(FusionError::InvalidInput {
            source_len: source.len(),
            target_len: target.len(),
        });
    }

    let source_centroid = centroid(source);
    let target_centroid = centroid(target);

    // Cross-covariance of the centered sets.
    let mut h = Mat2::ZERO;
    for (s, t) in source.iter().zip(target) {
        let cs = Point2D::new(s.x - source_centroid.x, s.y - source_centroid.y);
        let ct = Point2D::new(t.x - target_centroid.x, t.y - target_centroid.y);
        h.add_outer(&cs, &ct);
    }

    let svd = svd2(&h);
    let mut v = svd.v;
    let mut rotation = v.mul(&svd.u.transpose());
    let mut sigma_sum = svd.sigma[0] + svd.sigma[1];
    if rotation.det() < 0.0 {
        // The unconstrained optimum is a reflection; flipping the
        // smallest singular direction gives the best proper rotation.
        v.m01 = -v.m01;
        v.m11 = -v.m11;
        rotation = v.mul(&svd.u.transpose());
        sigma_sum = svd.sigma[0] - svd.sigma[1];
    }

    let variance = spread(source, &source_centroid);
    let scale = if variance > DEGENERATE_VARIANCE {
        sigma_sum / variance
    } else {
        1.0
    };

    let fit = ProcrustesAlignment {
        aligned: Vec::new(),
        rotation,
        scale,
        source_centroid,
        target_centroid,
    };
    let aligned = source.iter().map(|p| fit.transform(p)).collect();
    Ok(ProcrustesAlignment { aligned, ..fit })
}
