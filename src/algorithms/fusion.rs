//! Geometric fusion of position estimates with circular uncertainty.
//!
//! Each sensor contributes a disk (center + uncertainty radius). If
//! every disk shares a point, that point is the fused position. When
//! they do not, all radii are inflated by a common factor `alpha` and
//! a binary search finds the smallest inflation that makes the disks
//! intersect.

use crate::core::math::centroid;
use crate::core::types::{Estimate, Point2D};
use crate::utils::constants::{
    ALPHA_MAX, ALPHA_MIN, ALPHA_TOLERANCE, GEOM_EPSILON, POINT_MATCH_EPSILON,
};

/// Whether `p` lies inside or on every circle, within [`GEOM_EPSILON`].
fn inside_all(p: &Point2D, centers: &[Point2D], radii: &[f64]) -> bool {
    centers
        .iter()
        .zip(radii)
        .all(|(c, r)| p.distance(c) <= r + GEOM_EPSILON)
}

/// Append the boundary intersection points of two circles to `out`.
///
/// Pushes nothing when the circles are disjoint, one inside the other
/// without touching, or effectively concentric; one point at tangency;
/// two points otherwise.
fn circle_intersections(
    c1: &Point2D,
    r1: f64,
    c2: &Point2D,
    r2: f64,
    out: &mut Vec<Point2D>,
) {
    let d = c1.distance(c2);
    if d < GEOM_EPSILON {
        // Concentric circles either miss entirely or overlap on the
        // whole boundary; neither yields useful discrete candidates.
        return;
    }
    if d > r1 + r2 + GEOM_EPSILON || d < (r1 - r2).abs() - GEOM_EPSILON {
        return;
    }

    let a = (r1 * r1 - r2 * r2 + d * d) / (2.0 * d);
    let h = (r1 * r1 - a * a).max(0.0).sqrt();

    let mx = c1.x + a * (c2.x - c1.x) / d;
    let my = c1.y + a * (c2.y - c1.y) / d;

    let tangent =
        d > r1 + r2 - GEOM_EPSILON || d < (r1 - r2).abs() + GEOM_EPSILON || h < GEOM_EPSILON;
    if tangent {
        out.push(Point2D::new(mx, my));
        return;
    }

    let ox = h * (c2.y - c1.y) / d;
    let oy = h * (c2.x - c1.x) / d;
    out.push(Point2D::new(mx + ox, my - oy));
    out.push(Point2D::new(mx - ox, my + oy));
}

/// Find a point common to all circles, if one exists.
///
/// Candidates are gathered from pairwise boundary intersections and
/// filtered to those inside every circle. A unique survivor wins; for
/// several survivors their centroid is preferred when it is itself
/// inside every circle. With no boundary candidates the containment
/// cases apply: the center of a circle contained in all others, or the
/// centroid of all centers.
pub fn common_point(centers: &[Point2D], radii: &[f64]) -> Option<Point2D> {
    debug_assert_eq!(centers.len(), radii.len());
    match centers.len() {
        0 => return None,
        1 => return Some(centers[0]),
        _ => {}
    }

    let mut candidates = Vec::new();
    for i in 0..centers.len() {
        for j in (i + 1)..centers.len() {
            circle_intersections(&centers[i], radii[i], &centers[j], radii[j], &mut candidates);
        }
    }
    candidates.retain(|p| inside_all(p, centers, radii));

    // Deduplicate candidates that coincide within tolerance.
    let mut unique: Vec<Point2D> = Vec::new();
    for p in &candidates {
        if !unique.iter().any(|q| q.distance(p) < POINT_MATCH_EPSILON) {
            unique.push(*p);
        }
    }

    match unique.len() {
        1 => return Some(unique[0]),
        n if n > 1 => {
            let c = centroid(&unique);
            if inside_all(&c, centers, radii) {
                return Some(c);
            }
            return Some(unique[0]);
        }
        _ => {}
    }

    // No boundary crossings survived. One circle may sit entirely
    // inside all the others; its center is then common to everything.
    let contained = centers
        .iter()
        .enumerate()
        .filter(|(_, c)| inside_all(c, centers, radii))
        .min_by(|(i, _), (j, _)| radii[*i].total_cmp(&radii[*j]));
    if let Some((_, c)) = contained {
        return Some(*c);
    }

    let c = centroid(centers);
    if inside_all(&c, centers, radii) {
        return Some(c);
    }
    None
}

/// Fuse uncertainty disks into a single estimate.
///
/// Searches for the smallest inflation factor in
/// [`ALPHA_MIN`, `ALPHA_MAX`] under which all disks share a point, and
/// returns that factor together with the shared point. The returned
/// radius is the inflation factor itself, an honesty measure of how
/// much the inputs disagreed.
///
/// When even the maximum inflation produces no common point, the
/// centroid of the centers is returned as a best effort.
pub fn fuse(estimates: &[Estimate]) -> (f64, Estimate) {
    let centers: Vec<Point2D> = estimates.iter().map(Estimate::position).collect();
    let radii: Vec<f64> = estimates.iter().map(|e| e.radius).collect();

    let mut lo = ALPHA_MIN;
    let mut hi = ALPHA_MAX;
    let mut best: Option<Point2D> = None;

    while hi - lo > ALPHA_TOLERANCE {
        let mid = 0.5 * (lo + hi);
        let scaled: Vec<f64> = radii.iter().map(|r| r * mid).collect();
        match common_point(&centers, &scaled) {
            Some(p) => {
                best = Some(p);
                hi = mid;
            }
            None => lo = mid,
        }
    }

    if best.is_none() {
        // The search never found a feasible midpoint; try the bound.
        let scaled: Vec<f64> = radii.iter().map(|r| r * ALPHA_MAX).collect();
        best = common_point(&centers, &scaled);
    }

    match best {
        Some(p) => (hi, Estimate::new(p.x, p.y, hi)),
        None => {
            log::warn!(
                "no common point for {} estimates at max inflation, falling back to centroid",
                estimates.len()
            );
            let c = centroid(&centers);
            (ALPHA_MAX, Estimate::new(c.x, c.y, ALPHA_MAX))
        }
    }
}
