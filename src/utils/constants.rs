//! Central tolerances and tuning constants.
//!
//! Every geometric comparison in the crate goes through one of these
//! named values so that loosening or tightening a tolerance is a
//! one-line change.

use std::time::Duration;

/// Tolerance for circle-boundary membership and intersection tests.
///
/// A point is considered on or inside a circle when its distance from
/// the center exceeds the radius by no more than this amount.
pub const GEOM_EPSILON: f64 = 1e-9;

/// Distance below which two candidate intersection points are treated
/// as the same point when deduplicating.
pub const POINT_MATCH_EPSILON: f64 = 1e-9;

/// Variance threshold below which a point set is considered collapsed
/// (zero spread) for alignment purposes.
pub const DEGENERATE_VARIANCE: f64 = 1e-12;

/// Minimum alignment scale for a rigid fit to be trusted enough to
/// project sensor positions back onto the reference geometry.
pub const RIGID_MIN_SCALE: f64 = 1e-6;

/// Lower bound of the uncertainty inflation search.
pub const ALPHA_MIN: f64 = 1.0;

/// Upper bound of the uncertainty inflation search.
pub const ALPHA_MAX: f64 = 10.0;

/// Convergence tolerance of the inflation binary search.
pub const ALPHA_TOLERANCE: f64 = 1e-4;

/// Smallest integration step in seconds. Timestamps that repeat or run
/// backwards are clamped to this delta instead of producing a zero or
/// negative step.
pub const MIN_TIME_DELTA: f64 = 1e-9;

/// How long the fusion consumer sleeps when no complete frame is ready.
pub const IDLE_POLL: Duration = Duration::from_millis(1);
