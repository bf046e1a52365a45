//! Spatial index over previously integrated sensor positions.
//!
//! Every position the pipeline integrates gets appended here. Fused
//! estimates are then refined against the neighborhood of historical
//! points, which damps single-frame jitter.
//!
//! A stationary array appends the same position thousands of times,
//! and the k-d tree cannot hold unbounded copies of one coordinate
//! (its buckets stop splitting). Coincident points therefore share a
//! single tree entry with a multiplicity count; queries expand the
//! count back out so results are identical to a plain linear scan.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use kiddo::float::kdtree::KdTree;
use kiddo::SquaredEuclidean;

/// Bucket capacity for the k-d tree. Distinct points that share a
/// coordinate on one axis (e.g. motion along a straight line) cannot be
/// separated by a split on that axis, and kiddo panics once more than a
/// bucket's worth accumulate; the default of 32 is too small for that.
const BUCKET_SIZE: usize = 4096;

use crate::core::types::Point2D;
use crate::utils::constants::GEOM_EPSILON;

/// Append-only point cloud with radius queries backed by a k-d tree.
pub struct PointHistory {
    /// Every insertion, in order.
    points: Vec<Point2D>,
    /// One entry per distinct position, with its multiplicity.
    distinct: Vec<(Point2D, usize)>,
    /// Coordinate bits -> index into `distinct`.
    index: HashMap<(u64, u64), usize>,
    tree: KdTree<f64, u64, 2, BUCKET_SIZE, u32>,
}

fn bit_key(p: &Point2D) -> (u64, u64) {
    (p.x.to_bits(), p.y.to_bits())
}

impl Default for PointHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl PointHistory {
    pub fn new() -> Self {
        Self {
            points: Vec::new(),
            distinct: Vec::new(),
            index: HashMap::new(),
            tree: KdTree::new(),
        }
    }

    /// Record a point. Duplicates are kept; each insertion is its own
    /// entry in query results.
    pub fn add(&mut self, p: Point2D) {
        match self.index.entry(bit_key(&p)) {
            Entry::Occupied(slot) => {
                self.distinct[*slot.get()].1 += 1;
            }
            Entry::Vacant(slot) => {
                let id = self.distinct.len();
                self.tree.add(&[p.x, p.y], id as u64);
                self.distinct.push((p, 1));
                slot.insert(id);
            }
        }
        self.points.push(p);
    }

    /// All points within `radius` of (`x`, `y`), inclusive of the
    /// boundary. Order is unspecified. A non-positive radius can only
    /// match exact hits.
    ///
    /// The tree is queried with a padded radius because its distance
    /// comparison is exclusive; exact membership is re-checked here.
    pub fn radius_search(&self, x: f64, y: f64, radius: f64) -> Vec<Point2D> {
        if radius < 0.0 || self.points.is_empty() {
            return Vec::new();
        }
        let center = Point2D::new(x, y);
        let limit = radius * radius;
        let padded = (radius + GEOM_EPSILON) * (radius + GEOM_EPSILON);

        let mut found = Vec::new();
        for neighbor in self.tree.within_unsorted::<SquaredEuclidean>(&[x, y], padded) {
            let (p, count) = self.distinct[neighbor.item as usize];
            if p.distance_squared(&center) <= limit {
                found.extend(std::iter::repeat(p).take(count));
            }
        }
        found
    }

    /// Snapshot copy of every recorded point, in insertion order.
    pub fn all_points(&self) -> Vec<Point2D> {
        self.points.clone()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Drop all recorded points.
    pub fn clear(&mut self) {
        self.points.clear();
        self.distinct.clear();
        self.index.clear();
        self.tree = KdTree::new();
    }
}
