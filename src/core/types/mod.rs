//! Core data types shared across all layers.

pub mod estimate;
pub mod geometry;
pub mod point;
pub mod sample;
pub mod timestamped;

pub use estimate::Estimate;
pub use geometry::ReferenceGeometry;
pub use point::Point2D;
pub use sample::{Frame, ImuSample};
pub use timestamped::Timestamped;
