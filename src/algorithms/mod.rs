//! Fusion algorithms: rigid alignment, disk fusion, spatial history.

pub mod alignment;
pub mod fusion;
pub mod history;

pub use alignment::{align, ProcrustesAlignment};
pub use fusion::{common_point, fuse};
pub use history::PointHistory;
