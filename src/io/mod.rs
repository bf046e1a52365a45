//! Data acquisition.

pub mod acquisition;

pub use acquisition::{AcquisitionConfig, NoiseGenerator, SimulatedImuArray};
