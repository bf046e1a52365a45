//! Sensor-facing layer: calibration, synchronization, and noise models.

pub mod calibration;
pub mod sync;
pub mod uncertainty;

pub use calibration::ImuCalibration;
pub use sync::SampleSynchronizer;
pub use uncertainty::UncertaintyModel;
