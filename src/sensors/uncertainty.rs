//! Position uncertainty growth under double integration.

/// Random-walk uncertainty model.
///
/// Position error from integrating noisy accelerometer readings grows
/// with the square root of time, scaled by the sensor noise level.
#[derive(Debug, Clone, Copy)]
pub struct UncertaintyModel {
    noise_level: f64,
}

impl UncertaintyModel {
    pub fn new(noise_level: f64) -> Self {
        Self { noise_level }
    }

    /// Uncertainty radius in meters after integrating for `dt` seconds.
    #[inline]
    pub fn radius(&self, dt: f64) -> f64 {
        self.noise_level * dt.max(0.0).sqrt()
    }
}
