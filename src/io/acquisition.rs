//! Simulated IMU array producing timestamped samples.
//!
//! One producer thread per IMU pushes samples into the shared
//! synchronizer at a fixed rate. Timestamps are derived from the tick
//! counter rather than the wall clock, so all producers emit the same
//! timestamp series and frames can actually complete.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use serde::Deserialize;

use crate::core::types::ImuSample;
use crate::sensors::SampleSynchronizer;

/// Gaussian measurement noise source.
#[derive(Debug)]
pub struct NoiseGenerator {
    rng: SmallRng,
}

impl NoiseGenerator {
    /// Seed 0 means non-deterministic (entropy-seeded).
    pub fn new(seed: u64) -> Self {
        let rng = if seed == 0 {
            SmallRng::from_entropy()
        } else {
            SmallRng::seed_from_u64(seed)
        };
        Self { rng }
    }

    /// Zero-mean Gaussian sample with the given standard deviation.
    pub fn gaussian(&mut self, stddev: f64) -> f64 {
        let n: f64 = self.rng.sample(StandardNormal);
        n * stddev
    }
}

/// Simulated acquisition parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AcquisitionConfig {
    /// Samples per second per IMU.
    pub sample_rate_hz: f64,
    /// Accelerometer noise standard deviation (m/s^2).
    pub accel_noise_stddev: f64,
    /// Gyroscope noise standard deviation (rad/s).
    pub gyro_noise_stddev: f64,
    /// RNG seed; 0 seeds from entropy.
    pub seed: u64,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 1000.0,
            accel_noise_stddev: 0.0,
            gyro_noise_stddev: 0.0,
            seed: 0,
        }
    }
}

/// Handles to the running producer threads.
#[derive(Debug)]
pub struct SimulatedImuArray {
    handles: Vec<JoinHandle<()>>,
}

impl SimulatedImuArray {
    /// Start one producer thread per IMU of the synchronizer's array.
    ///
    /// Producers run until the `running` flag clears.
    pub fn spawn(
        config: AcquisitionConfig,
        sync: Arc<SampleSynchronizer>,
        running: Arc<AtomicBool>,
    ) -> std::io::Result<Self> {
        let period = Duration::from_secs_f64(1.0 / config.sample_rate_hz.max(1.0));
        let period_us = period.as_micros().max(1) as u64;

        let mut handles = Vec::with_capacity(sync.imu_count());
        for imu_id in 0..sync.imu_count() {
            let sync = Arc::clone(&sync);
            let running = Arc::clone(&running);
            let config = config.clone();
            // Distinct per-IMU streams; seed 0 stays entropy-seeded.
            let seed = if config.seed == 0 {
                0
            } else {
                config.seed + imu_id as u64
            };
            let handle = thread::Builder::new()
                .name(format!("imu-{imu_id}"))
                .spawn(move || {
                    let mut noise = NoiseGenerator::new(seed);
                    let mut tick: u64 = 0;
                    while running.load(Ordering::Relaxed) {
                        let sample = ImuSample {
                            imu_id,
                            timestamp_us: tick * period_us,
                            accel: [
                                noise.gaussian(config.accel_noise_stddev),
                                noise.gaussian(config.accel_noise_stddev),
                            ],
                            gyro: [
                                noise.gaussian(config.gyro_noise_stddev),
                                noise.gaussian(config.gyro_noise_stddev),
                            ],
                        };
                        if let Err(e) = sync.add(sample) {
                            log::warn!("dropping sample: {e}");
                        }
                        tick += 1;
                        thread::sleep(period);
                    }
                    log::debug!("imu-{imu_id} producer stopped after {tick} samples");
                })?;
            handles.push(handle);
        }
        Ok(Self { handles })
    }

    /// Wait for all producer threads to exit.
    pub fn join(self) {
        for handle in self.handles {
            if handle.join().is_err() {
                log::error!("IMU producer thread panicked");
            }
        }
    }
}
