//! The per-frame fusion pipeline.
//!
//! For every synchronized frame the pipeline:
//! 1. applies per-IMU calibration,
//! 2. dead-reckons each sensor position by double integration,
//! 3. records the new positions in the spatial history,
//! 4. fuses the per-sensor uncertainty disks into one estimate,
//! 5. projects sensor positions back onto the rigid array geometry,
//! 6. refines the fused point against nearby historical points.

use crate::algorithms::{align, fuse, PointHistory};
use crate::core::math::centroid;
use crate::core::types::{Estimate, Frame, Point2D, ReferenceGeometry, Timestamped};
use crate::error::{FusionError, Result};
use crate::sensors::{ImuCalibration, SampleSynchronizer, UncertaintyModel};
use crate::utils::constants::{MIN_TIME_DELTA, RIGID_MIN_SCALE};

/// Pipeline tuning parameters.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Accelerometer noise level driving uncertainty growth (m/s^2).
    pub noise_level: f64,
    /// Known rigid layout of the IMU array.
    pub reference: ReferenceGeometry,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            noise_level: 0.1,
            reference: ReferenceGeometry::unit_square(),
        }
    }
}

/// Dead-reckoned kinematic state of one IMU.
#[derive(Debug, Clone, Copy, Default)]
pub struct SensorState {
    pub position: Point2D,
    pub velocity: Point2D,
}

/// Stateful frame processor. Not thread-safe; owned by the fusion
/// consumer thread.
pub struct FusionPipeline {
    config: PipelineConfig,
    states: Vec<SensorState>,
    calibrations: Vec<ImuCalibration>,
    uncertainty: UncertaintyModel,
    history: PointHistory,
    last_timestamp_us: Option<u64>,
}

impl FusionPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        let imu_count = config.reference.len();
        let uncertainty = UncertaintyModel::new(config.noise_level);
        Self {
            config,
            states: vec![SensorState::default(); imu_count],
            calibrations: vec![ImuCalibration::default(); imu_count],
            uncertainty,
            history: PointHistory::new(),
            last_timestamp_us: None,
        }
    }

    pub fn imu_count(&self) -> usize {
        self.states.len()
    }

    pub fn sensor_states(&self) -> &[SensorState] {
        &self.states
    }

    pub fn history(&self) -> &PointHistory {
        &self.history
    }

    /// Install a calibration for one IMU.
    pub fn set_calibration(&mut self, imu_id: usize, calibration: ImuCalibration) -> Result<()> {
        match self.calibrations.get_mut(imu_id) {
            Some(slot) => {
                *slot = calibration;
                Ok(())
            }
            None => Err(FusionError::OutOfRangeSensorId {
                imu_id,
                imu_count: self.states.len(),
            }),
        }
    }

    /// Process one synchronized frame and produce a fused estimate.
    pub fn process_frame(&mut self, frame: &Frame) -> Timestamped<Estimate> {
        let dt = self.integration_step(frame.timestamp_us);
        self.last_timestamp_us = Some(frame.timestamp_us);

        for sample in &frame.samples {
            let Some(state) = self.states.get_mut(sample.imu_id) else {
                log::warn!("frame sample for unknown IMU {}, skipping", sample.imu_id);
                continue;
            };
            let [ax, ay] = self.calibrations[sample.imu_id].apply(sample.accel);
            state.velocity.x += ax * dt;
            state.velocity.y += ay * dt;
            state.position.x += state.velocity.x * dt;
            state.position.y += state.velocity.y * dt;
        }

        let positions: Vec<Point2D> = self.states.iter().map(|s| s.position).collect();
        for p in &positions {
            self.history.add(*p);
        }

        let radius = self.uncertainty.radius(dt);
        let estimates: Vec<Estimate> = positions
            .iter()
            .map(|p| Estimate::new(p.x, p.y, radius))
            .collect();
        let (alpha, mut fused) = fuse(&estimates);
        log::debug!(
            "frame t={}us dt={:.6}s alpha={:.4}",
            frame.timestamp_us,
            dt,
            alpha
        );

        self.apply_rigid_correction(&positions);
        self.refine_against_history(&mut fused);

        Timestamped::new(fused, frame.timestamp_us)
    }

    /// Drain whatever complete frames the synchronizer holds and
    /// process them in order.
    pub fn drain_and_process(&mut self, sync: &SampleSynchronizer) -> Vec<Timestamped<Estimate>> {
        sync.drain_ready()
            .iter()
            .map(|frame| self.process_frame(frame))
            .collect()
    }

    /// Forget all kinematic state and history.
    pub fn reset(&mut self) {
        for state in &mut self.states {
            *state = SensorState::default();
        }
        self.history.clear();
        self.last_timestamp_us = None;
    }

    /// Integration step in seconds, clamped so repeated or reordered
    /// timestamps never produce a zero or negative step.
    fn integration_step(&self, timestamp_us: u64) -> f64 {
        match self.last_timestamp_us {
            Some(last) => (timestamp_us.saturating_sub(last) as f64 / 1e6).max(MIN_TIME_DELTA),
            None => MIN_TIME_DELTA,
        }
    }

    /// Snap drifted sensor positions back onto the rigid array layout.
    ///
    /// Fits the reference geometry to the integrated positions and,
    /// when the fit is trustworthy, replaces each position with its
    /// rigidity-consistent projection. A collapsed fit (all positions
    /// coincident, scale near zero) is left alone.
    fn apply_rigid_correction(&mut self, positions: &[Point2D]) {
        let fit = match align(self.config.reference.points(), positions) {
            Ok(fit) => fit,
            Err(e) => {
                log::warn!("rigid correction skipped: {e}");
                return;
            }
        };
        if fit.scale < RIGID_MIN_SCALE {
            log::debug!("rigid correction skipped: degenerate fit (scale {:.2e})", fit.scale);
            return;
        }
        for (state, corrected) in self.states.iter_mut().zip(&fit.aligned) {
            state.position = *corrected;
        }
    }

    /// Average the fused point with historical points inside its
    /// uncertainty radius. With no neighbors the point is unchanged.
    fn refine_against_history(&self, fused: &mut Estimate) {
        let neighbors = self.history.radius_search(fused.x, fused.y, fused.radius);
        if neighbors.is_empty() {
            return;
        }
        let c = centroid(&neighbors);
        fused.x = c.x;
        fused.y = c.y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::ImuSample;
    use approx::assert_relative_eq;

    fn frame(timestamp_us: u64, accels: &[[f64; 2]]) -> Frame {
        Frame {
            timestamp_us,
            samples: accels
                .iter()
                .enumerate()
                .map(|(imu_id, &accel)| ImuSample {
                    imu_id,
                    timestamp_us,
                    accel,
                    gyro: [0.0, 0.0],
                })
                .collect(),
        }
    }

    #[test]
    fn test_stationary_array_stays_at_origin() {
        let mut pipeline = FusionPipeline::new(PipelineConfig::default());
        let zero = [[0.0, 0.0]; 4];
        for i in 0..10 {
            let out = pipeline.process_frame(&frame(i * 1000, &zero));
            assert_relative_eq!(out.data.x, 0.0, epsilon = 1e-9);
            assert_relative_eq!(out.data.y, 0.0, epsilon = 1e-9);
            assert_eq!(out.timestamp_us, i * 1000);
        }
        for state in pipeline.sensor_states() {
            assert_relative_eq!(state.position.x, 0.0, epsilon = 1e-12);
            assert_relative_eq!(state.position.y, 0.0, epsilon = 1e-12);
        }
        // One history point per sensor per frame.
        assert_eq!(pipeline.history().len(), 40);
    }

    #[test]
    fn test_constant_acceleration_moves_estimate() {
        let mut pipeline = FusionPipeline::new(PipelineConfig::default());
        let push = [[1.0, 0.0]; 4];
        let mut last_x = f64::NEG_INFINITY;
        let mut out = Timestamped::new(Estimate::default(), 0);
        for i in 0..50 {
            out = pipeline.process_frame(&frame(i * 1000, &push));
            assert!(out.data.x >= last_x - 1e-12, "x went backwards at frame {i}");
            last_x = out.data.x;
        }
        assert!(out.data.x > 0.0);
        assert_relative_eq!(out.data.y, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_rigid_correction_preserves_array_shape() {
        let mut pipeline = FusionPipeline::new(PipelineConfig::default());
        // Accelerations equal to the unit-square corners; after a one
        // second step each sensor has moved to its corner.
        let corners = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
        pipeline.process_frame(&frame(0, &corners));
        pipeline.process_frame(&frame(1_000_000, &corners));

        let states = pipeline.sensor_states();
        let reference = ReferenceGeometry::unit_square();
        // Pairwise distances must match the rigid reference layout.
        for i in 0..4 {
            for j in (i + 1)..4 {
                let got = states[i].position.distance(&states[j].position);
                let want = reference.points()[i].distance(&reference.points()[j]);
                assert_relative_eq!(got, want, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn test_repeated_timestamp_clamps_dt() {
        let mut pipeline = FusionPipeline::new(PipelineConfig::default());
        let push = [[100.0, 0.0]; 4];
        pipeline.process_frame(&frame(1000, &push));
        let before = pipeline.sensor_states()[0].position.x;
        // Same timestamp again: dt clamps to the minimum step, so the
        // position barely moves instead of exploding or dividing by 0.
        pipeline.process_frame(&frame(1000, &push));
        let after = pipeline.sensor_states()[0].position.x;
        assert!((after - before).abs() < 1e-6);
    }

    #[test]
    fn test_unknown_imu_id_in_frame_skipped() {
        let mut pipeline = FusionPipeline::new(PipelineConfig::default());
        let mut f = frame(1000, &[[0.0, 0.0]; 4]);
        f.samples[3].imu_id = 17;
        // Must not panic; the stray sample is ignored.
        let out = pipeline.process_frame(&f);
        assert_relative_eq!(out.data.x, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_calibration_removes_constant_bias() {
        let mut pipeline = FusionPipeline::new(PipelineConfig::default());
        let bias = [0.5, -0.25];
        for imu_id in 0..4 {
            pipeline
                .set_calibration(imu_id, ImuCalibration::from_samples(&[bias]))
                .unwrap();
        }
        assert!(pipeline.set_calibration(9, ImuCalibration::default()).is_err());

        // Biased readings should integrate to no motion at all.
        for i in 0..10 {
            let out = pipeline.process_frame(&frame(i * 1000, &[bias; 4]));
            assert_relative_eq!(out.data.x, 0.0, epsilon = 1e-9);
            assert_relative_eq!(out.data.y, 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_reset_clears_state_and_history() {
        let mut pipeline = FusionPipeline::new(PipelineConfig::default());
        pipeline.process_frame(&frame(0, &[[1.0, 1.0]; 4]));
        pipeline.process_frame(&frame(1_000_000, &[[1.0, 1.0]; 4]));
        pipeline.reset();

        assert!(pipeline.history().is_empty());
        for state in pipeline.sensor_states() {
            assert_relative_eq!(state.position.x, 0.0);
            assert_relative_eq!(state.velocity.x, 0.0);
        }
    }

    #[test]
    fn test_drain_and_process_consumes_ready_frames() {
        let mut pipeline = FusionPipeline::new(PipelineConfig::default());
        let sync = SampleSynchronizer::new(4);
        for t in [1000u64, 2000] {
            for imu_id in 0..4 {
                sync.add(ImuSample {
                    imu_id,
                    timestamp_us: t,
                    accel: [0.0, 0.0],
                    gyro: [0.0, 0.0],
                })
                .unwrap();
            }
        }
        let outputs = pipeline.drain_and_process(&sync);
        assert_eq!(outputs.len(), 2);
        assert_eq!(outputs[0].timestamp_us, 1000);
        assert_eq!(outputs[1].timestamp_us, 2000);
        assert_eq!(sync.buffered_len(), 0);
    }
}
