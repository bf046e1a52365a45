//! Time alignment of samples across the IMU array.
//!
//! Producers push samples concurrently; the consumer drains complete
//! frames in timestamp order. A frame is complete once every IMU has
//! contributed a sample for its timestamp. Draining stops at the first
//! incomplete timestamp so frames are never released out of order.

use std::collections::BTreeMap;

use parking_lot::Mutex;

use crate::core::types::{Frame, ImuSample};
use crate::error::{FusionError, Result};

/// Thread-safe buffer grouping samples by timestamp.
#[derive(Debug)]
pub struct SampleSynchronizer {
    imu_count: usize,
    buffer: Mutex<BTreeMap<u64, Vec<ImuSample>>>,
}

impl SampleSynchronizer {
    pub fn new(imu_count: usize) -> Self {
        Self {
            imu_count,
            buffer: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn imu_count(&self) -> usize {
        self.imu_count
    }

    /// Buffer one sample.
    ///
    /// A sample that repeats an (timestamp, IMU id) pair replaces the
    /// earlier one, keeping at most one sample per IMU per timestamp.
    pub fn add(&self, sample: ImuSample) -> Result<()> {
        if sample.imu_id >= self.imu_count {
            return Err(FusionError::OutOfRangeSensorId {
                imu_id: sample.imu_id,
                imu_count: self.imu_count,
            });
        }
        let mut buffer = self.buffer.lock();
        let slot = buffer.entry(sample.timestamp_us).or_default();
        match slot.iter_mut().find(|s| s.imu_id == sample.imu_id) {
            Some(existing) => {
                log::warn!(
                    "duplicate sample for IMU {} at t={}us, replacing",
                    sample.imu_id,
                    sample.timestamp_us
                );
                *existing = sample;
            }
            None => slot.push(sample),
        }
        Ok(())
    }

    /// Remove and return all complete frames at the head of the buffer,
    /// oldest first.
    ///
    /// Stops at the first timestamp still missing a sample, even when
    /// later timestamps are already complete. Those stay buffered until
    /// the gap fills.
    pub fn drain_ready(&self) -> Vec<Frame> {
        let mut buffer = self.buffer.lock();
        let mut frames = Vec::new();
        while let Some(entry) = buffer.first_entry() {
            if entry.get().len() < self.imu_count {
                break;
            }
            let (timestamp_us, mut samples) = entry.remove_entry();
            samples.sort_by_key(|s| s.imu_id);
            frames.push(Frame {
                timestamp_us,
                samples,
            });
        }
        frames
    }

    /// Number of samples currently buffered, complete or not.
    pub fn buffered_len(&self) -> usize {
        self.buffer.lock().values().map(Vec::len).sum()
    }

    /// Drop all buffered samples.
    pub fn clear(&self) {
        self.buffer.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(imu_id: usize, timestamp_us: u64) -> ImuSample {
        ImuSample {
            imu_id,
            timestamp_us,
            accel: [0.0, 0.0],
            gyro: [0.0, 0.0],
        }
    }

    #[test]
    fn test_incomplete_frame_not_released() {
        let sync = SampleSynchronizer::new(3);
        sync.add(sample(0, 100)).unwrap();
        sync.add(sample(1, 100)).unwrap();
        assert!(sync.drain_ready().is_empty());
        assert_eq!(sync.buffered_len(), 2);
    }

    #[test]
    fn test_complete_frames_drain_in_order() {
        let sync = SampleSynchronizer::new(2);
        // Arrival order deliberately scrambled.
        sync.add(sample(1, 200)).unwrap();
        sync.add(sample(0, 100)).unwrap();
        sync.add(sample(0, 200)).unwrap();
        sync.add(sample(1, 100)).unwrap();

        let frames = sync.drain_ready();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].timestamp_us, 100);
        assert_eq!(frames[1].timestamp_us, 200);
        // Samples inside a frame come out ordered by IMU id.
        assert_eq!(frames[0].samples[0].imu_id, 0);
        assert_eq!(frames[0].samples[1].imu_id, 1);
        assert_eq!(sync.buffered_len(), 0);
    }

    #[test]
    fn test_gap_blocks_later_complete_frames() {
        let sync = SampleSynchronizer::new(2);
        sync.add(sample(0, 100)).unwrap();
        sync.add(sample(0, 200)).unwrap();
        sync.add(sample(1, 200)).unwrap();

        // t=200 is complete but t=100 is not; nothing drains.
        assert!(sync.drain_ready().is_empty());

        sync.add(sample(1, 100)).unwrap();
        let frames = sync.drain_ready();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].timestamp_us, 100);
    }

    #[test]
    fn test_duplicate_sample_replaces() {
        let sync = SampleSynchronizer::new(2);
        sync.add(sample(0, 100)).unwrap();
        let mut dup = sample(0, 100);
        dup.accel = [9.0, 0.0];
        sync.add(dup).unwrap();
        sync.add(sample(1, 100)).unwrap();

        let frames = sync.drain_ready();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].samples.len(), 2);
        assert_eq!(frames[0].samples[0].accel, [9.0, 0.0]);
    }

    #[test]
    fn test_out_of_range_id_rejected() {
        let sync = SampleSynchronizer::new(2);
        assert!(matches!(
            sync.add(sample(2, 100)),
            Err(FusionError::OutOfRangeSensorId { imu_id: 2, .. })
        ));
        assert_eq!(sync.buffered_len(), 0);
    }

    #[test]
    fn test_clear_empties_buffer() {
        let sync = SampleSynchronizer::new(2);
        sync.add(sample(0, 100)).unwrap();
        sync.clear();
        assert_eq!(sync.buffered_len(), 0);
    }
}
