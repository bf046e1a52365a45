//! Consumer thread driving the fusion pipeline.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Receiver};

use crate::core::types::{Estimate, Timestamped};
use crate::engine::FusionPipeline;
use crate::sensors::SampleSynchronizer;
use crate::utils::constants::IDLE_POLL;

/// Owns the thread that drains the synchronizer and runs the pipeline.
///
/// Fused estimates are delivered over the returned channel. The thread
/// exits once the `running` flag clears and no more complete frames
/// are ready; frames already complete at shutdown are still processed.
#[derive(Debug)]
pub struct FusionThread {
    handle: JoinHandle<()>,
}

impl FusionThread {
    pub fn spawn(
        mut pipeline: FusionPipeline,
        sync: Arc<SampleSynchronizer>,
        running: Arc<AtomicBool>,
    ) -> std::io::Result<(Self, Receiver<Timestamped<Estimate>>)> {
        let (tx, rx) = unbounded();
        let handle = thread::Builder::new().name("fusion".into()).spawn(move || {
            'outer: loop {
                let outputs = pipeline.drain_and_process(&sync);
                if outputs.is_empty() {
                    if !running.load(Ordering::Relaxed) {
                        break;
                    }
                    thread::sleep(IDLE_POLL);
                    continue;
                }
                for out in outputs {
                    if tx.send(out).is_err() {
                        // Receiver dropped; nobody is listening anymore.
                        break 'outer;
                    }
                }
            }
            log::info!("fusion thread exiting");
        })?;
        Ok((Self { handle }, rx))
    }

    /// Wait for the fusion thread to exit.
    pub fn join(self) {
        if self.handle.join().is_err() {
            log::error!("fusion thread panicked");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::ImuSample;
    use crate::engine::PipelineConfig;
    use std::time::Duration;

    fn push_frame(sync: &SampleSynchronizer, timestamp_us: u64) {
        for imu_id in 0..sync.imu_count() {
            sync.add(ImuSample {
                imu_id,
                timestamp_us,
                accel: [0.0, 0.0],
                gyro: [0.0, 0.0],
            })
            .unwrap();
        }
    }

    #[test]
    fn test_estimates_flow_through_channel() {
        let sync = Arc::new(SampleSynchronizer::new(4));
        let running = Arc::new(AtomicBool::new(true));
        let pipeline = FusionPipeline::new(PipelineConfig::default());
        let (thread, rx) =
            FusionThread::spawn(pipeline, Arc::clone(&sync), Arc::clone(&running)).unwrap();

        push_frame(&sync, 1000);
        push_frame(&sync, 2000);

        let first = rx.recv_timeout(Duration::from_secs(1)).unwrap();
        let second = rx.recv_timeout(Duration::from_secs(1)).unwrap();
        assert_eq!(first.timestamp_us, 1000);
        assert_eq!(second.timestamp_us, 2000);

        running.store(false, Ordering::Relaxed);
        thread.join();
    }

    #[test]
    fn test_thread_drains_pending_frames_before_exit() {
        let sync = Arc::new(SampleSynchronizer::new(2));
        let running = Arc::new(AtomicBool::new(true));
        let pipeline = FusionPipeline::new(
            PipelineConfig {
                reference: crate::core::types::ReferenceGeometry::from_points(vec![
                    crate::core::types::Point2D::new(0.0, 0.0),
                    crate::core::types::Point2D::new(1.0, 0.0),
                ])
                .unwrap(),
                ..Default::default()
            },
        );
        push_frame(&sync, 500);
        // Stop requested before the thread even starts; the complete
        // frame must still come out.
        running.store(false, Ordering::Relaxed);

        let (thread, rx) =
            FusionThread::spawn(pipeline, Arc::clone(&sync), Arc::clone(&running)).unwrap();
        let out = rx.recv_timeout(Duration::from_secs(1)).unwrap();
        assert_eq!(out.timestamp_us, 500);
        thread.join();
        assert!(rx.recv().is_err());
    }
}
