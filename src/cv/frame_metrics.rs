use log::{debug, info};
use std::time::{Duration, Instant};

/// Lower bound on the per-frame wait, so the window still gets to process events.
pub const MIN_FRAME_DELAY: Duration = Duration::from_millis(3);

const REPORT_EVERY: usize = 100;

/// Time left to wait in a frame that already took `elapsed`, aiming at `target_fps`.
pub fn frame_delay(target_fps: u32, elapsed: Duration) -> Duration {
    let period = Duration::from_secs(1) / target_fps.max(1);
    period.saturating_sub(elapsed).max(MIN_FRAME_DELAY)
}

pub struct FrameMetrics {
    last_frame_time: Instant,
    fps: f32,
    frame_count: usize,
    min_fps: f32,
    max_fps: f32,
    start_time: Instant,
}

impl FrameMetrics {
    pub fn new() -> Self {
        debug!("Initializing frame metrics tracker");
        let now = Instant::now();
        FrameMetrics {
            last_frame_time: now,
            fps: 0.0,
            frame_count: 0,
            min_fps: f32::MAX,
            max_fps: 0.0,
            start_time: now,
        }
    }

    /// Closes the current frame.
    pub fn update(&mut self) {
        self.update_at(Instant::now());
    }

    fn update_at(&mut self, now: Instant) {
        let elapsed = now.duration_since(self.last_frame_time);
        let secs = elapsed.as_secs_f32();
        if secs > 0.0 {
            self.fps = 1.0 / secs;
            self.min_fps = self.min_fps.min(self.fps);
            self.max_fps = self.max_fps.max(self.fps);
        }
        self.frame_count += 1;

        if self.frame_count % REPORT_EVERY == 0 {
            info!(
                "Performance stats after {} frames: Current: {:.1} FPS, Avg: {:.1} FPS, Min: {:.1} FPS, Max: {:.1} FPS",
                self.frame_count,
                self.fps,
                self.avg_fps(),
                self.min_fps,
                self.max_fps
            );
        } else {
            debug!(
                "Frame #{}: {:.1} FPS (frame time: {}ms)",
                self.frame_count,
                self.fps,
                elapsed.as_millis()
            );
        }

        self.last_frame_time = now;
    }

    /// Current rate, rounded for display.
    pub fn fps(&self) -> u32 {
        self.fps.round() as u32
    }

    pub fn avg_fps(&self) -> f32 {
        let runtime = self.last_frame_time.duration_since(self.start_time).as_secs_f32();
        if runtime > 0.0 {
            self.frame_count as f32 / runtime
        } else {
            0.0
        }
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    pub fn total_runtime(&self) -> Duration {
        self.start_time.elapsed()
    }
}
