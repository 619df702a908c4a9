use std::time::{Duration, Instant};

use tracing::debug;

/// Rolling frames-per-second counter for animated ticks.
#[derive(Debug, Clone)]
pub struct FrameStats {
    frame_count: u64,
    last_update: Option<Instant>,
    frames_since_update: u32,
    frames_per_second: f32,
}

impl FrameStats {
    pub fn new() -> Self {
        Self {
            frame_count: 0,
            last_update: None,
            frames_since_update: 0,
            frames_per_second: 0.0,
        }
    }

    /// Counts one animated frame and logs a summary roughly once a second.
    pub fn record(&mut self, now: Instant, elapsed_time: f64) {
        self.frame_count += 1;
        self.frames_since_update += 1;
        let Some(last) = self.last_update else {
            self.last_update = Some(now);
            return;
        };
        let since = now.saturating_duration_since(last);
        if since >= Duration::from_secs(1) {
            self.frames_per_second = self.frames_since_update as f32 / since.as_secs_f32();
            self.frames_since_update = 0;
            self.last_update = Some(now);
            debug!(
                fps = self.frames_per_second.round(),
                frame_count = self.frame_count,
                time = elapsed_time,
                "render stats"
            );
        }
    }

    /// Forgets the current measurement window; called when the loop restarts.
    pub fn reset_window(&mut self) {
        self.last_update = None;
        self.frames_since_update = 0;
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn frames_per_second(&self) -> f32 {
        self.frames_per_second
    }
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn computes_rate_after_one_second() {
        let mut stats = FrameStats::new();
        let start = Instant::now();
        stats.record(start, 0.0);
        for i in 1..=60 {
            stats.record(start + Duration::from_millis(i * 1000 / 60), 0.0);
        }
        assert_eq!(stats.frame_count(), 61);
        assert!((stats.frames_per_second() - 60.0).abs() < 1.5);
    }
}
