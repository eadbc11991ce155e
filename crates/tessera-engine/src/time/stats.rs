use super::FrameTime;

/// Running frame-time statistics over a fixed reporting window.
///
/// `record` returns a summary once every `window` frames so callers can emit
/// a single debug line instead of one per frame.
#[derive(Debug, Clone)]
pub struct FrameStats {
    window: u64,
    frames: u64,
    accum: f64,
    worst: f32,
}

/// Summary of one completed reporting window.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameReport {
    pub frames: u64,
    pub mean_ms: f64,
    pub worst_ms: f32,
}

impl FrameStats {
    pub const DEFAULT_WINDOW: u64 = 300;

    pub fn new(window: u64) -> Self {
        Self {
            window: window.max(1),
            frames: 0,
            accum: 0.0,
            worst: 0.0,
        }
    }

    pub fn record(&mut self, time: &FrameTime) -> Option<FrameReport> {
        self.frames += 1;
        self.accum += time.dt as f64;
        self.worst = self.worst.max(time.dt);

        if self.frames < self.window {
            return None;
        }

        let report = FrameReport {
            frames: self.frames,
            mean_ms: self.accum / self.frames as f64 * 1000.0,
            worst_ms: self.worst * 1000.0,
        };
        *self = Self::new(self.window);
        Some(report)
    }
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::new(Self::DEFAULT_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn ft(dt: f32, frame_index: u64) -> FrameTime {
        FrameTime { dt, now: Instant::now(), frame_index }
    }

    #[test]
    fn reports_once_per_window_then_resets() {
        let mut stats = FrameStats::new(3);
        assert!(stats.record(&ft(0.010, 0)).is_none());
        assert!(stats.record(&ft(0.020, 1)).is_none());
        let report = stats.record(&ft(0.030, 2)).expect("window complete");
        assert_eq!(report.frames, 3);
        assert!((report.mean_ms - 20.0).abs() < 1e-3);
        assert!((report.worst_ms - 30.0).abs() < 1e-3);

        assert!(stats.record(&ft(0.010, 3)).is_none());
    }
}
