use std::time::{Duration, Instant};

/// Ring buffer of recent `present` durations.
#[derive(Debug)]
pub struct FrameTimer {
    history: Vec<Duration>,
    next: usize,
    recorded: usize,
}

impl FrameTimer {
    /// A timer keeping the last `capacity` samples (at least one).
    pub fn new(capacity: usize) -> Self {
        Self {
            history: vec![Duration::ZERO; capacity.max(1)],
            next: 0,
            recorded: 0,
        }
    }

    pub fn record(&mut self, dt: Duration) {
        self.history[self.next] = dt;
        self.next = (self.next + 1) % self.history.len();
        self.recorded = (self.recorded + 1).min(self.history.len());
    }

    fn samples(&self) -> &[Duration] {
        &self.history[..self.recorded]
    }

    pub fn average(&self) -> Duration {
        match self.recorded {
            0 => Duration::ZERO,
            n => self.samples().iter().sum::<Duration>() / n as u32,
        }
    }

    pub fn max(&self) -> Duration {
        self.samples().iter().copied().max().unwrap_or(Duration::ZERO)
    }

    pub fn min(&self) -> Duration {
        self.samples().iter().copied().min().unwrap_or(Duration::ZERO)
    }

    /// Samples currently held.
    pub fn count(&self) -> usize {
        self.recorded
    }
}

/// Frames per second, recomputed once per elapsed second.
#[derive(Debug, Clone)]
pub struct FpsCounter {
    window_start: Instant,
    frames: u32,
    fps: f32,
}

impl FpsCounter {
    pub fn new(now: Instant) -> Self {
        Self {
            window_start: now,
            frames: 0,
            fps: 0.0,
        }
    }

    /// Count one frame presented at `now`.
    pub fn tick(&mut self, now: Instant) {
        self.frames += 1;
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed >= Duration::from_secs(1) {
            self.fps = self.frames as f32 / elapsed.as_secs_f32();
            self.frames = 0;
            self.window_start = now;
        }
    }

    /// Last computed rate; zero until a full second has passed.
    pub fn fps(&self) -> f32 {
        self.fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_timer_averages_recent_samples() {
        let mut timer = FrameTimer::new(3);
        assert_eq!(timer.average(), Duration::ZERO);
        timer.record(Duration::from_millis(10));
        timer.record(Duration::from_millis(20));
        assert_eq!(timer.count(), 2);
        assert_eq!(timer.average(), Duration::from_millis(15));
        assert_eq!(timer.min(), Duration::from_millis(10));
        assert_eq!(timer.max(), Duration::from_millis(20));
    }

    #[test]
    fn frame_timer_wraps() {
        let mut timer = FrameTimer::new(2);
        for ms in [100, 10, 20] {
            timer.record(Duration::from_millis(ms));
        }
        assert_eq!(timer.count(), 2);
        assert_eq!(timer.max(), Duration::from_millis(20));
        assert_eq!(timer.average(), Duration::from_millis(15));
    }

    #[test]
    fn zero_capacity_keeps_one_sample() {
        let mut timer = FrameTimer::new(0);
        timer.record(Duration::from_millis(5));
        timer.record(Duration::from_millis(7));
        assert_eq!(timer.count(), 1);
        assert_eq!(timer.average(), Duration::from_millis(7));
    }

    #[test]
    fn fps_updates_once_per_second() {
        let start = Instant::now();
        let mut fps = FpsCounter::new(start);
        for i in 1..=29 {
            fps.tick(start + Duration::from_millis(i * 33));
        }
        assert_eq!(fps.fps(), 0.0);

        fps.tick(start + Duration::from_secs(1));
        assert!((fps.fps() - 30.0).abs() < 1e-3);

        // The next window starts fresh.
        fps.tick(start + Duration::from_millis(1500));
        assert!((fps.fps() - 30.0).abs() < 1e-3);
        fps.tick(start + Duration::from_secs(2));
        assert!((fps.fps() - 2.0).abs() < 1e-3);
    }
}
