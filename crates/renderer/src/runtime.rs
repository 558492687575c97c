use std::time::{Duration, Instant};

/// Produces per-frame deltas from the monotonic clock.
///
/// The first call to [`FrameClock::tick`] reports zero so the animation starts
/// from its initial state regardless of how long start-up took.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameClock {
    last: Option<Instant>,
    frame: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    /// Deterministic variant of [`FrameClock::tick`] for callers that already
    /// sampled the clock.
    pub fn tick_at(&mut self, now: Instant) -> f32 {
        let delta = match self.last {
            Some(last) => now.saturating_duration_since(last).as_secs_f32(),
            None => 0.0,
        };
        self.last = Some(now);
        self.frame = self.frame.saturating_add(1);
        delta
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }
}

/// Decides when the next redraw should be requested under an optional FPS cap.
#[derive(Debug, Clone)]
pub struct FrameScheduler {
    interval: Option<Duration>,
    last_render: Option<Instant>,
}

impl FrameScheduler {
    /// `None`, zero or non-finite caps mean "render on every opportunity".
    pub fn new(target_fps: Option<f32>) -> Self {
        let interval = target_fps
            .filter(|fps| fps.is_finite() && *fps > 0.0)
            .map(|fps| Duration::from_secs_f32(1.0 / fps));
        Self {
            interval,
            last_render: None,
        }
    }

    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }

    pub fn ready_for_frame(&self, now: Instant) -> bool {
        match (self.interval, self.last_render) {
            (Some(interval), Some(last)) => now.saturating_duration_since(last) >= interval,
            _ => true,
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.interval, self.last_render) {
            (Some(interval), Some(last)) => Some(last + interval),
            _ => None,
        }
    }

    pub fn mark_rendered_at(&mut self, now: Instant) {
        self.last_render = Some(now);
    }

    pub fn mark_rendered(&mut self) {
        self.mark_rendered_at(Instant::now());
    }
}
