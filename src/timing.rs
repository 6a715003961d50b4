use std::time::Duration;

use instant::Instant;

/// Paces frames so they are not produced faster than a target rate.
#[derive(Debug, Clone)]
pub struct FrequencyLimiter {
    limit: Duration,
    next_target: Option<Instant>,
}

impl FrequencyLimiter {
    /// Returns a limiter allowing one frame per `limit`.
    pub fn new<D: Into<Duration>>(limit: D) -> Self {
        let limit = limit.into();
        Self {
            limit,
            next_target: None,
        }
    }

    /// Returns a limiter allowing `frames_per_second` frames each second.
    #[must_use]
    pub fn per_second(frames_per_second: f32) -> Self {
        Self::new(Duration::from_secs_f32(1. / frames_per_second.max(f32::EPSILON)))
    }

    /// The time left until the next frame is allowed, if any.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        self.next_target
            .and_then(|next_target| next_target.checked_duration_since(Instant::now()))
            .filter(|remaining| *remaining > Duration::default())
    }

    /// Whether a frame may be produced now.
    #[must_use]
    pub fn ready(&self) -> bool {
        self.remaining().is_none()
    }

    /// Records that a frame was produced and returns when the next one is
    /// due. Falling behind does not cause a burst of catch-up frames.
    pub fn advance_frame(&mut self) -> Instant {
        let now = Instant::now();
        let next_target = match self.next_target {
            Some(next_target) => {
                let new_target = next_target + self.limit;
                if new_target > now {
                    new_target
                } else {
                    now + self.limit
                }
            }
            None => now + self.limit,
        };
        self.next_target = Some(next_target);
        next_target
    }

    /// Sleeps until the next frame is allowed.
    pub fn wait(&self) {
        if let Some(remaining) = self.remaining() {
            std::thread::sleep(remaining);
        }
    }
}

/// Measures rendered frames per second over one-second windows.
#[derive(Debug, Clone)]
pub struct FpsMeter {
    window_start: Option<Instant>,
    frames_in_window: u32,
    last_rate: Option<f32>,
}

impl Default for FpsMeter {
    fn default() -> Self {
        Self::new()
    }
}

impl FpsMeter {
    const WINDOW: Duration = Duration::from_secs(1);

    /// Returns a meter that has not seen any frames.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            window_start: None,
            frames_in_window: 0,
            last_rate: None,
        }
    }

    /// Records a frame drawn now. Returns the rate when a window closes.
    pub fn frame(&mut self) -> Option<f32> {
        self.frame_at(Instant::now())
    }

    /// Records a frame drawn at `now`. Returns the rate when a window closes.
    pub fn frame_at(&mut self, now: Instant) -> Option<f32> {
        let start = *self.window_start.get_or_insert(now);
        self.frames_in_window += 1;
        let elapsed = now.saturating_duration_since(start);
        if elapsed >= Self::WINDOW {
            let rate = self.frames_in_window as f32 / elapsed.as_secs_f32();
            self.window_start = Some(now);
            self.frames_in_window = 0;
            self.last_rate = Some(rate);
            Some(rate)
        } else {
            None
        }
    }

    /// The rate measured over the last completed window.
    #[must_use]
    pub const fn last_rate(&self) -> Option<f32> {
        self.last_rate
    }
}
