use std::{f32::consts::PI, time::Duration};

use crate::math::Angle;

/// Counts rendered frames.
///
/// Starts at zero and only moves forward, one unit per rendered frame. The
/// count never wraps within a session.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameCounter {
    frames: u64,
}

impl FrameCounter {
    /// Returns a counter that has not counted any frames.
    #[must_use]
    pub const fn new() -> Self {
        Self { frames: 0 }
    }

    /// Counts one more rendered frame and returns the new count.
    pub fn advance(&mut self) -> u64 {
        self.frames += 1;
        self.frames
    }

    /// The number of frames counted so far.
    #[must_use]
    pub const fn frames(&self) -> u64 {
        self.frames
    }

    /// The frame count read as a number of degrees.
    #[must_use]
    pub fn degrees(&self) -> f32 {
        self.frames as f32
    }

    /// The frame count read as degrees, converted to an angle.
    #[must_use]
    pub fn angle(&self) -> Angle {
        frame_angle(self.frames)
    }
}

/// Returns `frame` degrees as an angle. There is no modulo: frame 720 is two
/// full turns, not zero.
#[must_use]
pub fn frame_angle(frame: u64) -> Angle {
    Angle::radians(frame as f32 * PI / 180.)
}

/// Host clock time, in ticks of 1/60th of a second since the host started.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Time(pub u64);

impl Time {
    /// The number of ticks in one second.
    pub const TICKS_PER_SECOND: u64 = 60;

    /// Converts an elapsed duration into whole ticks, rounding down.
    #[must_use]
    pub fn from_elapsed(elapsed: Duration) -> Self {
        let ticks =
            elapsed.as_nanos() * u128::from(Self::TICKS_PER_SECOND) / 1_000_000_000;
        Self(ticks as u64)
    }

    /// Returns the duration covered by this many ticks.
    #[must_use]
    pub fn as_duration(self) -> Duration {
        let seconds = self.0 / Self::TICKS_PER_SECOND;
        let ticks = self.0 % Self::TICKS_PER_SECOND;
        Duration::from_secs(seconds)
            + Duration::from_nanos(ticks * 1_000_000_000 / Self::TICKS_PER_SECOND)
    }
}

/// The timing of a single rendered frame, handed to the arrangement pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// The frame counter value for this frame.
    pub frame: u64,
    /// Wall-clock time since the host started.
    pub elapsed: Duration,
}

impl Tick {
    /// Returns a tick for `frame` at `elapsed`.
    #[must_use]
    pub const fn new(frame: u64, elapsed: Duration) -> Self {
        Self { frame, elapsed }
    }

    /// The host clock time of this frame.
    #[must_use]
    pub fn time(&self) -> Time {
        Time::from_elapsed(self.elapsed)
    }
}

/// How fast a spinning sprite turns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Spin {
    /// Turn a fixed number of degrees every rendered frame. The speed follows
    /// the frame rate.
    PerFrame {
        /// Degrees per frame.
        degrees: f32,
    },
    /// Turn at a fixed angular velocity measured against wall-clock time.
    PerSecond {
        /// Degrees per second.
        degrees: f32,
    },
}

impl Default for Spin {
    fn default() -> Self {
        Self::PerFrame { degrees: 1. }
    }
}

impl Spin {
    /// Returns the angle to draw at for `tick`.
    #[must_use]
    pub fn angle(self, tick: Tick) -> Angle {
        match self {
            Self::PerFrame { degrees } => {
                Angle::radians(tick.frame as f32 * degrees * PI / 180.)
            }
            Self::PerSecond { degrees } => {
                Angle::radians(tick.elapsed.as_secs_f32() * degrees * PI / 180.)
            }
        }
    }
}
