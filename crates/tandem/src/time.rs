//! # Frame Time
//!
//! [`GameTime`] is what systems see; [`GameClock`] produces one per frame
//! from the wall clock.

use std::time::Instant;

/// Longest frame delta handed to systems (seconds). Longer gaps, such as a
/// debugger pause, are clamped so movement does not jump.
pub const MAX_FRAME_DELTA: f32 = 0.1;

/// Timing of the current frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GameTime {
    /// Seconds since the previous frame.
    pub delta: f32,
    /// Seconds since the clock started.
    pub time: f32,
}

impl GameTime {
    /// Explicit frame timing.
    #[inline]
    #[must_use]
    pub const fn new(delta: f32, time: f32) -> Self {
        Self { delta, time }
    }
}

/// Wall-clock frame timer.
#[derive(Clone, Debug)]
pub struct GameClock {
    last: Option<Instant>,
    elapsed: f32,
    frame: u64,
    max_delta: f32,
}

impl Default for GameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl GameClock {
    /// Clock clamping deltas to [`MAX_FRAME_DELTA`].
    #[must_use]
    pub const fn new() -> Self {
        Self::with_max_delta(MAX_FRAME_DELTA)
    }

    /// Clock clamping deltas to `max_delta`.
    #[must_use]
    pub const fn with_max_delta(max_delta: f32) -> Self {
        Self {
            last: None,
            elapsed: 0.0,
            frame: 0,
            max_delta,
        }
    }

    /// Starts a frame. The first frame has a zero delta.
    pub fn tick(&mut self) -> GameTime {
        let now = Instant::now();
        let delta = self
            .last
            .map_or(0.0, |last| now.duration_since(last).as_secs_f32().min(self.max_delta));
        self.last = Some(now);
        self.elapsed += delta;
        self.frame += 1;
        GameTime::new(delta, self.elapsed)
    }

    /// Frames started so far.
    #[inline]
    #[must_use]
    pub const fn frame(&self) -> u64 {
        self.frame
    }

    /// Sum of all clamped deltas.
    #[inline]
    #[must_use]
    pub const fn elapsed(&self) -> f32 {
        self.elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_first_tick_has_zero_delta() {
        let mut clock = GameClock::new();
        let time = clock.tick();
        assert!(time.delta.abs() < f32::EPSILON);
        assert_eq!(clock.frame(), 1);
    }

    #[test]
    fn test_delta_is_clamped() {
        let mut clock = GameClock::with_max_delta(0.001);
        clock.tick();
        std::thread::sleep(Duration::from_millis(5));
        let time = clock.tick();
        assert!((time.delta - 0.001).abs() < f32::EPSILON);
        assert!((clock.elapsed() - 0.001).abs() < f32::EPSILON);
    }
}
