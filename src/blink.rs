/// Blink engine: decides which foreground image each frame shows.
///
///   EyesOpen   → open-eyes image
///   EyesClosed → closed-eyes image, for `closed_frames` ticks after a trigger
///
/// A blink is triggered once the time since the previous trigger exceeds a
/// delay drawn uniformly from [min_delay_s, max_delay_s). The trigger check
/// is independent of the closed-frame counter, so a short delay can re-arm a
/// blink that is still in progress. Blink length is counted in frames.

use crate::config::BlinkConfig;
use std::time::{Duration, Instant};

/// Which foreground image to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eyes {
    Open,
    Closed,
}

pub struct BlinkController {
    rng: fastrand::Rng,
    min_delay_s: f64,
    max_delay_s: f64,
    closed_frames: u32,
    last_blink: Instant,
    next_delay: Duration,
    closed_frames_left: u32,
}

impl BlinkController {
    /// Create a controller and trigger the first blink at `now`.
    pub fn new(config: &BlinkConfig, rng: fastrand::Rng, now: Instant) -> Self {
        let mut blink = Self {
            rng,
            min_delay_s: config.min_delay_s,
            max_delay_s: config.max_delay_s,
            closed_frames: config.closed_frames,
            last_blink: now,
            next_delay: Duration::ZERO,
            closed_frames_left: 0,
        };
        blink.trigger(now);
        blink
    }

    fn trigger(&mut self, now: Instant) {
        // rng.f64() is in [0, 1), keeping the upper bound exclusive
        let span = self.max_delay_s - self.min_delay_s;
        let delay_s = self.min_delay_s + span * self.rng.f64();
        // a delay past Duration's range means "never again", not a panic
        self.next_delay = Duration::try_from_secs_f64(delay_s).unwrap_or(Duration::MAX);
        self.last_blink = now;
        self.closed_frames_left = self.closed_frames;
    }

    /// Pick this frame's image, consuming one closed frame if a blink is running.
    pub fn select(&mut self) -> Eyes {
        if self.closed_frames_left > 0 {
            self.closed_frames_left -= 1;
            Eyes::Closed
        } else {
            Eyes::Open
        }
    }

    /// Re-arm if the current delay has elapsed. Returns true when a blink fired.
    pub fn update(&mut self, now: Instant) -> bool {
        if self.since_last_blink(now) > self.next_delay {
            self.trigger(now);
            log::trace!("Blink (next in {:.2}s)", self.next_delay.as_secs_f64());
            true
        } else {
            false
        }
    }

    /// Time since the last trigger; zero if `now` predates it.
    pub fn since_last_blink(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_blink)
    }

    #[cfg(test)]
    pub fn next_delay(&self) -> Duration {
        self.next_delay
    }

    #[cfg(test)]
    pub fn closed_frames_left(&self) -> u32 {
        self.closed_frames_left
    }
}
