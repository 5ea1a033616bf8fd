/// Frame loop: compose → send → wait for the camera's next slot, forever.
///
/// Mode and ambient color are read as watch snapshots, so the loop never
/// waits on the command reader or the sampler. Returns only on sink failure.

use crate::ambient::AmbientColor;
use crate::camera::CameraSink;
use crate::compose::FrameComposer;
use crate::error::Error;
use crate::mode::Mode;
use std::time::{Duration, Instant};
use tokio::sync::watch;

pub struct Driver<S: CameraSink> {
    composer: FrameComposer,
    sink: S,
    mode_rx: watch::Receiver<Mode>,
    ambient_rx: watch::Receiver<AmbientColor>,
    stats: FrameStats,
}

impl<S: CameraSink> Driver<S> {
    pub fn new(
        composer: FrameComposer,
        sink: S,
        mode_rx: watch::Receiver<Mode>,
        ambient_rx: watch::Receiver<AmbientColor>,
        frame_interval: Duration,
    ) -> Self {
        Self {
            composer,
            sink,
            mode_rx,
            ambient_rx,
            stats: FrameStats::new(frame_interval),
        }
    }

    /// Compose and emit one frame, without waiting for the next slot.
    pub fn step(&mut self) -> Result<(), Error> {
        let mode = *self.mode_rx.borrow();
        let ambient = *self.ambient_rx.borrow();

        let started = Instant::now();
        let frame = self.composer.next_frame(mode, ambient);
        self.stats.record(started.elapsed(), Instant::now());

        self.sink.send(&frame)
    }

    /// Run until the sink fails.
    pub fn run(mut self) -> Result<(), Error> {
        loop {
            self.step()?;
            self.sink.sleep_until_next_frame();
        }
    }

    #[cfg(test)]
    pub fn sink(&self) -> &S {
        &self.sink
    }
}

// ── Frame statistics ────────────────────────────────────────────────

/// Per-second frame count and worst compose time, logged at debug.
/// Composes slower than one frame interval are warned about once per window.
struct FrameStats {
    frame_interval: Duration,
    window_start: Option<Instant>,
    frames: u32,
    worst: Duration,
    overrun_warned: bool,
}

impl FrameStats {
    fn new(frame_interval: Duration) -> Self {
        Self {
            frame_interval,
            window_start: None,
            frames: 0,
            worst: Duration::ZERO,
            overrun_warned: false,
        }
    }

    fn record(&mut self, compose_time: Duration, now: Instant) {
        let start = *self.window_start.get_or_insert(now);
        self.frames += 1;
        self.worst = self.worst.max(compose_time);

        if compose_time > self.frame_interval && !self.overrun_warned {
            log::warn!(
                "Composing took {:.1}ms, longer than the {:.1}ms frame interval",
                compose_time.as_secs_f64() * 1000.0,
                self.frame_interval.as_secs_f64() * 1000.0
            );
            self.overrun_warned = true;
        }

        let window = now.duration_since(start);
        if window >= Duration::from_secs(1) {
            log::debug!(
                "{:.1} fps, worst compose {:.1}ms",
                self.frames as f64 / window.as_secs_f64(),
                self.worst.as_secs_f64() * 1000.0
            );
            self.window_start = Some(now);
            self.frames = 0;
            self.worst = Duration::ZERO;
            self.overrun_warned = false;
        }
    }
}
