/// Virtual camera output: fixed-size RGB frames at a paced frame rate.
///
/// `RawVideoSink` writes packed rgb24 frames, back to back, to a path. Point it
/// at a FIFO feeding a v4l2loopback device, e.g.
///
///   mkfifo /tmp/ponycam.rgb
///   ffmpeg -f rawvideo -pix_fmt rgb24 -s 1280x720 -r 20 -i /tmp/ponycam.rgb \
///          -f v4l2 -pix_fmt yuv420p /dev/video10
///
/// or at a plain file to record the feed.

use crate::error::Error;
use image::RgbImage;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::time::{Duration, Instant};

/// Destination for composed frames.
pub trait CameraSink {
    /// Human-readable device identifier.
    fn device(&self) -> &str;
    /// Emit one frame.
    fn send(&mut self, frame: &RgbImage) -> Result<(), Error>;
    /// Block until the next frame is due.
    fn sleep_until_next_frame(&mut self);
}

// ── Pacing ──────────────────────────────────────────────────────────

/// Fixed-rate frame scheduler.
///
/// Deadlines advance by exactly one interval per frame so the average rate
/// holds. If the caller falls more than one interval behind, the schedule
/// restarts from now instead of bursting to catch up.
pub struct FramePacer {
    interval: Duration,
    next_deadline: Option<Instant>,
}

impl FramePacer {
    pub fn new(fps: u32) -> Self {
        Self {
            interval: Duration::from_secs_f64(1.0 / fps.max(1) as f64),
            next_deadline: None,
        }
    }

    #[cfg(test)]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Advance the schedule and return how long to sleep from `now`.
    pub fn schedule(&mut self, now: Instant) -> Duration {
        let deadline = match self.next_deadline {
            Some(d) if now <= d + self.interval => d,
            Some(_) => {
                log::debug!("Frame loop fell behind, resetting schedule");
                now
            }
            None => now + self.interval,
        };
        self.next_deadline = Some(deadline + self.interval);
        deadline.saturating_duration_since(now)
    }

    pub fn wait(&mut self) {
        let delay = self.schedule(Instant::now());
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
    }
}

// ── Raw rgb24 sink ──────────────────────────────────────────────────

pub struct RawVideoSink {
    path: String,
    writer: BufWriter<File>,
    width: u32,
    height: u32,
    pacer: FramePacer,
}

impl RawVideoSink {
    /// Open `path` for writing. Blocks on a FIFO until a reader attaches.
    pub fn open(path: &str, width: u32, height: u32, fps: u32) -> Result<Self, Error> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .open(path)
            .map_err(|source| Error::CameraOpen {
                device: path.to_string(),
                source,
            })?;
        let frame_bytes = width as usize * height as usize * 3;
        Ok(Self {
            path: path.to_string(),
            writer: BufWriter::with_capacity(frame_bytes, file),
            width,
            height,
            pacer: FramePacer::new(fps),
        })
    }
}

impl CameraSink for RawVideoSink {
    fn device(&self) -> &str {
        &self.path
    }

    fn send(&mut self, frame: &RgbImage) -> Result<(), Error> {
        let (width, height) = frame.dimensions();
        if (width, height) != (self.width, self.height) {
            return Err(Error::FrameSize {
                width,
                height,
                expected_width: self.width,
                expected_height: self.height,
            });
        }
        self.writer
            .write_all(frame.as_raw())
            .and_then(|()| self.writer.flush())
            .map_err(|source| Error::CameraWrite {
                device: self.path.clone(),
                source,
            })
    }

    fn sleep_until_next_frame(&mut self) {
        self.pacer.wait();
    }
}
