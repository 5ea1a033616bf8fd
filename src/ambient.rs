/// Ambient color sampler: in night mode, averages a screenshot of the display
/// once per poll interval and publishes the result for the frame loop.
///
/// Outside night mode the sampler only sleeps and re-checks the mode, so no
/// capture work happens. Capture failures keep the last published color.

use crate::capture::ScreenCapture;
use crate::mode::Mode;
use image::RgbImage;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::{sleep, Duration};

/// Time-averaged RGB of the display.
pub type AmbientColor = [u8; 3];

/// Per-channel arithmetic mean over all pixels, truncated. None for an empty image.
pub fn mean_color(still: &RgbImage) -> Option<AmbientColor> {
    let count = still.width() as u64 * still.height() as u64;
    if count == 0 {
        return None;
    }
    let mut sums = [0u64; 3];
    for px in still.pixels() {
        sums[0] += px.0[0] as u64;
        sums[1] += px.0[1] as u64;
        sums[2] += px.0[2] as u64;
    }
    Some(sums.map(|s| (s / count) as u8))
}

/// Run the sampler loop forever.
pub async fn run(
    capture: Arc<dyn ScreenCapture>,
    poll_interval: Duration,
    mode_rx: watch::Receiver<Mode>,
    tx: watch::Sender<AmbientColor>,
) {
    let mut failures = 0u32;
    loop {
        if *mode_rx.borrow() == Mode::Night {
            let cap = Arc::clone(&capture);
            match tokio::task::spawn_blocking(move || cap.capture()).await {
                Ok(Ok(still)) => match mean_color(&still) {
                    Some(color) => {
                        failures = 0;
                        let previous = tx.send_replace(color);
                        if previous != color {
                            log::debug!("Ambient color {previous:?} → {color:?}");
                        }
                    }
                    None => log::warn!("Screen capture returned an empty image"),
                },
                Ok(Err(e)) => {
                    failures += 1;
                    // one line per streak start, then every 30th failure
                    if failures % 30 == 1 {
                        log::warn!("{e} ({failures} in a row, keeping last ambient color)");
                    }
                }
                Err(e) => log::error!("Screen capture task panicked: {e}"),
            }
        }
        sleep(poll_interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Returns a fixed still, or fails, and counts calls.
    struct FakeCapture {
        calls: AtomicU32,
        color: Option<[u8; 3]>,
    }

    impl FakeCapture {
        fn new(color: Option<[u8; 3]>) -> Arc<Self> {
            Arc::new(Self { calls: AtomicU32::new(0), color })
        }
        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl ScreenCapture for FakeCapture {
        fn capture(&self) -> Result<RgbImage, Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.color {
                Some(c) => Ok(RgbImage::from_pixel(8, 8, image::Rgb(c))),
                None => Err(Error::Capture("display unavailable".into())),
            }
        }
    }

    #[test]
    fn mean_is_per_channel_and_truncated() {
        let mut still = RgbImage::new(2, 1);
        still.put_pixel(0, 0, image::Rgb([255, 0, 10]));
        still.put_pixel(1, 0, image::Rgb([0, 1, 11]));
        // 127.5 → 127, 0.5 → 0, 10.5 → 10
        assert_eq!(mean_color(&still), Some([127, 0, 10]));
    }

    #[test]
    fn mean_of_empty_image_is_none() {
        assert_eq!(mean_color(&RgbImage::new(0, 0)), None);
    }

    /// Let spawned tasks (and their blocking captures) make progress.
    async fn settle() {
        for _ in 0..20 {
            tokio::task::yield_now().await;
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn idles_outside_night_mode() {
        let cap = FakeCapture::new(Some([200, 100, 50]));
        let (_mode_tx, mode_rx) = watch::channel(Mode::Normal);
        let (tx, rx) = watch::channel([0u8; 3]);
        tokio::spawn(run(cap.clone(), Duration::from_secs(1), mode_rx, tx));

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(cap.calls(), 0);
        assert_eq!(*rx.borrow(), [0, 0, 0]);
    }

    #[tokio::test(start_paused = true)]
    async fn samples_in_night_mode_and_stops_after_leaving_it() {
        let cap = FakeCapture::new(Some([200, 100, 50]));
        let (mode_tx, mode_rx) = watch::channel(Mode::Night);
        let (tx, rx) = watch::channel([0u8; 3]);
        tokio::spawn(run(cap.clone(), Duration::from_secs(1), mode_rx, tx));

        settle().await;
        assert!(cap.calls() >= 1);
        assert_eq!(*rx.borrow(), [200, 100, 50]);

        mode_tx.send_replace(Mode::Normal);
        // within one polling interval the sampler stops capturing
        tokio::time::sleep(Duration::from_millis(1500)).await;
        let after = cap.calls();
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(cap.calls(), after);
    }

    #[tokio::test(start_paused = true)]
    async fn capture_failure_keeps_last_color() {
        let cap = FakeCapture::new(None);
        let (_mode_tx, mode_rx) = watch::channel(Mode::Night);
        let (tx, rx) = watch::channel([42u8, 43, 44]);
        let task = tokio::spawn(run(cap.clone(), Duration::from_secs(1), mode_rx, tx));

        tokio::time::sleep(Duration::from_millis(3500)).await;
        settle().await;
        assert!(cap.calls() >= 2, "sampler should keep retrying");
        assert_eq!(*rx.borrow(), [42, 43, 44]);
        assert!(!task.is_finished());
    }
}
