/// Frame composer: one 1280x720 RGB frame per tick.
///
/// Pipeline per frame:
///   1. background color from mode (+ time since last blink in party mode)
///   2. pick open/closed foreground via the blink controller
///   3. tint a copy of the foreground per mode (the cached image is never touched)
///   4. source-over onto the opaque background, flatten to RGB
///   5. let the blink controller re-arm
///
/// Steps 1, 3 and 4 live in `render`, a pure function of its inputs.

use crate::ambient::AmbientColor;
use crate::assets::Foreground;
use crate::background;
use crate::blink::{BlinkController, Eyes};
use crate::config::BackgroundConfig;
use crate::lightfield::LightField;
use crate::mode::Mode;
use image::RgbImage;
use std::sync::Arc;
use std::time::Instant;

/// Night tint floor: the character keeps this much light even under a black screen.
const NIGHT_FLOOR: f64 = 25.0;

pub struct FrameComposer {
    background: BackgroundConfig,
    foreground: Foreground,
    light: Arc<LightField>,
    blink: BlinkController,
}

impl FrameComposer {
    pub fn new(
        background: BackgroundConfig,
        foreground: Foreground,
        light: Arc<LightField>,
        blink: BlinkController,
    ) -> Self {
        Self { background, foreground, light, blink }
    }

    /// Compose the next frame using the current time.
    pub fn next_frame(&mut self, mode: Mode, ambient: AmbientColor) -> RgbImage {
        self.next_frame_at(mode, ambient, Instant::now())
    }

    /// Compose the next frame as of `now`.
    pub fn next_frame_at(&mut self, mode: Mode, ambient: AmbientColor, now: Instant) -> RgbImage {
        let elapsed_s = self.blink.since_last_blink(now).as_secs_f64();
        let eyes = self.blink.select();
        let frame = self.render(mode, ambient, eyes, elapsed_s);
        self.blink.update(now);
        frame
    }

    /// Render one frame. Pure: identical inputs give identical bytes.
    pub fn render(
        &self,
        mode: Mode,
        ambient: AmbientColor,
        eyes: Eyes,
        elapsed_s: f64,
    ) -> RgbImage {
        let bg = background::compute_color(&self.background, mode, elapsed_s);
        let fg = self.foreground.get(eyes);
        let (width, height) = fg.dimensions();
        debug_assert_eq!((width, height), self.light.dimensions());

        let mut frame = RgbImage::new(width, height);
        let light = self.light.as_raw();

        // Tint is applied per pixel into locals; only the output buffer is written.
        for (i, (out, src)) in frame
            .chunks_exact_mut(3)
            .zip(fg.as_raw().chunks_exact(4))
            .enumerate()
        {
            let alpha = src[3];
            if alpha == 0 {
                out.copy_from_slice(&bg);
                continue;
            }
            let rgb = [src[0], src[1], src[2]];
            let tinted = match mode {
                Mode::Normal => rgb,
                Mode::Party => tint_party(rgb, bg),
                Mode::Night => tint_night(rgb, light[i], ambient),
            };
            for c in 0..3 {
                out[c] = source_over(tinted[c], bg[c], alpha);
            }
        }
        frame
    }

    #[cfg(test)]
    pub fn blink(&self) -> &BlinkController {
        &self.blink
    }
}

/// Scale each channel by the background color (colorizes the character).
pub fn tint_party(rgb: [u8; 3], bg: [u8; 3]) -> [u8; 3] {
    [0, 1, 2].map(|c| (bg[c] as f64 / 255.0 * rgb[c] as f64) as u8)
}

/// Light the character by the radial mask and the ambient screen brightness.
pub fn tint_night(rgb: [u8; 3], light: u8, ambient: AmbientColor) -> [u8; 3] {
    [0, 1, 2].map(|c| {
        let ambient = (ambient[c] as f64 - NIGHT_FLOOR).max(0.0) + NIGHT_FLOOR;
        (rgb[c] as f64 / 255.0 * light as f64 * ambient / 255.0) as u8
    })
}

/// Source-over of one channel onto an opaque destination, rounded.
#[inline]
pub fn source_over(src: u8, dst: u8, alpha: u8) -> u8 {
    let a = alpha as u32;
    ((src as u32 * a + dst as u32 * (255 - a) + 127) / 255) as u8
}
