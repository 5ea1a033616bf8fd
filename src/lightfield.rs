/// Precomputed radial light falloff used to light the character in night mode.
///
/// value(i, j) = 255 / (1 + ((i - cy) / 400)^2 + ((j - cx) / 400)^2)^2
///
/// Brightest (255) at the frame center, non-increasing with squared distance.
/// Alpha is implicitly 255 everywhere so only the luma channel is stored.

use image::{GrayImage, Luma};

/// Falloff radius in pixels.
const FALLOFF: f64 = 400.0;

/// Immutable per-pixel brightness mask.
pub struct LightField {
    mask: GrayImage,
}

impl LightField {
    /// Build the mask for a `width` x `height` frame. O(width * height).
    pub fn generate(width: u32, height: u32) -> Self {
        let cy = height as f64 / 2.0;
        let cx = width as f64 / 2.0;
        let mask = GrayImage::from_fn(width, height, |x, y| {
            let dy = (y as f64 - cy) / FALLOFF;
            let dx = (x as f64 - cx) / FALLOFF;
            let falloff = 1.0 + dy * dy + dx * dx;
            // float → u8 truncates, and 255/x for x >= 1 never leaves [0, 255]
            Luma([(255.0 / (falloff * falloff)) as u8])
        });
        Self { mask }
    }

    /// Brightness at column `x`, row `y`.
    #[cfg(test)]
    pub fn at(&self, x: u32, y: u32) -> u8 {
        self.mask.get_pixel(x, y).0[0]
    }

    /// Row-major brightness values, one per pixel.
    pub fn as_raw(&self) -> &[u8] {
        self.mask.as_raw()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.mask.dimensions()
    }
}
