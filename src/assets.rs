/// Foreground images: decoded once at startup and fitted to the canvas.
///
/// Fit: shrink both sides by 100px (bicubic), then take the canvas-sized
/// window whose top-left sits at (-106, 50) in the shrunk image. Parts of
/// the window outside the image are transparent.

use crate::blink::Eyes;
use crate::error::Error;
use image::imageops::{self, FilterType};
use image::RgbaImage;
use std::path::Path;

/// Pixels removed from each side length before cropping.
const SHRINK: u32 = 100;
/// Crop window origin in shrunk-image coordinates.
const CROP_X: i64 = -106;
const CROP_Y: i64 = 50;

/// The two fitted foreground rasters.
pub struct Foreground {
    open: RgbaImage,
    closed: RgbaImage,
}

impl Foreground {
    /// Load and fit both images. Any failure is fatal to the caller.
    pub fn load(
        open_path: impl AsRef<Path>,
        closed_path: impl AsRef<Path>,
        width: u32,
        height: u32,
    ) -> Result<Self, Error> {
        let open = load_fitted(open_path.as_ref(), width, height)?;
        let closed = load_fitted(closed_path.as_ref(), width, height)?;
        Ok(Self { open, closed })
    }

    #[cfg(test)]
    pub fn from_images(open: RgbaImage, closed: RgbaImage) -> Self {
        Self { open, closed }
    }

    pub fn get(&self, eyes: Eyes) -> &RgbaImage {
        match eyes {
            Eyes::Open => &self.open,
            Eyes::Closed => &self.closed,
        }
    }
}

fn load_fitted(path: &Path, width: u32, height: u32) -> Result<RgbaImage, Error> {
    let decoded = image::open(path)
        .map_err(|source| Error::AssetLoad {
            path: path.to_path_buf(),
            source,
        })?
        .into_rgba8();

    let (w, h) = decoded.dimensions();
    if w <= SHRINK || h <= SHRINK {
        return Err(Error::AssetTooSmall {
            path: path.to_path_buf(),
            width: w,
            height: h,
            min: SHRINK,
        });
    }
    log::debug!("Loaded {} ({w}x{h})", path.display());
    Ok(fit(&decoded, width, height))
}

/// Shrink and crop `src` onto a transparent `width` x `height` canvas.
///
/// The resize filters premultiplied pixels so transparent neighbours do not
/// darken the colors along the character's edges.
pub fn fit(src: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    let (w, h) = src.dimensions();
    let mut premultiplied = src.clone();
    premultiply(&mut premultiplied);
    let mut shrunk = imageops::resize(
        &premultiplied,
        w.saturating_sub(SHRINK).max(1),
        h.saturating_sub(SHRINK).max(1),
        FilterType::CatmullRom,
    );
    unpremultiply(&mut shrunk);
    let mut canvas = RgbaImage::new(width, height);
    // copying (not blending) keeps the source alpha untouched
    imageops::replace(&mut canvas, &shrunk, -CROP_X, -CROP_Y);
    canvas
}

fn premultiply(img: &mut RgbaImage) {
    for px in img.pixels_mut() {
        let a = px[3] as u32;
        for c in 0..3 {
            px[c] = ((px[c] as u32 * a + 127) / 255) as u8;
        }
    }
}

fn unpremultiply(img: &mut RgbaImage) {
    for px in img.pixels_mut() {
        let a = px[3] as u32;
        for c in 0..3 {
            px[c] = match a {
                0 => 0,
                // Catmull-Rom can overshoot a channel past its alpha
                _ => ((px[c] as u32 * 255 + a / 2) / a).min(255) as u8,
            };
        }
    }
}
