/// Background engine: maps mode + time since the last blink to an RGB color.
///
/// Modes:
///   Normal → white, solid
///   Night  → dark gray, solid
///   Party  → hue cycling with a sharp-attack pulse, twice per second

use crate::config::BackgroundConfig;
use crate::mode::Mode;

/// Party brightness never drops below this, so the frame is never black.
const PARTY_MIN_BRIGHTNESS: u8 = 50;

/// Compute the background color for `mode`. `elapsed_s` is the time since
/// the last blink and only matters in party mode.
pub fn compute_color(config: &BackgroundConfig, mode: Mode, elapsed_s: f64) -> [u8; 3] {
    match mode {
        Mode::Normal => [config.normal.r, config.normal.g, config.normal.b],
        Mode::Night => [config.night.r, config.night.g, config.night.b],
        Mode::Party => party_color(elapsed_s),
    }
}

/// Pulse shape over one period. `u` is the fractional part of `2t`: an
/// exponential rise from 0.01 to 1. The linear fall for u >= 1 is the tail
/// of the shape and is not reached once `u` is a fractional part.
pub fn pulse(t: f64) -> f64 {
    let u = (2.0 * t).fract();
    if u < 1.0 {
        100f64.powf(u) / 100.0
    } else {
        2.0 - u
    }
}

fn party_color(elapsed_s: f64) -> [u8; 3] {
    let brightness = ((255.0 * pulse(elapsed_s)) as u8).max(PARTY_MIN_BRIGHTNESS);
    // Elapsed seconds are the hue fraction as-is; the sextant index wraps.
    let (r, g, b) = hsv_to_rgb(elapsed_s, 1.0, brightness as f64);
    [r as u8, g as u8, b as u8]
}

/// HSV → RGB with `v` in output units. `h` is a fraction of a full turn and
/// may exceed 1; whole turns are discarded.
pub fn hsv_to_rgb(h: f64, s: f64, v: f64) -> (f64, f64, f64) {
    if s == 0.0 {
        return (v, v, v);
    }
    let sector = (h * 6.0).floor();
    let f = h * 6.0 - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    match (sector as i64).rem_euclid(6) {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_config() -> BackgroundConfig {
        BackgroundConfig::default()
    }

    #[test]
    fn normal_is_solid_white() {
        let cfg = default_config();
        assert_eq!(compute_color(&cfg, Mode::Normal, 0.0), [255, 255, 255]);
        // Same color regardless of time
        assert_eq!(compute_color(&cfg, Mode::Normal, 3.7), [255, 255, 255]);
    }

    #[test]
    fn night_is_solid_dark_gray() {
        let cfg = default_config();
        assert_eq!(compute_color(&cfg, Mode::Night, 0.0), [25, 25, 25]);
        assert_eq!(compute_color(&cfg, Mode::Night, 9.1), [25, 25, 25]);
    }

    #[test]
    fn party_starts_red_at_brightness_floor() {
        // u = 0 → pulse 0.01 → 2.55 → 2 → floored to 50; hue 0 → red
        assert!((pulse(0.0) - 0.01).abs() < 1e-12);
        assert_eq!(compute_color(&default_config(), Mode::Party, 0.0), [50, 0, 0]);
    }

    #[test]
    fn party_pulse_peaks_just_before_each_half_second() {
        assert!(pulse(0.499) > 0.98);
        assert!(pulse(0.5) < 0.011);
        assert!(pulse(0.25) > pulse(0.1));
        // period is half a second of elapsed time
        assert!((pulse(0.1) - pulse(1.1)).abs() < 1e-9);
    }

    #[test]
    fn party_never_darker_than_floor() {
        let cfg = default_config();
        for i in 0..2000 {
            let t = i as f64 * 0.0037;
            let [r, g, b] = compute_color(&cfg, Mode::Party, t);
            assert!(r.max(g).max(b) >= PARTY_MIN_BRIGHTNESS, "t={t}");
        }
    }

    #[test]
    fn hue_fraction_wraps_every_whole_turn() {
        let a = hsv_to_rgb(0.3, 1.0, 200.0);
        let b = hsv_to_rgb(2.3, 1.0, 200.0);
        assert!((a.0 - b.0).abs() < 1e-9);
        assert!((a.1 - b.1).abs() < 1e-9);
        assert!((a.2 - b.2).abs() < 1e-9);
    }

    #[test]
    fn hsv_primaries() {
        assert_eq!(hsv_to_rgb(0.0, 1.0, 255.0), (255.0, 0.0, 0.0));
        assert_eq!(hsv_to_rgb(1.0 / 3.0, 1.0, 255.0).1, 255.0);
        assert_eq!(hsv_to_rgb(0.5, 0.0, 80.0), (80.0, 80.0, 80.0));
    }
}
