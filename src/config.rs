/// TOML configuration with sensible defaults.
/// No config file is required to run — defaults reproduce the stock feed.

use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Output frame rate of the virtual camera.
    pub fps: u32,
    pub camera: CameraConfig,
    pub assets: AssetConfig,
    pub capture: CaptureConfig,
    pub blink: BlinkConfig,
    pub background: BackgroundConfig,
}

/// Where composed frames are written.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Path receiving packed rgb24 frames (FIFO, loopback device or plain file).
    pub output: String,
}

/// Foreground image paths.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    pub open_eyes: String,
    pub closed_eyes: String,
}

/// Screenshot command used by the ambient sampler in night mode.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Program that writes one encoded screenshot (PNG etc.) to stdout.
    pub program: String,
    pub args: Vec<String>,
    pub poll_interval_ms: u64,
}

/// Blink timing.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BlinkConfig {
    pub min_delay_s: f64,
    pub max_delay_s: f64,
    /// Number of frames the closed-eyes image is shown per blink.
    pub closed_frames: u32,
}

/// Solid background colors. Party mode is computed, not configured.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackgroundConfig {
    pub normal: ColorConfig,
    pub night: ColorConfig,
}

/// RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ColorConfig {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fps: 20,
            camera: CameraConfig::default(),
            assets: AssetConfig::default(),
            capture: CaptureConfig::default(),
            blink: BlinkConfig::default(),
            background: BackgroundConfig::default(),
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self { output: "/tmp/ponycam.rgb".into() }
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            open_eyes: "blink-nobg.png".into(),
            closed_eyes: "blink1-nobg.png".into(),
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            // ImageMagick, X11 root window
            program: "import".into(),
            args: vec!["-window".into(), "root".into(), "png:-".into()],
            poll_interval_ms: 1000,
        }
    }
}

impl Default for BlinkConfig {
    fn default() -> Self {
        Self {
            min_delay_s: 1.0,
            max_delay_s: 10.0,
            closed_frames: 2,
        }
    }
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            normal: ColorConfig { r: 255, g: 255, b: 255 }, // white
            night: ColorConfig { r: 25, g: 25, b: 25 },     // dark gray
        }
    }
}

impl Config {
    /// Load config from the default config file path, or return defaults if not found.
    pub fn load() -> Self {
        let config_path = config_file_path();
        let config: Self = match std::fs::read_to_string(&config_path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    log::info!("Loaded config from {config_path}");
                    config
                }
                Err(e) => {
                    log::warn!("Failed to parse config file {config_path}: {e}. Using defaults.");
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("No config file found at {config_path}. Using defaults.");
                Self::default()
            }
        };
        config.validated()
    }

    /// Replace values the pipeline cannot run with by their defaults.
    pub fn validated(mut self) -> Self {
        if self.fps == 0 {
            log::warn!("fps = 0 is not usable, falling back to 20");
            self.fps = Config::default().fps;
        }
        let b = &self.blink;
        let finite = b.min_delay_s.is_finite() && b.max_delay_s.is_finite();
        if !(finite && b.min_delay_s > 0.0 && b.max_delay_s > b.min_delay_s) {
            log::warn!(
                "Blink delay range [{}, {}) is invalid, falling back to [1, 10)",
                b.min_delay_s,
                b.max_delay_s
            );
            let d = BlinkConfig::default();
            self.blink.min_delay_s = d.min_delay_s;
            self.blink.max_delay_s = d.max_delay_s;
        }
        if self.capture.poll_interval_ms == 0 {
            log::warn!("capture.poll_interval_ms = 0 would spin, falling back to 1000");
            self.capture.poll_interval_ms = CaptureConfig::default().poll_interval_ms;
        }
        self
    }
}

fn config_file_path() -> String {
    if let Ok(path) = std::env::var("PONYCAM_CONFIG") {
        path
    } else if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        format!("{xdg}/ponycam/config.toml")
    } else {
        "ponycam.toml".into()
    }
}
