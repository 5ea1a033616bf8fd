/// Screen capture: produce one still of the visible display on demand.
///
/// `CommandCapture` runs an external screenshot tool that writes an encoded
/// image to stdout (`import -window root png:-`, `grim -t png -`, ...) and
/// decodes it with the `image` crate. Blocking — call from `spawn_blocking`.

use crate::config::CaptureConfig;
use crate::error::Error;
use image::RgbImage;

/// Source of full-display RGB stills.
pub trait ScreenCapture: Send + Sync + 'static {
    fn capture(&self) -> Result<RgbImage, Error>;
}

/// Screenshot via an external command.
pub struct CommandCapture {
    program: String,
    args: Vec<String>,
}

impl CommandCapture {
    pub fn new(config: &CaptureConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
        }
    }
}

impl ScreenCapture for CommandCapture {
    fn capture(&self) -> Result<RgbImage, Error> {
        let output = std::process::Command::new(&self.program)
            .args(&self.args)
            .output()
            .map_err(|e| Error::Capture(format!("{}: {e}", self.program)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Capture(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        let still = image::load_from_memory(&output.stdout)?;
        Ok(still.into_rgb8())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capture_with(program: &str, args: &[&str]) -> CommandCapture {
        CommandCapture::new(&CaptureConfig {
            program: program.into(),
            args: args.iter().map(|s| s.to_string()).collect(),
            poll_interval_ms: 1000,
        })
    }

    #[test]
    fn missing_program_is_a_capture_error() {
        let cap = capture_with("ponycam-no-such-screenshot-tool", &[]);
        let err = cap.capture().unwrap_err();
        assert!(matches!(err, Error::Capture(_)));
        assert!(err.to_string().contains("ponycam-no-such-screenshot-tool"));
    }

    #[test]
    fn decodes_png_from_stdout() {
        let path = std::env::temp_dir().join("ponycam_test_capture.png");
        let still = RgbImage::from_pixel(4, 3, image::Rgb([10, 20, 30]));
        still.save(&path).unwrap();

        let cap = capture_with("cat", &[path.to_str().unwrap()]);
        let got = cap.capture().unwrap();
        assert_eq!(got.dimensions(), (4, 3));
        assert_eq!(got.get_pixel(2, 1).0, [10, 20, 30]);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn garbage_output_is_a_decode_error() {
        let cap = capture_with("echo", &["not an image"]);
        assert!(matches!(cap.capture().unwrap_err(), Error::CaptureDecode(_)));
    }

    #[test]
    fn failing_command_reports_status() {
        let cap = capture_with("false", &[]);
        let err = cap.capture().unwrap_err();
        assert!(err.to_string().contains("exited with"));
    }
}
