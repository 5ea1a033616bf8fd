/// Error type shared by startup, the frame loop and the ambient sampler.
///
/// Startup and frame-loop errors are fatal (logged by `main`, exit 1).
/// Capture errors only ever reach the sampler, which logs and retries.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A foreground image could not be opened or decoded.
    #[error("failed to load asset {}: {source}", .path.display())]
    AssetLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// A foreground image is too small to survive the fixed shrink.
    #[error("asset {} is {width}x{height}, both sides must exceed {min}px", .path.display())]
    AssetTooSmall {
        path: PathBuf,
        width: u32,
        height: u32,
        min: u32,
    },

    /// The camera output could not be opened.
    #[error("failed to open virtual camera {device}: {source}")]
    CameraOpen {
        device: String,
        #[source]
        source: std::io::Error,
    },

    /// Writing a frame to the camera output failed.
    #[error("failed to write frame to {device}: {source}")]
    CameraWrite {
        device: String,
        #[source]
        source: std::io::Error,
    },

    /// A frame did not match the camera's fixed dimensions.
    #[error("frame is {width}x{height}, camera expects {expected_width}x{expected_height}")]
    FrameSize {
        width: u32,
        height: u32,
        expected_width: u32,
        expected_height: u32,
    },

    /// The screenshot command could not run or exited unsuccessfully.
    #[error("screen capture failed: {0}")]
    Capture(String),

    /// The screenshot command produced bytes that are not a decodable image.
    #[error("screen capture returned an undecodable image: {0}")]
    CaptureDecode(#[from] image::ImageError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failing_resource() {
        let err = Error::CameraOpen {
            device: "/dev/video9".into(),
            source: std::io::Error::other("denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/dev/video9"));
        assert!(msg.contains("denied"));

        let err = Error::AssetTooSmall {
            path: PathBuf::from("tiny.png"),
            width: 50,
            height: 900,
            min: 100,
        };
        assert!(err.to_string().contains("tiny.png is 50x900"));
    }

    #[test]
    fn frame_size_reports_both_shapes() {
        let err = Error::FrameSize {
            width: 640,
            height: 480,
            expected_width: 1280,
            expected_height: 720,
        };
        assert_eq!(err.to_string(), "frame is 640x480, camera expects 1280x720");
    }
}
