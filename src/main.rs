mod ambient;
mod assets;
mod background;
mod blink;
mod camera;
mod capture;
mod compose;
mod config;
mod driver;
mod error;
mod lightfield;
mod mode;

use crate::assets::Foreground;
use crate::blink::BlinkController;
use crate::camera::{CameraSink, RawVideoSink};
use crate::capture::CommandCapture;
use crate::compose::FrameComposer;
use crate::driver::Driver;
use crate::error::Error;
use crate::lightfield::LightField;
use crate::mode::{InputEnd, Mode};

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use tokio::time::Duration;

/// Output raster size of the virtual camera.
const FRAME_WIDTH: u32 = 1280;
const FRAME_HEIGHT: u32 = 720;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    log::info!("ponycam v{} starting...", env!("CARGO_PKG_VERSION"));

    let cfg = config::Config::load();

    // The only state shared between the three loops.
    let (mode_tx, mode_rx) = watch::channel(Mode::default());
    let (ambient_tx, ambient_rx) = watch::channel([0u8; 3]);

    // Command reader first, so commands typed during startup still apply.
    let commands = tokio::spawn(mode::run(
        tokio::io::BufReader::new(tokio::io::stdin()),
        mode_tx,
    ));

    // Ambient sampler: idles unless the mode is night.
    let capture = Arc::new(CommandCapture::new(&cfg.capture));
    let poll_interval = Duration::from_millis(cfg.capture.poll_interval_ms);
    tokio::spawn(ambient::run(capture, poll_interval, mode_rx.clone(), ambient_tx));

    // Frame loop: startup work and the loop itself run on a blocking thread.
    let frame_loop = tokio::task::spawn_blocking(move || -> Result<(), Error> {
        let driver = build_driver(&cfg, mode_rx, ambient_rx)?;
        driver.run()
    });

    tokio::select! {
        end = commands => {
            match end {
                Ok(InputEnd::Eof) => log::info!("Command input closed, shutting down"),
                Ok(InputEnd::Error(e)) => log::info!("Command input failed ({e}), shutting down"),
                Err(e) => log::error!("Command reader panicked: {e}"),
            }
            std::process::exit(0);
        }
        result = frame_loop => {
            match result {
                Ok(Ok(())) => log::error!("Frame loop stopped unexpectedly"),
                Ok(Err(e)) => log::error!("{e}"),
                Err(e) => log::error!("Frame loop panicked: {e}"),
            }
            std::process::exit(1);
        }
    }
}

/// Build everything the frame loop needs. Any failure here is fatal.
fn build_driver(
    cfg: &config::Config,
    mode_rx: watch::Receiver<Mode>,
    ambient_rx: watch::Receiver<[u8; 3]>,
) -> Result<Driver<RawVideoSink>, Error> {
    let sink = RawVideoSink::open(&cfg.camera.output, FRAME_WIDTH, FRAME_HEIGHT, cfg.fps)?;

    log::info!("Generating light matrix...");
    let started = Instant::now();
    let light = Arc::new(LightField::generate(FRAME_WIDTH, FRAME_HEIGHT));
    log::info!("Light matrix generated ({} ms)", started.elapsed().as_millis());

    let foreground = Foreground::load(
        &cfg.assets.open_eyes,
        &cfg.assets.closed_eyes,
        FRAME_WIDTH,
        FRAME_HEIGHT,
    )?;

    let blink = BlinkController::new(&cfg.blink, fastrand::Rng::new(), Instant::now());
    let composer = FrameComposer::new(cfg.background.clone(), foreground, light, blink);

    log::info!(
        "Using virtual camera: {} ({}x{} @ {} fps)",
        sink.device(),
        FRAME_WIDTH,
        FRAME_HEIGHT,
        cfg.fps
    );
    let frame_interval = Duration::from_secs_f64(1.0 / cfg.fps as f64);
    Ok(Driver::new(composer, sink, mode_rx, ambient_rx, frame_interval))
}
