//! Shared entry point of the trigon demo binaries.

use std::process::ExitCode;

use trigon_engine::device::{ContextVersion, GpuInit};
use trigon_engine::logging::{init_logging, LoggingConfig};
use trigon_engine::pipeline::{self, SceneConfig};
use trigon_engine::texture::ImageCrateDecoder;
use trigon_engine::window::{self, WindowConfig};

pub mod scenes;

pub const WINDOW_WIDTH: u32 = 800;
pub const WINDOW_HEIGHT: u32 = 600;

/// GL 3.0 class hardware is enough for every scene.
pub const CONTEXT_VERSION: ContextVersion = ContextVersion::Downlevel;

/// Opens the window, runs `scene` until it is closed, and tears everything down.
pub fn launch(scene: SceneConfig) -> ExitCode {
    init_logging(LoggingConfig::default());

    let config = WindowConfig::new(scene.name.clone(), WINDOW_WIDTH, WINDOW_HEIGHT);
    let gpu_init = GpuInit {
        context: CONTEXT_VERSION,
        ..GpuInit::default()
    };

    let mut ctx = match window::open(&config, gpu_init) {
        Ok(ctx) => ctx,
        Err(e) => {
            log::error!("{} setup failed: {e}", e.stage());
            return ExitCode::FAILURE;
        }
    };

    // run_scene logs its own setup failures.
    let result = pipeline::run_scene(&mut ctx, &scene, &ImageCrateDecoder);
    ctx.close();

    match result {
        Ok(report) => {
            log::info!(
                "`{}` finished: {} frames presented, {} skipped, {} failed draws",
                scene.name,
                report.presented,
                report.skipped,
                report.failed_draws
            );
            ExitCode::SUCCESS
        }
        Err(_) => ExitCode::FAILURE,
    }
}
