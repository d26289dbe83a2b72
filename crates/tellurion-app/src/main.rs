//! The binary entry point for Tellurion.

use tracing::{error, info};
use winit::event_loop::EventLoop;

use tellurion_app::platform::PlatformDirs;
use tellurion_app::window::App;
use tellurion_config::{Config, parse_args};

fn main() {
    let args = parse_args();

    let dirs = match PlatformDirs::resolve_and_create() {
        Ok(dirs) => dirs,
        Err(err) => {
            eprintln!("Failed to initialize platform directories: {err}");
            std::process::exit(1);
        }
    };

    // CLI may point at an alternate config directory.
    let config_dir = args.config.clone().unwrap_or_else(|| dirs.config_dir.clone());
    let mut config = match Config::load_or_create(&config_dir) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Failed to load config from {}: {err}", config_dir.display());
            std::process::exit(1);
        }
    };
    config.apply_cli_overrides(&args);

    tellurion_log::init_logging(Some(&dirs.log_dir), cfg!(debug_assertions), Some(&config));
    info!("Tellurion starting (config: {})", config_dir.display());

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(err) => {
            error!("Failed to create event loop: {err}");
            std::process::exit(1);
        }
    };

    let mut app = App::new(config, dirs);
    if let Err(err) = event_loop.run_app(&mut app) {
        error!("Event loop terminated with error: {err}");
        std::process::exit(1);
    }
}
