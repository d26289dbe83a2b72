//! Configuration system for Tellurion.
//!
//! Provides runtime-configurable settings that persist to disk as RON files.
//! Supports CLI overrides via clap and forward/backward compatible
//! serialization.

mod cli;
mod config;
mod error;

pub use cli::{CliArgs, parse_args};
pub use config::{
    CameraConfig, Config, DebugConfig, RenderConfig, SkyConfig, TextureConfig, WindowConfig,
};
pub use error::ConfigError;
