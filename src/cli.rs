use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::LevelFilter;
use whitted::render::{EYE_Z, MAX_DEPTH, SCREEN_HEIGHT, SCREEN_WIDTH};
use whitted::RenderConfig;

#[derive(Debug, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "whitted")]
#[command(about = "Renders one frame with a Whitted-style ray tracer")]
pub struct Args {
    /// JSON scene description, the built-in two-sphere scene when omitted
    #[arg(short, long)]
    pub scene: Option<PathBuf>,

    /// Image width in pixels
    #[arg(long, default_value_t = SCREEN_WIDTH)]
    pub width: u32,

    /// Image height in pixels
    #[arg(long, default_value_t = SCREEN_HEIGHT)]
    pub height: u32,

    /// Mirror bounces followed after the primary hit
    #[arg(long, default_value_t = MAX_DEPTH)]
    pub max_depth: u32,

    /// Depth of the plane primary rays start from
    #[arg(long, default_value_t = EYE_Z, allow_hyphen_values = true)]
    pub eye_z: f64,

    /// Write the final image to this PNG file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Skip the 3x3 box blur
    #[arg(long)]
    pub no_blur: bool,

    /// Do not open a window
    #[arg(long)]
    pub headless: bool,

    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,
}

impl Args {
    pub fn render_config(&self) -> RenderConfig {
        RenderConfig {
            width: self.width,
            height: self.height,
            max_depth: self.max_depth,
            eye_z: self.eye_z,
            ..RenderConfig::default()
        }
    }
}
