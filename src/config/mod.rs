pub mod cli;
pub mod toml_config;

use crate::core::stats::{DEFAULT_BINS, DEFAULT_MAX_TIME};
use crate::core::{StatsJobConfig, TileJobConfig, TileLayout};
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_name_fragment, validate_path, validate_positive_number, validate_range, Validate,
};
#[cfg(feature = "cli")]
use clap::Parser;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONCURRENT_LOADS: usize = 8;

/// Stitch a pyramid level into a single preview image.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(Parser))]
#[cfg_attr(feature = "cli", command(name = "create_tile"))]
#[cfg_attr(
    feature = "cli",
    command(about = "Create a preview image from a tile pyramid for gallery navigation")
)]
pub struct TileConfig {
    /// Pyramid root (contains `<factor>/<row>/<col>.jpg`)
    pub base_dir: String,

    /// Output image dimension in pixels
    #[cfg_attr(feature = "cli", arg(long, default_value_t = 500))]
    pub dim: u32,

    /// Zoom factor level (tiles per row and column)
    #[cfg_attr(feature = "cli", arg(long, default_value_t = 32))]
    pub factor: u32,

    /// How many times the grid is repeated along each axis
    #[cfg_attr(feature = "cli", arg(long, default_value_t = 1))]
    pub repeat: u32,

    /// Output file name, without the .jpg extension
    #[cfg_attr(feature = "cli", arg(long, default_value = "default_tile_name"))]
    pub fname: String,

    /// Directory the image is written to
    #[cfg_attr(feature = "cli", arg(long, default_value = "."))]
    pub output_dir: String,

    /// Maximum number of tiles decoded at once
    #[cfg_attr(feature = "cli", arg(long, default_value_t = DEFAULT_CONCURRENT_LOADS))]
    pub concurrent_loads: usize,

    #[cfg_attr(feature = "cli", arg(short, long, help = "Enable verbose output"))]
    #[serde(default)]
    pub verbose: bool,

    #[cfg_attr(feature = "cli", arg(long, help = "Log CPU and memory usage per stage"))]
    #[serde(default)]
    pub monitor: bool,
}

impl TileJobConfig for TileConfig {
    fn base_dir(&self) -> &str {
        &self.base_dir
    }

    fn dim(&self) -> u32 {
        self.dim
    }

    fn factor(&self) -> u32 {
        self.factor
    }

    fn repeat(&self) -> u32 {
        self.repeat
    }

    fn fname(&self) -> &str {
        &self.fname
    }

    fn output_dir(&self) -> &str {
        &self.output_dir
    }

    fn concurrent_loads(&self) -> usize {
        self.concurrent_loads
    }
}

impl Validate for TileConfig {
    fn validate(&self) -> Result<()> {
        validate_tile_job(self)
    }
}

/// Render prefetch and timing charts from a query log.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(Parser))]
#[cfg_attr(feature = "cli", command(name = "analyse_query_stats"))]
#[cfg_attr(feature = "cli", command(about = "Render diagnostic charts from a query stats log"))]
pub struct StatsConfig {
    /// JSON log of per-query measurements
    pub log_path: String,

    #[cfg_attr(
        feature = "cli",
        arg(long = "output_path", alias = "output-path", default_value = "./log/analysis")
    )]
    pub output_path: String,

    /// Output file name prefix
    #[cfg_attr(feature = "cli", arg(long, default_value = ""))]
    pub prefix: String,

    /// Timings above this many milliseconds fall into the last bin
    #[cfg_attr(feature = "cli", arg(long, default_value_t = DEFAULT_MAX_TIME))]
    pub max_time: f64,

    /// Number of histogram bins
    #[cfg_attr(feature = "cli", arg(long, default_value_t = DEFAULT_BINS))]
    pub bins: usize,

    /// Also write the SVG source of each chart
    #[cfg_attr(feature = "cli", arg(long))]
    #[serde(default)]
    pub svg: bool,

    #[cfg_attr(feature = "cli", arg(short, long, help = "Enable verbose output"))]
    #[serde(default)]
    pub verbose: bool,

    #[cfg_attr(feature = "cli", arg(long, help = "Log CPU and memory usage per stage"))]
    #[serde(default)]
    pub monitor: bool,
}

impl StatsJobConfig for StatsConfig {
    fn log_path(&self) -> &str {
        &self.log_path
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn prefix(&self) -> &str {
        &self.prefix
    }

    fn max_time(&self) -> f64 {
        self.max_time
    }

    fn bins(&self) -> usize {
        self.bins
    }

    fn emit_svg(&self) -> bool {
        self.svg
    }
}

impl Validate for StatsConfig {
    fn validate(&self) -> Result<()> {
        validate_stats_job(self)
    }
}

/// Shared checks for any tile job configuration source.
pub fn validate_tile_job<C: TileJobConfig + ?Sized>(config: &C) -> Result<()> {
    validate_path("base_dir", config.base_dir())?;
    validate_path("output_dir", config.output_dir())?;
    TileLayout::new(config.dim(), config.factor(), config.repeat())?;
    validate_positive_number("concurrent_loads", config.concurrent_loads(), 1)?;
    validate_path("fname", config.fname())?;
    Ok(())
}

pub fn validate_stats_job<C: StatsJobConfig + ?Sized>(config: &C) -> Result<()> {
    validate_path("log_path", config.log_path())?;
    validate_path("output_path", config.output_path())?;
    validate_name_fragment("prefix", config.prefix())?;
    validate_range("max_time", config.max_time(), f64::MIN_POSITIVE, f64::MAX)?;
    validate_positive_number("bins", config.bins(), 1)?;
    Ok(())
}
