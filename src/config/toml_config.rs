use crate::config::{validate_stats_job, validate_tile_job, DEFAULT_CONCURRENT_LOADS};
use crate::core::stats::{DEFAULT_BINS, DEFAULT_MAX_TIME};
use crate::core::{StatsJobConfig, TileJobConfig};
use crate::utils::error::{GalleryError, Result};
use crate::utils::validation::Validate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

/// Batch configuration: either job section may be omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryToml {
    pub tile: Option<TileSection>,
    pub stats: Option<StatsSection>,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileSection {
    pub base_dir: String,
    pub dim: Option<u32>,
    pub factor: Option<u32>,
    pub repeat: Option<u32>,
    pub fname: Option<String>,
    pub output_dir: Option<String>,
    pub concurrent_loads: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsSection {
    pub log_path: String,
    pub output_path: Option<String>,
    pub prefix: Option<String>,
    pub max_time: Option<f64>,
    pub bins: Option<usize>,
    pub svg: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub json_logs: Option<bool>,
}

impl GalleryToml {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(GalleryError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content);

        toml::from_str(&processed).map_err(|e| GalleryError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${TILE_ROOT})，未定義的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        static ENV_VAR: OnceLock<Regex> = OnceLock::new();
        let re = ENV_VAR.get_or_init(|| {
            Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("env var pattern is valid")
        });

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn json_logs(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.json_logs)
            .unwrap_or(false)
    }
}

impl Validate for GalleryToml {
    fn validate(&self) -> Result<()> {
        if self.tile.is_none() && self.stats.is_none() {
            return Err(GalleryError::MissingConfigError {
                field: "tile or stats".to_string(),
            });
        }
        if let Some(tile) = &self.tile {
            validate_tile_job(tile)?;
        }
        if let Some(stats) = &self.stats {
            validate_stats_job(stats)?;
        }
        Ok(())
    }
}

impl TileJobConfig for TileSection {
    fn base_dir(&self) -> &str {
        &self.base_dir
    }

    fn dim(&self) -> u32 {
        self.dim.unwrap_or(500)
    }

    fn factor(&self) -> u32 {
        self.factor.unwrap_or(32)
    }

    fn repeat(&self) -> u32 {
        self.repeat.unwrap_or(1)
    }

    fn fname(&self) -> &str {
        self.fname.as_deref().unwrap_or("default_tile_name")
    }

    fn output_dir(&self) -> &str {
        self.output_dir.as_deref().unwrap_or(".")
    }

    fn concurrent_loads(&self) -> usize {
        self.concurrent_loads.unwrap_or(DEFAULT_CONCURRENT_LOADS)
    }
}

impl StatsJobConfig for StatsSection {
    fn log_path(&self) -> &str {
        &self.log_path
    }

    fn output_path(&self) -> &str {
        self.output_path.as_deref().unwrap_or("./log/analysis")
    }

    fn prefix(&self) -> &str {
        self.prefix.as_deref().unwrap_or("")
    }

    fn max_time(&self) -> f64 {
        self.max_time.unwrap_or(DEFAULT_MAX_TIME)
    }

    fn bins(&self) -> usize {
        self.bins.unwrap_or(DEFAULT_BINS)
    }

    fn emit_svg(&self) -> bool {
        self.svg.unwrap_or(false)
    }
}
