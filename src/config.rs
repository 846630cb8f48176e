use crate::errors::{MazeError, MazeResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use validator::Validate;

pub mod range_types;

use range_types::{ExpansionLimit, NoiseScale};

/// Parameters for building one environment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct GenerationConfig {
    #[validate(range(min = 3, max = 2048))]
    pub width: u32,
    #[validate(range(min = 3, max = 2048))]
    pub height: u32,
    /// Absent seed means a fresh random seed per run
    pub seed: Option<u32>,
    pub noise_scale: NoiseScale,
    #[validate(range(min = 1, max = 8))]
    pub noise_octaves: u32,
    /// Minimum number of passable cells the environment must contain
    pub min_nodes: u32,
    pub min_rewards: u32,
    #[validate(range(min = 1, max = 100))]
    pub max_attempts: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            width: 25,
            height: 15,
            seed: None,
            noise_scale: NoiseScale::default(),
            noise_octaves: 3,
            min_nodes: 30,
            min_rewards: 5,
            max_attempts: 5,
        }
    }
}

impl GenerationConfig {
    /// Check the config, mapping validation failures to `InvalidConfiguration`
    pub fn check(&self) -> MazeResult<()> {
        self.validate().map_err(|validation_errors| {
            let error_details = validation_errors
                .field_errors()
                .iter()
                .map(|(field, errors)| {
                    let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
                    format!("{field}: {}", error_msgs.join(", "))
                })
                .collect::<Vec<String>>()
                .join("; ");
            MazeError::invalid_config(error_details)
        })
    }
}

/// Bounds applied to every search run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SearchConfig {
    pub max_expansions: ExpansionLimit,
    pub time_limit_ms: Option<u64>,
}

impl SearchConfig {
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_ms.map(Duration::from_millis)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub generation: GenerationConfig,
    pub search: SearchConfig,
}

pub fn get_config_path() -> Option<PathBuf> {
    dirs::config_dir().and_then(|mut path| {
        path.push("terramaze");
        fs::create_dir_all(&path).ok()?;
        path.push("config.toml");
        Some(path)
    })
}

/// Load the user config, falling back to defaults when it is missing or broken
pub fn load_config() -> AppConfig {
    if let Some(config_path) = get_config_path() {
        if config_path.exists() {
            match load_config_from(&config_path) {
                Ok(config) => return config,
                Err(err) => tracing::warn!(
                    "Ignoring config at {}: {err}",
                    config_path.display()
                ),
            }
        }
    }
    AppConfig::default()
}

pub fn load_config_from<P: AsRef<Path>>(path: P) -> MazeResult<AppConfig> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(MazeError::ConfigFileNotFound {
            path: path.to_path_buf(),
        });
    }

    let contents = fs::read_to_string(path)?;
    let config = toml::from_str::<AppConfig>(&contents)?;
    config
        .generation
        .check()
        .map_err(|err| MazeError::ConfigValidation {
            reason: err.to_string(),
        })?;
    Ok(config)
}

pub fn save_config(config: &AppConfig) -> MazeResult<()> {
    let config_path = get_config_path().ok_or(MazeError::ConfigDirNotFound)?;
    save_config_to(config, config_path)
}

pub fn save_config_to<P: AsRef<Path>>(config: &AppConfig, path: P) -> MazeResult<()> {
    let contents = toml::to_string_pretty(config)?;
    fs::write(path, contents)?;
    Ok(())
}
