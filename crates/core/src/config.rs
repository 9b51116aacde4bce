use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Effective configuration for a dealscope run: analytics thresholds plus
/// host-side logging. Layering order is defaults, then an optional TOML
/// file, then `DEALSCOPE_*` environment overrides.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub analytics: AnalyticsSettings,
    pub logging: LoggingConfig,
}

/// Tunable business thresholds consumed by the engine. The engine takes
/// these by value and never reads ambient state, so two concurrent runs with
/// different settings cannot interfere.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsSettings {
    /// Numeric probability at or above which an opportunity counts as "hot".
    pub hot_probability: u32,
    /// Entry cap for loss-reason and performer rankings.
    pub ranking_size: usize,
    /// Stage labels treated as terminal won.
    pub won_stages: Vec<String>,
    /// Stage labels treated as terminal lost.
    pub lost_stages: Vec<String>,
    /// Canonical pipeline order used when sorting stage filter values;
    /// stages not listed follow in first-seen order.
    pub stage_order: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AnalyticsSettings {
    fn default() -> Self {
        Self {
            hot_probability: 75,
            ranking_size: 10,
            won_stages: vec!["Closed Won".to_string(), "Closed Won TR".to_string()],
            lost_stages: vec!["Closed Lost".to_string()],
            stage_order: vec![
                "Prospecting".to_string(),
                "Qualification".to_string(),
                "Proposal".to_string(),
                "Negotiation".to_string(),
                "Closed Won".to_string(),
                "Closed Won TR".to_string(),
                "Closed Lost".to_string(),
            ],
        }
    }
}

impl AnalyticsSettings {
    pub fn is_won(&self, stage: &str) -> bool {
        self.won_stages.iter().any(|label| label == stage)
    }

    pub fn is_lost(&self, stage: &str) -> bool {
        self.lost_stages.iter().any(|label| label == stage)
    }

    /// Terminal stages are excluded from open-pipeline metrics and from
    /// coverage-gap candidates.
    pub fn is_terminal(&self, stage: &str) -> bool {
        self.is_won(stage) || self.is_lost(stage)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            analytics: AnalyticsSettings::default(),
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    analytics: Option<AnalyticsPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct AnalyticsPatch {
    hot_probability: Option<u32>,
    ranking_size: Option<usize>,
    won_stages: Option<Vec<String>>,
    lost_stages: Option<Vec<String>>,
    stage_order: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from("dealscope.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(analytics) = patch.analytics {
            if let Some(hot_probability) = analytics.hot_probability {
                self.analytics.hot_probability = hot_probability;
            }
            if let Some(ranking_size) = analytics.ranking_size {
                self.analytics.ranking_size = ranking_size;
            }
            if let Some(won_stages) = analytics.won_stages {
                self.analytics.won_stages = won_stages;
            }
            if let Some(lost_stages) = analytics.lost_stages {
                self.analytics.lost_stages = lost_stages;
            }
            if let Some(stage_order) = analytics.stage_order {
                self.analytics.stage_order = stage_order;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = non_empty_env("DEALSCOPE_HOT_PROBABILITY") {
            self.analytics.hot_probability =
                value.parse().map_err(|_| ConfigError::InvalidEnvOverride {
                    key: "DEALSCOPE_HOT_PROBABILITY".to_string(),
                    value,
                })?;
        }
        if let Some(value) = non_empty_env("DEALSCOPE_RANKING_SIZE") {
            self.analytics.ranking_size =
                value.parse().map_err(|_| ConfigError::InvalidEnvOverride {
                    key: "DEALSCOPE_RANKING_SIZE".to_string(),
                    value,
                })?;
        }
        if let Some(value) = non_empty_env("DEALSCOPE_WON_STAGES") {
            self.analytics.won_stages = split_labels(&value);
        }
        if let Some(value) = non_empty_env("DEALSCOPE_LOST_STAGES") {
            self.analytics.lost_stages = split_labels(&value);
        }
        if let Some(value) = non_empty_env("DEALSCOPE_STAGE_ORDER") {
            self.analytics.stage_order = split_labels(&value);
        }
        if let Some(value) = non_empty_env("DEALSCOPE_LOG_LEVEL") {
            self.logging.level = value;
        }
        if let Some(value) = non_empty_env("DEALSCOPE_LOG_FORMAT") {
            self.logging.format = value.parse()?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.analytics.hot_probability > 100 {
            return Err(ConfigError::Validation(format!(
                "hot_probability must be at most 100, got {}",
                self.analytics.hot_probability
            )));
        }
        if self.analytics.ranking_size == 0 {
            return Err(ConfigError::Validation("ranking_size must be at least 1".to_string()));
        }
        if self.analytics.won_stages.is_empty() || self.analytics.lost_stages.is_empty() {
            return Err(ConfigError::Validation(
                "won_stages and lost_stages must each name at least one label".to_string(),
            ));
        }
        Ok(())
    }
}

fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Some(path) = non_empty_env("DEALSCOPE_CONFIG") {
        return Some(PathBuf::from(path));
    }
    let default = PathBuf::from("dealscope.toml");
    default.exists().then_some(default)
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;
    toml::from_str(&raw)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key).ok().map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

fn split_labels(raw: &str) -> Vec<String> {
    raw.split(',').map(str::trim).filter(|label| !label.is_empty()).map(str::to_string).collect()
}
