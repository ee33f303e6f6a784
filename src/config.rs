//! Analysis configuration.
//!
//! Loaded from a TOML file (`standings.toml` by default). Every key is
//! optional; an empty file yields the defaults below. A handful of values
//! can be overridden from the environment (a `.env` file is honoured):
//!
//! | variable                       | key                  |
//! |--------------------------------|----------------------|
//! | `STANDINGS_MIN_SEASONS`        | `min_seasons`        |
//! | `STANDINGS_NOTABLE_MULTIPLIER` | `notable_multiplier` |
//! | `STANDINGS_LOG_LEVEL`          | `logging.level`      |

use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::analysis::top_tier::TOP_TIER_SIZE;
use crate::analysis::trend::{DeltaDirection, MultiplierSource, TrendAnalyzer};
use crate::logging::LogLevel;
use crate::model::SeasonKey;
use crate::seasons::SeasonOrder;

pub const DEFAULT_CONFIG_PATH: &str = "standings.toml";

pub const ENV_MIN_SEASONS: &str = "STANDINGS_MIN_SEASONS";
pub const ENV_NOTABLE_MULTIPLIER: &str = "STANDINGS_NOTABLE_MULTIPLIER";
pub const ENV_LOG_LEVEL: &str = "STANDINGS_LOG_LEVEL";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    Io { path: PathBuf, source: std::io::Error },
    /// The file is not valid TOML or has a wrongly typed key.
    Parse(toml::de::Error),
    /// A value parsed but is out of range.
    Invalid { field: &'static str, message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "Cannot read config {}: {}", path.display(), source)
            }
            ConfigError::Parse(e) => write!(f, "Config parse error: {}", e),
            ConfigError::Invalid { field, message } => {
                write!(f, "Invalid config value for {}: {}", field, message)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Invalid { .. } => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

fn invalid(field: &'static str, message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        message: message.into(),
    }
}

// ---------------------------------------------------------------------------
// Config types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MultiplierMode {
    /// Use `notable_multiplier`.
    Fixed,
    /// Use the CV band of the team's own deltas.
    Adaptive,
}

/// How the per-team query orders, signs and flags deltas.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TrendConfig {
    pub order: SeasonOrder,
    pub direction: DeltaDirection,
    pub multiplier: MultiplierMode,
}

impl Default for TrendConfig {
    fn default() -> Self {
        TrendConfig {
            order: SeasonOrder::Descending,
            direction: DeltaDirection::LaterMinusEarlier,
            multiplier: MultiplierMode::Fixed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub file: Option<String>,
    pub timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: LogLevel::Info,
            file: None,
            timestamps: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Minimum rows a team needs to enter the pool analysis.
    pub min_seasons: usize,
    /// Fixed multiplier for per-team notable-change detection.
    pub notable_multiplier: f64,
    pub top_tier_size: u32,
    /// Drop seasons older than this key before analysing.
    pub first_season: Option<String>,
    pub trend: TrendConfig,
    pub logging: LoggingConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            min_seasons: 30,
            notable_multiplier: 2.5,
            top_tier_size: TOP_TIER_SIZE,
            first_season: None,
            trend: TrendConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AnalysisConfig {
    /// Parses and validates TOML text. Environment overrides are not applied.
    pub fn from_toml_str(text: &str) -> Result<AnalysisConfig, ConfigError> {
        let config: AnalysisConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_seasons == 0 {
            return Err(invalid("min_seasons", "must be a positive integer"));
        }
        if !(self.notable_multiplier.is_finite() && self.notable_multiplier > 0.0) {
            return Err(invalid(
                "notable_multiplier",
                format!("must be a positive number, got {}", self.notable_multiplier),
            ));
        }
        if self.top_tier_size == 0 {
            return Err(invalid("top_tier_size", "must be at least 1"));
        }
        self.first_season_key()?;
        Ok(())
    }

    /// `first_season` as a key, if set.
    pub fn first_season_key(&self) -> Result<Option<SeasonKey>, ConfigError> {
        match &self.first_season {
            None => Ok(None),
            Some(label) => SeasonKey::parse(label)
                .map(Some)
                .ok_or_else(|| invalid("first_season", format!("'{}' is not YYYY-YYYY", label))),
        }
    }

    /// Applies overrides from `lookup` (normally the process environment).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(ENV_MIN_SEASONS) {
            self.min_seasons = v
                .trim()
                .parse()
                .map_err(|_| invalid("min_seasons", format!("{}='{}' is not an integer", ENV_MIN_SEASONS, v)))?;
        }
        if let Some(v) = lookup(ENV_NOTABLE_MULTIPLIER) {
            self.notable_multiplier = v.trim().parse().map_err(|_| {
                invalid(
                    "notable_multiplier",
                    format!("{}='{}' is not a number", ENV_NOTABLE_MULTIPLIER, v),
                )
            })?;
        }
        if let Some(v) = lookup(ENV_LOG_LEVEL) {
            self.logging.level = v.parse().map_err(|e: String| invalid("logging.level", e))?;
        }
        Ok(())
    }

    /// Analyzer for per-team queries.
    pub fn team_analyzer(&self) -> TrendAnalyzer {
        TrendAnalyzer {
            order: self.trend.order,
            direction: self.trend.direction,
            multiplier: match self.trend.multiplier {
                MultiplierMode::Fixed => MultiplierSource::Fixed(self.notable_multiplier),
                MultiplierMode::Adaptive => MultiplierSource::Adaptive,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Reads `path`, applies environment overrides (a `.env` file is honoured),
/// and validates.
pub fn load_config(path: &Path) -> Result<AnalysisConfig, ConfigError> {
    dotenv::dotenv().ok();
    load_config_with(path, |key| std::env::var(key).ok())
}

/// `load_config` with overrides taken from `lookup` instead of the process
/// environment.
pub fn load_config_with<F>(path: &Path, lookup: F) -> Result<AnalysisConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut config: AnalysisConfig = toml::from_str(&text)?;
    config.apply_overrides(lookup)?;
    config.validate()?;
    Ok(config)
}

/// Like `load_config`, but a missing file at the default path yields the
/// defaults instead of an error.
pub fn load_config_or_default(path: Option<&Path>) -> Result<AnalysisConfig, ConfigError> {
    let default_path = Path::new(DEFAULT_CONFIG_PATH);
    match path {
        Some(p) => load_config(p),
        None if default_path.exists() => load_config(default_path),
        None => {
            dotenv::dotenv().ok();
            let mut config = AnalysisConfig::default();
            config.apply_overrides(|key| std::env::var(key).ok())?;
            config.validate()?;
            Ok(config)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
