//! Configuration file support for wodgen.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/wodgen/config.toml`.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub planner: PlannerConfig,

    #[serde(default)]
    pub scoring: ScoringWeights,
}

/// Where input files live
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Session assembly parameters
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PlannerConfig {
    /// Days of history that count towards fatigue
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,

    /// How many top-ranked candidates a random pick chooses among
    #[serde(default = "default_pick_window")]
    pub pick_window: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            lookback_days: default_lookback_days(),
            pick_window: default_pick_window(),
        }
    }
}

/// Weights of the additive movement score
///
/// Penalties are stored as positive magnitudes and subtracted.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScoringWeights {
    pub goal_match: f64,
    pub mixed_compound: f64,
    pub preferred_modality: f64,
    pub recent_penalty: f64,
    pub pattern_fatigue: f64,
    pub level_match: f64,
    pub below_level: f64,
    pub intensity_adjust: f64,
    pub recovery_penalty: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            goal_match: 3.0,
            mixed_compound: 1.0,
            preferred_modality: 2.0,
            recent_penalty: 4.0,
            pattern_fatigue: 1.3,
            level_match: 1.0,
            below_level: 0.4,
            intensity_adjust: 1.0,
            recovery_penalty: 2.5,
        }
    }
}

impl ScoringWeights {
    fn values(&self) -> [(&'static str, f64); 9] {
        [
            ("goal_match", self.goal_match),
            ("mixed_compound", self.mixed_compound),
            ("preferred_modality", self.preferred_modality),
            ("recent_penalty", self.recent_penalty),
            ("pattern_fatigue", self.pattern_fatigue),
            ("level_match", self.level_match),
            ("below_level", self.below_level),
            ("intensity_adjust", self.intensity_adjust),
            ("recovery_penalty", self.recovery_penalty),
        ]
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("wodgen")
}

fn default_lookback_days() -> u32 {
    7
}

fn default_pick_window() -> usize {
    8
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::debug!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("wodgen")
            .join("config.toml")
    }

    /// Reject values the planner cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.planner.lookback_days == 0 {
            return Err(Error::Config("planner.lookback_days must be at least 1".into()));
        }
        if self.planner.pick_window == 0 {
            return Err(Error::Config("planner.pick_window must be at least 1".into()));
        }
        for (name, value) in self.scoring.values() {
            if !value.is_finite() {
                return Err(Error::Config(format!("scoring.{} must be a finite number", name)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.planner.lookback_days, 7);
        assert_eq!(config.planner.pick_window, 8);
        assert_eq!(config.scoring.recent_penalty, 4.0);
        assert_eq!(config.scoring.pattern_fatigue, 1.3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[planner]
pick_window = 3

[scoring]
recent_penalty = 6.5
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.planner.pick_window, 3);
        assert_eq!(config.planner.lookback_days, 7); // default
        assert_eq!(config.scoring.recent_penalty, 6.5);
        assert_eq!(config.scoring.goal_match, 3.0); // default
    }

    #[test]
    fn test_zero_pick_window_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[planner]\npick_window = 0\n").unwrap();

        let result = Config::load_from(&path);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[planner\nlookback_days = ").unwrap();

        assert!(matches!(Config::load_from(&path), Err(Error::Toml(_))));
    }
}
