use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::coverage::Dimension;
use super::instruction::GoalType;
use crate::domain::errors::ConfigError;

/// Main configuration structure for the navigator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct NavigatorConfig {
    /// Rule thresholds and the per-session turn cap
    #[serde(default)]
    pub policy: PolicyConfig,

    /// Dimension weights for overall coverage
    #[serde(default)]
    pub coverage: CoverageConfig,

    /// Conflict detection tolerances
    #[serde(default)]
    pub conflict: ConflictConfig,

    /// Strategy applicability thresholds
    #[serde(default)]
    pub strategy: StrategyConfig,

    /// User-state smoothing
    #[serde(default)]
    pub user_state: UserStateConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Checkpoint database configuration
    #[serde(default)]
    pub database: DatabaseConfig,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            policy: PolicyConfig::default(),
            coverage: CoverageConfig::default(),
            conflict: ConflictConfig::default(),
            strategy: StrategyConfig::default(),
            user_state: UserStateConfig::default(),
            logging: LoggingConfig::default(),
            database: DatabaseConfig::default(),
        }
    }
}

impl NavigatorConfig {
    /// Check every decision-relevant value. Logging and database values are
    /// checked by the config loader.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let policy = &self.policy;
        for (name, value) in [
            ("close_overall_threshold", policy.close_overall_threshold),
            ("close_dimension_floor", policy.close_dimension_floor),
            ("pause_energy_floor", policy.pause_energy_floor),
            ("breadth_energy_ceiling", policy.breadth_energy_ceiling),
            ("saturation_threshold", policy.saturation_threshold),
            ("dimension_gap_threshold", policy.dimension_gap_threshold),
            ("deep_dive_energy_floor", policy.deep_dive_energy_floor),
            ("chapter_complete_threshold", policy.chapter_complete_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidThreshold { name, value });
            }
        }
        if !(-1.0..=1.0).contains(&policy.deep_dive_emotion_floor) {
            return Err(ConfigError::InvalidThreshold {
                name: "deep_dive_emotion_floor",
                value: policy.deep_dive_emotion_floor,
            });
        }
        if policy.session_turn_cap == 0 {
            return Err(ConfigError::InvalidTurnCap(policy.session_turn_cap));
        }
        if policy.theme_support_threshold == 0 {
            return Err(ConfigError::ValidationFailed(
                "theme_support_threshold must be at least 1".to_string(),
            ));
        }

        let mut tiebreak = policy.breadth_goal_tiebreak.clone();
        tiebreak.sort_by_key(GoalType::as_str);
        tiebreak.dedup();
        let mut expected = default_breadth_goal_tiebreak();
        expected.sort_by_key(GoalType::as_str);
        if tiebreak != expected || policy.breadth_goal_tiebreak.len() != expected.len() {
            let names: Vec<&str> = policy.breadth_goal_tiebreak.iter().map(GoalType::as_str).collect();
            return Err(ConfigError::InvalidTiebreak(names.join(",")));
        }

        let mut total = 0.0;
        for dimension in Dimension::ALL {
            let weight = self.coverage.weights.weight(dimension);
            if !weight.is_finite() || weight < 0.0 {
                return Err(ConfigError::InvalidWeight { dimension, value: weight });
            }
            total += weight;
        }
        if total <= 0.0 {
            return Err(ConfigError::ZeroWeights);
        }

        if self.conflict.temporal_tolerance_years < 0 {
            return Err(ConfigError::InvalidTolerance(
                self.conflict.temporal_tolerance_years,
            ));
        }

        if let Some(half_life) = self.user_state.smoothing_half_life_turns {
            if !half_life.is_finite() || half_life <= 0.0 {
                return Err(ConfigError::InvalidHalfLife(half_life));
            }
        }

        Ok(())
    }
}

/// Rule thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PolicyConfig {
    /// CLOSE_INTERVIEW: minimum overall coverage
    #[serde(default = "default_close_overall_threshold")]
    pub close_overall_threshold: f64,

    /// CLOSE_INTERVIEW: minimum coverage of every dimension
    #[serde(default = "default_close_dimension_floor")]
    pub close_dimension_floor: f64,

    /// PAUSE_SESSION: energy below this pauses
    #[serde(default = "default_pause_energy_floor")]
    pub pause_energy_floor: f64,

    /// PAUSE_SESSION: turns per session before pausing
    #[serde(default = "default_session_turn_cap")]
    pub session_turn_cap: u32,

    /// BREADTH_SWITCH: energy below this switches topic
    #[serde(default = "default_breadth_energy_ceiling")]
    pub breadth_energy_ceiling: f64,

    /// Slot fill at which a node is saturated
    #[serde(default = "default_saturation_threshold")]
    pub saturation_threshold: f64,

    /// BREADTH_SWITCH: a dimension below this opens a gap
    #[serde(default = "default_dimension_gap_threshold")]
    pub dimension_gap_threshold: f64,

    /// DEEP_DIVE: valence must exceed this
    #[serde(default = "default_deep_dive_emotion_floor")]
    pub deep_dive_emotion_floor: f64,

    /// DEEP_DIVE: energy must exceed this
    #[serde(default = "default_deep_dive_energy_floor")]
    pub deep_dive_energy_floor: f64,

    /// SUMMARIZE: fill every key event of the chapter must reach
    #[serde(default = "default_chapter_complete_threshold")]
    pub chapter_complete_threshold: f64,

    /// SUMMARIZE: nodes sharing a theme before it can be synthesised
    #[serde(default = "default_theme_support_threshold")]
    pub theme_support_threshold: usize,

    /// BREADTH_SWITCH: goal order when dimensions tie
    #[serde(default = "default_breadth_goal_tiebreak")]
    pub breadth_goal_tiebreak: Vec<GoalType>,
}

const fn default_close_overall_threshold() -> f64 {
    0.85
}

const fn default_close_dimension_floor() -> f64 {
    0.60
}

const fn default_pause_energy_floor() -> f64 {
    0.2
}

const fn default_session_turn_cap() -> u32 {
    50
}

const fn default_breadth_energy_ceiling() -> f64 {
    0.4
}

const fn default_saturation_threshold() -> f64 {
    0.8
}

const fn default_dimension_gap_threshold() -> f64 {
    0.3
}

const fn default_deep_dive_emotion_floor() -> f64 {
    0.5
}

const fn default_deep_dive_energy_floor() -> f64 {
    0.4
}

const fn default_chapter_complete_threshold() -> f64 {
    0.8
}

const fn default_theme_support_threshold() -> usize {
    3
}

fn default_breadth_goal_tiebreak() -> Vec<GoalType> {
    vec![
        GoalType::ExplorePerson,
        GoalType::ExploreLocation,
        GoalType::ExploreTheme,
        GoalType::ExplorePeriod,
    ]
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            close_overall_threshold: default_close_overall_threshold(),
            close_dimension_floor: default_close_dimension_floor(),
            pause_energy_floor: default_pause_energy_floor(),
            session_turn_cap: default_session_turn_cap(),
            breadth_energy_ceiling: default_breadth_energy_ceiling(),
            saturation_threshold: default_saturation_threshold(),
            dimension_gap_threshold: default_dimension_gap_threshold(),
            deep_dive_emotion_floor: default_deep_dive_emotion_floor(),
            deep_dive_energy_floor: default_deep_dive_energy_floor(),
            chapter_complete_threshold: default_chapter_complete_threshold(),
            theme_support_threshold: default_theme_support_threshold(),
            breadth_goal_tiebreak: default_breadth_goal_tiebreak(),
        }
    }
}

/// Coverage weighting
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CoverageConfig {
    /// Weight of each dimension in overall coverage
    #[serde(default)]
    pub weights: DimensionWeights,
}

/// Per-dimension weights (uniform by default)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DimensionWeights {
    #[serde(default = "default_weight")]
    pub time: f64,
    #[serde(default = "default_weight")]
    pub space: f64,
    #[serde(default = "default_weight")]
    pub people: f64,
    #[serde(default = "default_weight")]
    pub emotion: f64,
    #[serde(default = "default_weight")]
    pub reflection: f64,
}

const fn default_weight() -> f64 {
    1.0
}

impl DimensionWeights {
    /// Weight of one dimension.
    pub fn weight(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Time => self.time,
            Dimension::Space => self.space,
            Dimension::People => self.people,
            Dimension::Emotion => self.emotion,
            Dimension::Reflection => self.reflection,
        }
    }
}

impl Default for DimensionWeights {
    fn default() -> Self {
        Self {
            time: default_weight(),
            space: default_weight(),
            people: default_weight(),
            emotion: default_weight(),
            reflection: default_weight(),
        }
    }
}

/// Conflict detection configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ConflictConfig {
    /// Year gaps up to this size are not contradictions
    #[serde(default = "default_temporal_tolerance_years")]
    pub temporal_tolerance_years: i32,
}

const fn default_temporal_tolerance_years() -> i32 {
    1
}

impl Default for ConflictConfig {
    fn default() -> Self {
        Self {
            temporal_tolerance_years: default_temporal_tolerance_years(),
        }
    }
}

/// Strategy selection configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StrategyConfig {
    /// Mentions before a person counts as high-frequency
    #[serde(default = "default_high_mention_threshold")]
    pub high_mention_threshold: u32,
}

const fn default_high_mention_threshold() -> u32 {
    2
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            high_mention_threshold: default_high_mention_threshold(),
        }
    }
}

/// User-state assessment configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct UserStateConfig {
    /// Exponential smoothing half-life in turns; `None` disables smoothing
    #[serde(default)]
    pub smoothing_half_life_turns: Option<f64>,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files; stdout only when unset
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Rotation: daily, hourly or never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseConfig {
    /// Path to `SQLite` checkpoint database file
    #[serde(default = "default_database_path")]
    pub path: String,

    /// Maximum number of database connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_path() -> String {
    ".navigator/navigator.db".to_string()
}

const fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            max_connections: default_max_connections(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = NavigatorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.policy.session_turn_cap, 50);
        assert!((config.policy.close_overall_threshold - 0.85).abs() < f64::EPSILON);
        assert!(config.user_state.smoothing_half_life_turns.is_none());
    }

    #[test]
    fn test_threshold_out_of_range() {
        let mut config = NavigatorConfig::default();
        config.policy.pause_energy_floor = 1.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidThreshold { name: "pause_energy_floor", .. })
        ));
    }

    #[test]
    fn test_tiebreak_must_be_a_permutation() {
        let mut config = NavigatorConfig::default();
        config.policy.breadth_goal_tiebreak = vec![
            GoalType::ExploreTheme,
            GoalType::ExploreTheme,
            GoalType::ExplorePerson,
            GoalType::ExplorePeriod,
        ];
        assert!(matches!(config.validate(), Err(ConfigError::InvalidTiebreak(_))));

        config.policy.breadth_goal_tiebreak = vec![
            GoalType::ExplorePeriod,
            GoalType::ExploreTheme,
            GoalType::ExploreLocation,
            GoalType::ExplorePerson,
        ];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_all_zero_weights_rejected() {
        let mut config = NavigatorConfig::default();
        config.coverage.weights = DimensionWeights {
            time: 0.0,
            space: 0.0,
            people: 0.0,
            emotion: 0.0,
            reflection: 0.0,
        };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroWeights)));
    }

    #[test]
    fn test_yaml_partial_override() {
        let yaml = r"
policy:
  session_turn_cap: 30
  breadth_goal_tiebreak: [EXPLORE_THEME, EXPLORE_PERSON, EXPLORE_LOCATION, EXPLORE_PERIOD]
coverage:
  weights:
    emotion: 2.0
user_state:
  smoothing_half_life_turns: 3.0
";
        let config: NavigatorConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.policy.session_turn_cap, 30);
        assert!((config.policy.pause_energy_floor - 0.2).abs() < f64::EPSILON);
        assert_eq!(config.policy.breadth_goal_tiebreak[0], GoalType::ExploreTheme);
        assert!((config.coverage.weights.emotion - 2.0).abs() < f64::EPSILON);
        assert!((config.coverage.weights.time - 1.0).abs() < f64::EPSILON);
        assert_eq!(config.user_state.smoothing_half_life_turns, Some(3.0));
        assert!(config.validate().is_ok());
    }
}
