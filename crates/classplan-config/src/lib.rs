//! Configuration system for classplan.
//!
//! Load run configuration from TOML or YAML files to control class
//! capacities, the fixed assignment rules and the preference weighting
//! without code changes.
//!
//! # Examples
//!
//! Load configuration from a TOML string:
//!
//! ```
//! use classplan_config::PlanConfig;
//!
//! let config = PlanConfig::from_toml_str(r#"
//!     [cohort]
//!     num_classes = 3
//!     max_class_size = 29
//!
//!     [weights]
//!     language_penalty = 10
//!     science_penalty = 100
//!     stratification = 4
//!
//!     [termination]
//!     seconds_spent_limit = 30
//! "#).unwrap();
//!
//! assert_eq!(config.cohort.max_class_size, 29);
//! assert_eq!(config.time_limit(), Some(std::time::Duration::from_secs(30)));
//! ```
//!
//! Use the defaults when no file is present:
//!
//! ```
//! use classplan_config::PlanConfig;
//!
//! let config = PlanConfig::load("classplan.toml").unwrap_or_default();
//! assert_eq!(config.cohort.num_classes, 3);
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use classplan_core::{ClassId, Gender, LanguageId, LANGUAGE_COUNT};

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main run configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct PlanConfig {
    /// Seed for the engine's optional shuffled value ordering.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub random_seed: Option<u64>,

    /// Class count and capacity.
    #[serde(default)]
    pub cohort: CohortConfig,

    /// The fixed assignment rules (privileged class, forced and coupled
    /// languages, gender subgroup).
    #[serde(default)]
    pub rules: RuleConfig,

    /// Objective weighting.
    #[serde(default)]
    pub weights: WeightConfig,

    /// Termination configuration for the solve call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub termination: Option<TerminationConfig>,
}

impl PlanConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file doesn't exist or contains invalid TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_file(path)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(s)?)
    }

    /// Sets the number of classes.
    pub fn with_num_classes(mut self, num_classes: u8) -> Self {
        self.cohort.num_classes = num_classes;
        self
    }

    /// Sets the per-class capacity.
    pub fn with_max_class_size(mut self, max_class_size: u32) -> Self {
        self.cohort.max_class_size = max_class_size;
        self
    }

    /// Sets the termination time limit.
    pub fn with_termination_seconds(mut self, seconds: u64) -> Self {
        self.termination = Some(TerminationConfig {
            seconds_spent_limit: Some(seconds),
            ..self.termination.unwrap_or_default()
        });
        self
    }

    /// Sets the search-node termination limit.
    pub fn with_node_limit(mut self, nodes: u64) -> Self {
        self.termination = Some(TerminationConfig {
            node_limit: Some(nodes),
            ..self.termination.unwrap_or_default()
        });
        self
    }

    /// Sets the seed for shuffled value ordering.
    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    /// Returns the termination time limit, if configured.
    pub fn time_limit(&self) -> Option<Duration> {
        self.termination.as_ref().and_then(|t| t.time_limit())
    }

    /// Checks the cross-field invariants the model builder relies on.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a designated class falls
    /// outside `1..=num_classes`, a designated language outside the
    /// language domain, or a capacity is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let classes = self.cohort.num_classes;
        if classes == 0 {
            return Err(ConfigError::Invalid("num_classes must be positive".into()));
        }
        if self.cohort.max_class_size == 0 {
            return Err(ConfigError::Invalid(
                "max_class_size must be positive".into(),
            ));
        }
        for (name, class) in [
            ("privileged_class", self.rules.privileged_class),
            ("coupled_class", self.rules.coupled_class),
        ] {
            if class.0 == 0 || class.0 > classes {
                return Err(ConfigError::Invalid(format!(
                    "{name} {class} is outside 1..={classes}"
                )));
            }
        }
        for (name, language) in [
            ("forced_language", self.rules.forced_language),
            ("coupled_language", self.rules.coupled_language),
        ] {
            if language.0 == 0 || language.0 as usize > LANGUAGE_COUNT {
                return Err(ConfigError::Invalid(format!(
                    "{name} {language} is outside 1..={LANGUAGE_COUNT}"
                )));
            }
        }
        Ok(())
    }
}

/// Class count and capacity.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct CohortConfig {
    /// Number of classes students are distributed over.
    #[serde(default = "default_num_classes")]
    pub num_classes: u8,

    /// Maximum number of students per class. Language capacity is twice
    /// this value, science capacity three times.
    #[serde(default = "default_max_class_size")]
    pub max_class_size: u32,
}

impl Default for CohortConfig {
    fn default() -> Self {
        Self {
            num_classes: default_num_classes(),
            max_class_size: default_max_class_size(),
        }
    }
}

/// The fixed assignment rules.
///
/// The reference cohort couples language 5 to class 2, forces language 4
/// for students who rank it first, gates class 1 on the best-match science
/// pair and keeps the male students together.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct RuleConfig {
    /// Class whose members must hold the best-match science pair.
    #[serde(default = "default_privileged_class")]
    pub privileged_class: ClassId,

    /// Language that is forced whenever a student ranks it first.
    #[serde(default = "default_forced_language")]
    pub forced_language: LanguageId,

    /// Language biconditionally tied to [`RuleConfig::coupled_class`].
    #[serde(default = "default_coupled_language")]
    pub coupled_language: LanguageId,

    /// Class biconditionally tied to [`RuleConfig::coupled_language`].
    #[serde(default = "default_coupled_class")]
    pub coupled_class: ClassId,

    /// Gender whose students must all share one class.
    #[serde(default = "default_gender_subgroup")]
    pub gender_subgroup: Gender,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            privileged_class: default_privileged_class(),
            forced_language: default_forced_language(),
            coupled_language: default_coupled_language(),
            coupled_class: default_coupled_class(),
            gender_subgroup: default_gender_subgroup(),
        }
    }
}

/// Objective weighting.
///
/// Rewards are stratified: the language at rank `i` contributes
/// `language_importance * (5 - i) ^ stratification`, a science subject at
/// rank `i` contributes `science_importance[slot] * (3 - i) ^
/// stratification` per slot. Missing a top choice costs the corresponding
/// penalty.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct WeightConfig {
    #[serde(default = "default_one")]
    pub language_importance: i64,

    #[serde(default = "default_language_penalty")]
    pub language_penalty: i64,

    /// Per-slot importance for the two science slots.
    #[serde(default = "default_science_importance")]
    pub science_importance: [i64; 2],

    #[serde(default = "default_science_penalty")]
    pub science_penalty: i64,

    /// Exponent applied to rank distance; steeper values make one top
    /// choice outweigh several lower choices.
    #[serde(default = "default_stratification")]
    pub stratification: u32,
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self {
            language_importance: default_one(),
            language_penalty: default_language_penalty(),
            science_importance: default_science_importance(),
            science_penalty: default_science_penalty(),
            stratification: default_stratification(),
        }
    }
}

/// Termination configuration for the solve call.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct TerminationConfig {
    /// Maximum seconds to spend searching.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seconds_spent_limit: Option<u64>,

    /// Maximum search nodes to explore.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_limit: Option<u64>,
}

impl TerminationConfig {
    /// Returns the time limit as a Duration, if any.
    pub fn time_limit(&self) -> Option<Duration> {
        match self.seconds_spent_limit {
            Some(seconds) if seconds > 0 => Some(Duration::from_secs(seconds)),
            _ => None,
        }
    }
}

fn default_num_classes() -> u8 {
    3
}

fn default_max_class_size() -> u32 {
    29
}

fn default_privileged_class() -> ClassId {
    ClassId(1)
}

fn default_forced_language() -> LanguageId {
    LanguageId(4)
}

fn default_coupled_language() -> LanguageId {
    LanguageId(5)
}

fn default_coupled_class() -> ClassId {
    ClassId(2)
}

fn default_gender_subgroup() -> Gender {
    Gender::Male
}

fn default_one() -> i64 {
    1
}

fn default_language_penalty() -> i64 {
    10
}

fn default_science_importance() -> [i64; 2] {
    [1, 1]
}

fn default_science_penalty() -> i64 {
    100
}

fn default_stratification() -> u32 {
    4
}
