//! Scenario configuration, fixed for the lifetime of an engine.
//!
//! ```
//! use partcheck_logic::config::{validate_config, ScenarioConfig};
//!
//! let config = ScenarioConfig {
//!     time_limit: 120.0,
//!     required_validations: 3,
//!     ..ScenarioConfig::default()
//! };
//! assert!(validate_config(&config).is_empty());
//! ```

use serde::{Deserialize, Serialize};

use crate::item::Item;
use crate::task::Task;

/// Which catalogue drives success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CompletionMode {
    /// Succeed once enough target-matching items are validated.
    #[default]
    Items,
    /// Succeed once every registered task is completed.
    Tasks,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Seconds before the run fails.
    pub time_limit: f32,
    /// Validated target-matching items needed to succeed (Items mode).
    pub required_validations: u32,
    pub base_risk: f32,
    pub max_risk: f32,
    /// Elevated verification mode at session start.
    pub elevated_mode: bool,
    pub completion: CompletionMode,
    /// Route `start_scenario` through the intro phase.
    pub intro_enabled: bool,
    /// Remaining seconds at which a one-off time warning fires.
    pub time_warning_threshold: Option<f32>,
    /// Display hint for temporary messages, in seconds.
    pub message_duration: f32,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            time_limit: 300.0,
            required_validations: 2,
            base_risk: 25.0,
            max_risk: 100.0,
            elevated_mode: false,
            completion: CompletionMode::Items,
            intro_enabled: true,
            time_warning_threshold: Some(60.0),
            message_duration: 3.0,
        }
    }
}

/// Configuration validation error.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Time limit zero, negative or not finite.
    InvalidTimeLimit(f32),
    /// Items mode cannot succeed with nothing to validate.
    NoRequiredValidations,
    InvalidMaxRisk(f32),
    /// Base risk outside `[0, max_risk]`.
    BaseRiskOutOfRange { base: f32, max: f32 },
    InvalidWarningThreshold(f32),
    InvalidMessageDuration(f32),
    /// Tasks mode with an empty task registry.
    NoTasks,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidTimeLimit(t) => write!(f, "Invalid time limit: {}", t),
            ConfigError::NoRequiredValidations => {
                write!(f, "Required validation count must be at least 1")
            }
            ConfigError::InvalidMaxRisk(m) => write!(f, "Invalid max risk: {}", m),
            ConfigError::BaseRiskOutOfRange { base, max } => {
                write!(f, "Base risk {} outside [0, {}]", base, max)
            }
            ConfigError::InvalidWarningThreshold(t) => {
                write!(f, "Invalid time warning threshold: {}", t)
            }
            ConfigError::InvalidMessageDuration(d) => {
                write!(f, "Invalid message duration: {}", d)
            }
            ConfigError::NoTasks => write!(f, "Tasks completion mode needs at least one task"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Validate a scenario configuration, returning all errors found.
pub fn validate_config(config: &ScenarioConfig) -> Vec<ConfigError> {
    let mut errors = Vec::new();

    if !config.time_limit.is_finite() || config.time_limit <= 0.0 {
        errors.push(ConfigError::InvalidTimeLimit(config.time_limit));
    }
    if config.completion == CompletionMode::Items && config.required_validations == 0 {
        errors.push(ConfigError::NoRequiredValidations);
    }
    if !config.max_risk.is_finite() || config.max_risk <= 0.0 {
        errors.push(ConfigError::InvalidMaxRisk(config.max_risk));
    } else if !(0.0..=config.max_risk).contains(&config.base_risk) {
        errors.push(ConfigError::BaseRiskOutOfRange {
            base: config.base_risk,
            max: config.max_risk,
        });
    }
    if let Some(threshold) = config.time_warning_threshold {
        if !threshold.is_finite() || threshold < 0.0 {
            errors.push(ConfigError::InvalidWarningThreshold(threshold));
        }
    }
    if !config.message_duration.is_finite() || config.message_duration <= 0.0 {
        errors.push(ConfigError::InvalidMessageDuration(config.message_duration));
    }

    errors
}

/// A whole scenario shipped as data: config plus catalogues.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScenarioDefinition {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub config: ScenarioConfig,
    pub items: Vec<Item>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}
