// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! Catches everything an electrode would reject at construction, so a bad
//! file fails before any simulation state is touched.

use std::collections::HashSet;

use regex::Regex;

use crate::{ConfigError, ConfigResult, LfpConfig, KNOWN_METHODS};

/// Validation errors that can occur during config validation
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    UnknownMethod { field: String, method: String },
    InvalidPattern { field: String, reason: String },
    DuplicateName { name: String },
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownMethod { field, method } => {
                write!(
                    f,
                    "{} = '{}' is not one of {}",
                    field,
                    method,
                    KNOWN_METHODS.join(", ")
                )
            }
            Self::InvalidPattern { field, reason } => {
                write!(f, "Invalid exclusion pattern for {}: {}", field, reason)
            }
            Self::DuplicateName { name } => {
                write!(f, "Electrode name '{}' is used more than once", name)
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

/// Validate the complete configuration
///
/// Checks for:
/// - Positive, finite medium constants and run parameters
/// - Known transfer methods
/// - Compilable exclusion patterns
/// - Finite electrode positions and positive sampling periods
/// - Unique electrode names
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every problem found
pub fn validate_config(config: &LfpConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();

    validate_medium(config, &mut errors);
    validate_run(config, &mut errors);
    validate_electrodes(config, &mut errors);

    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");

        return Err(ConfigError::ValidationError(format!(
            "Configuration validation failed:\n{}",
            error_messages
        )));
    }

    Ok(())
}

fn require_positive(field: &str, value: f64, errors: &mut Vec<ConfigValidationError>) {
    if !value.is_finite() || value <= 0.0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: field.to_string(),
            reason: format!("must be finite and positive, got {}", value),
        });
    }
}

fn validate_medium(config: &LfpConfig, errors: &mut Vec<ConfigValidationError>) {
    let medium = &config.medium;
    require_positive("medium.sigma", medium.sigma, errors);
    require_positive("medium.capacitance", medium.capacitance, errors);
    require_positive("medium.velocity", medium.velocity, errors);
    require_positive("medium.radius_margin", medium.radius_margin, errors);
}

fn validate_run(config: &LfpConfig, errors: &mut Vec<ConfigValidationError>) {
    require_positive("run.dt", config.run.dt, errors);
    if !config.run.tstop.is_finite() || config.run.tstop < 0.0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "run.tstop".to_string(),
            reason: "must be finite and not negative".to_string(),
        });
    }
    if config.system.collective_timeout_ms == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "system.collective_timeout_ms".to_string(),
            reason: "must be positive".to_string(),
        });
    }
}

fn validate_electrodes(config: &LfpConfig, errors: &mut Vec<ConfigValidationError>) {
    let mut seen = HashSet::new();

    for (i, electrode) in config.electrodes.iter().enumerate() {
        let prefix = format!("electrodes[{}]", i);

        if electrode.name.is_empty() {
            errors.push(ConfigValidationError::InvalidValue {
                field: format!("{}.name", prefix),
                reason: "must not be empty".to_string(),
            });
        } else if !seen.insert(electrode.name.as_str()) {
            errors.push(ConfigValidationError::DuplicateName {
                name: electrode.name.clone(),
            });
        }

        if electrode.position.iter().any(|c| !c.is_finite()) {
            errors.push(ConfigValidationError::InvalidValue {
                field: format!("{}.position", prefix),
                reason: "coordinates must be finite".to_string(),
            });
        }

        require_positive(
            &format!("{}.sampling_period", prefix),
            electrode.sampling_period,
            errors,
        );

        if !KNOWN_METHODS.contains(&electrode.method.as_str()) {
            errors.push(ConfigValidationError::UnknownMethod {
                field: format!("{}.method", prefix),
                method: electrode.method.clone(),
            });
        }

        if let Some(pattern) = &electrode.exclude_pattern {
            if let Err(e) = Regex::new(&format!("^(?:{})", pattern)) {
                errors.push(ConfigValidationError::InvalidPattern {
                    field: format!("{}.exclude_pattern", prefix),
                    reason: e.to_string(),
                });
            }
        }
    }
}
