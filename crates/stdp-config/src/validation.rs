// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! Every check runs and all failures are reported together, so a broken
//! file can be fixed in one pass.

use crate::{ConfigError, ConfigResult, StdpConfig};
use stdp_core::SUPPORTED_TIMESTEP_US;

/// Largest LUT the parameter region format allows
pub const MAX_LUT_SIZE: usize = 1 << 16;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: [&str; 2] = ["text", "json"];

/// Validation errors that can occur during config validation
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    InvalidValue { field: String, reason: String },
    OutOfRange { field: String, value: String, expected: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
            Self::OutOfRange {
                field,
                value,
                expected,
            } => {
                write!(f, "{} = {} is outside valid range ({})", field, value, expected)
            }
        }
    }
}

/// Validate the complete configuration
///
/// Checks for:
/// - Supported simulation timestep
/// - LUT geometry
/// - Positive, finite time constants for the selected rule
/// - Weight bounds and learning rates
/// - Logging level and format names
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` with details if validation fails
pub fn validate_config(config: &StdpConfig) -> ConfigResult<()> {
    let errors = collect_validation_errors(config);
    if errors.is_empty() {
        return Ok(());
    }

    let error_messages = errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::ValidationError(format!(
        "Configuration validation failed:\n{}",
        error_messages
    )))
}

/// Run every check and return all failures
pub fn collect_validation_errors(config: &StdpConfig) -> Vec<ConfigValidationError> {
    let mut errors = Vec::new();
    validate_simulation(config, &mut errors);
    validate_lut(config, &mut errors);
    validate_timing(config, &mut errors);
    validate_weight(config, &mut errors);
    validate_logging(config, &mut errors);
    errors
}

fn validate_simulation(config: &StdpConfig, errors: &mut Vec<ConfigValidationError>) {
    if config.simulation.timestep_us != SUPPORTED_TIMESTEP_US {
        errors.push(ConfigValidationError::InvalidValue {
            field: "simulation.timestep_us".to_string(),
            reason: format!(
                "decay LUTs only support {}us timesteps (got {})",
                SUPPORTED_TIMESTEP_US, config.simulation.timestep_us
            ),
        });
    }
}

fn validate_lut(config: &StdpConfig, errors: &mut Vec<ConfigValidationError>) {
    let lut = &config.lut;
    if lut.size == 0 || lut.size > MAX_LUT_SIZE {
        errors.push(ConfigValidationError::OutOfRange {
            field: "lut.size".to_string(),
            value: lut.size.to_string(),
            expected: format!("1..={}", MAX_LUT_SIZE),
        });
        return;
    }
    let span = (lut.size as u64 - 1).checked_shl(lut.shift).unwrap_or(u64::MAX);
    if lut.shift >= u32::BITS || span > u32::MAX as u64 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "lut.shift".to_string(),
            reason: format!(
                "shift {} overflows 32-bit time for {} entries",
                lut.shift, lut.size
            ),
        });
    }
}

fn validate_timing(config: &StdpConfig, errors: &mut Vec<ConfigValidationError>) {
    for (name, tau) in config.timing.active_taus() {
        if !tau.is_finite() || tau <= 0.0 {
            errors.push(ConfigValidationError::InvalidValue {
                field: format!("timing.{}", name),
                reason: format!("must be finite and > 0 (got {})", tau),
            });
        }
    }
}

fn validate_weight(config: &StdpConfig, errors: &mut Vec<ConfigValidationError>) {
    let weight = &config.weight;
    for (name, value) in [
        ("w_min", weight.w_min),
        ("w_max", weight.w_max),
        ("a_plus", weight.a_plus),
        ("a_minus", weight.a_minus),
    ] {
        if !value.is_finite() || value < 0.0 {
            errors.push(ConfigValidationError::InvalidValue {
                field: format!("weight.{}", name),
                reason: format!("must be finite and >= 0 (got {})", value),
            });
        }
    }
    if weight.w_min > weight.w_max {
        errors.push(ConfigValidationError::InvalidValue {
            field: "weight.w_min".to_string(),
            reason: format!(
                "w_min ({}) must not exceed w_max ({})",
                weight.w_min, weight.w_max
            ),
        });
    }
    if weight.w_max > u16::MAX as f64 {
        errors.push(ConfigValidationError::OutOfRange {
            field: "weight.w_max".to_string(),
            value: weight.w_max.to_string(),
            expected: format!("0..={}", u16::MAX),
        });
    }
}

fn validate_logging(config: &StdpConfig, errors: &mut Vec<ConfigValidationError>) {
    let level = config.logging.level.to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "logging.level".to_string(),
            reason: format!("expected one of {:?} (got '{}')", LOG_LEVELS, config.logging.level),
        });
    }
    let format = config.logging.format.to_lowercase();
    if !LOG_FORMATS.contains(&format.as_str()) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "logging.format".to_string(),
            reason: format!("expected one of {:?} (got '{}')", LOG_FORMATS, config.logging.format),
        });
    }
}
