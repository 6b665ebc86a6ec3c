// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! Each struct maps to a section of `stdp_configuration.toml`. The `[lut]`
//! and `[weight]` sections deserialize straight into the core's construction
//! records.

use serde::{Deserialize, Serialize};
use stdp_core::{LutSpec, RuleEngine, StdpError, TimingConfig, WeightConfig};

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct StdpConfig {
    pub simulation: SimulationConfig,
    pub lut: LutSpec,
    pub timing: TimingSection,
    pub weight: WeightConfig,
    pub logging: LoggingConfig,
}

impl StdpConfig {
    /// Construct the rule engine described by this configuration
    pub fn build_engine(&self) -> Result<RuleEngine, StdpError> {
        RuleEngine::from_config(
            &self.timing.to_timing_config(),
            &self.weight,
            self.lut,
            self.simulation.timestep_us,
        )
    }
}

/// Host simulation settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Simulation timestep in microseconds (only 1000 is supported)
    pub timestep_us: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self { timestep_us: 1000 }
    }
}

/// Timing rule selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimingRuleName {
    #[default]
    Pair,
    Triplet,
}

impl std::str::FromStr for TimingRuleName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pair" => Ok(TimingRuleName::Pair),
            "triplet" => Ok(TimingRuleName::Triplet),
            other => Err(format!("unknown timing rule '{}'", other)),
        }
    }
}

/// `[timing]` section: rule plus every time constant (ms)
///
/// Only the constants of the selected rule are used.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TimingSection {
    pub rule: TimingRuleName,
    pub tau_plus: f64,
    pub tau_minus: f64,
    pub tau_x: f64,
    pub tau_y: f64,
}

impl Default for TimingSection {
    fn default() -> Self {
        Self {
            rule: TimingRuleName::Pair,
            tau_plus: 20.0,
            tau_minus: 20.0,
            tau_x: 16.8,
            tau_y: 114.0,
        }
    }
}

impl TimingSection {
    pub fn to_timing_config(&self) -> TimingConfig {
        match self.rule {
            TimingRuleName::Pair => TimingConfig::Pair {
                tau_plus: self.tau_plus,
                tau_minus: self.tau_minus,
            },
            TimingRuleName::Triplet => TimingConfig::Triplet {
                tau_x: self.tau_x,
                tau_y: self.tau_y,
            },
        }
    }

    /// Time constants of the selected rule, with their field names
    pub fn active_taus(&self) -> [(&'static str, f64); 2] {
        match self.rule {
            TimingRuleName::Pair => [("tau_plus", self.tau_plus), ("tau_minus", self.tau_minus)],
            TimingRuleName::Triplet => [("tau_x", self.tau_x), ("tau_y", self.tau_y)],
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// "text" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}
