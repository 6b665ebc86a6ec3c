// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Weight dependence rules
//!
//! Turns a trace-derived signal into a bounded weight change. Weights are
//! held as raw u16 values at a per-rule power-of-two scale.

pub mod additive;

pub use additive::{weight_scale_for, AdditiveWeightRule};

use crate::error::Result;
use crate::params::WeightConfig;

/// Sign of a weight update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateDirection {
    /// Post-synaptic spike after pre-synaptic activity
    Potentiate,
    /// Pre-synaptic spike after post-synaptic activity
    Depress,
}

/// Weight dependence rule
#[derive(Debug, Clone, PartialEq)]
pub enum WeightRule {
    Additive(AdditiveWeightRule),
}

impl WeightRule {
    pub fn from_config(config: &WeightConfig) -> Result<Self> {
        Ok(WeightRule::Additive(AdditiveWeightRule::new(config)?))
    }

    #[inline]
    pub fn apply(&self, weight: u16, signal: u16, direction: UpdateDirection) -> u16 {
        match self {
            WeightRule::Additive(rule) => rule.apply(weight, signal, direction),
        }
    }

    pub fn to_raw(&self, weight: f64) -> u16 {
        match self {
            WeightRule::Additive(rule) => rule.to_raw(weight),
        }
    }

    pub fn to_weight(&self, raw: u16) -> f64 {
        match self {
            WeightRule::Additive(rule) => rule.to_weight(raw),
        }
    }

    /// Raw `[w_min, w_max]`
    pub fn raw_bounds(&self) -> (u16, u16) {
        match self {
            WeightRule::Additive(rule) => (rule.w_min_raw(), rule.w_max_raw()),
        }
    }

    /// Real-valued `[w_min, w_max]`
    pub fn bounds(&self) -> (f64, f64) {
        match self {
            WeightRule::Additive(rule) => (rule.w_min(), rule.w_max()),
        }
    }
}
