// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Construction records supplied by the host
//!
//! There are no hidden defaults beyond the 256-entry / shift-0 LUT convention
//! and the 1 ms simulation timestep.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The only simulation timestep (in microseconds) the decay LUTs support
pub const SUPPORTED_TIMESTEP_US: u32 = 1000;

/// Default number of entries per decay LUT
pub const DEFAULT_LUT_SIZE: usize = 256;

/// Default LUT index shift (1 entry per ms)
pub const DEFAULT_LUT_SHIFT: u32 = 0;

/// Decay LUT geometry, shared by every LUT of one rule instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LutSpec {
    /// Number of table entries
    pub size: usize,
    /// Elapsed ms per table index is `1 << shift`
    pub shift: u32,
}

impl Default for LutSpec {
    fn default() -> Self {
        Self {
            size: DEFAULT_LUT_SIZE,
            shift: DEFAULT_LUT_SHIFT,
        }
    }
}

impl LutSpec {
    /// Elapsed time (ms) covered by the table before lookups saturate
    pub fn range_ms(&self) -> u64 {
        (self.size as u64) << self.shift
    }
}

/// Timing dependence selection and time constants (ms)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "rule", rename_all = "lowercase"))]
pub enum TimingConfig {
    /// Pairwise rule with separate potentiation/depression windows
    Pair { tau_plus: f64, tau_minus: f64 },
    /// Two-time-constant triplet rule (fast `tau_x`, slow `tau_y`)
    Triplet { tau_x: f64, tau_y: f64 },
}

impl Default for TimingConfig {
    fn default() -> Self {
        TimingConfig::Pair {
            tau_plus: 20.0,
            tau_minus: 20.0,
        }
    }
}

/// Additive weight dependence parameters (real units)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WeightConfig {
    pub w_min: f64,
    pub w_max: f64,
    /// Potentiation learning rate (A+)
    pub a_plus: f64,
    /// Depression learning rate (A-)
    pub a_minus: f64,
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self {
            w_min: 0.0,
            w_max: 1.0,
            a_plus: 0.01,
            a_minus: 0.01,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lut_spec_default() {
        let spec = LutSpec::default();
        assert_eq!(spec.size, 256);
        assert_eq!(spec.shift, 0);
        assert_eq!(spec.range_ms(), 256);
        assert_eq!(LutSpec { size: 128, shift: 2 }.range_ms(), 512);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_timing_config_tagged_json() {
        let json = r#"{"rule":"triplet","tau_x":16.8,"tau_y":114.0}"#;
        let config: TimingConfig = serde_json::from_str(json).unwrap();
        assert_eq!(
            config,
            TimingConfig::Triplet {
                tau_x: 16.8,
                tau_y: 114.0
            }
        );

        let round = serde_json::to_string(&TimingConfig::default()).unwrap();
        assert!(round.contains(r#""rule":"pair""#));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_weight_config_partial_json() {
        let config: WeightConfig = serde_json::from_str(r#"{"w_max":2.0}"#).unwrap();
        assert_eq!(config.w_max, 2.0);
        assert_eq!(config.a_plus, 0.01);
    }
}
