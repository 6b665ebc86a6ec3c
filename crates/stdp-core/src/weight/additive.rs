// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Additive weight dependence
//!
//! ```text
//! potentiate: w' = clamp(w + A+ · signal, w_min, w_max)
//! depress:    w' = clamp(w - A- · signal, w_min, w_max)
//! ```
//!
//! `signal` is a fixed-point trace value, so the raw update is
//! `(A_raw · signal) >> STDP_FIXED_POINT` with `A_raw` in raw weight units.

use tracing::warn;

use super::UpdateDirection;
use crate::error::{Result, StdpError};
use crate::fixed::STDP_FIXED_POINT;
use crate::params::WeightConfig;

/// Largest raw weight scale considered (one unit of weight == 65536 raw)
const MAX_WEIGHT_SCALE: u32 = 1 << 16;

/// Largest power-of-two scale (at most 2^16) at which `w_max` fits in a u16
///
/// # Errors
/// `InvalidParameter` if `w_max` is negative, not finite, or above 65535.
///
/// # Example
/// ```
/// use stdp_core::weight::weight_scale_for;
///
/// assert_eq!(weight_scale_for(1.0).unwrap(), 32768);
/// assert_eq!(weight_scale_for(0.5).unwrap(), 65536);
/// assert_eq!(weight_scale_for(5.0).unwrap(), 8192);
/// ```
pub fn weight_scale_for(w_max: f64) -> Result<u32> {
    if !w_max.is_finite() || w_max < 0.0 || w_max > u16::MAX as f64 {
        return Err(StdpError::InvalidParameter(format!(
            "w_max must be finite and in [0, 65535] (got {})",
            w_max
        )));
    }
    let mut scale = MAX_WEIGHT_SCALE;
    while scale > 1 && w_max * scale as f64 > u16::MAX as f64 {
        scale >>= 1;
    }
    Ok(scale)
}

/// Additive rule with learning rates pre-multiplied into raw units
#[derive(Debug, Clone, PartialEq)]
pub struct AdditiveWeightRule {
    config: WeightConfig,
    scale: u32,
    w_min_raw: u16,
    w_max_raw: u16,
    a_plus_raw: u64,
    a_minus_raw: u64,
}

impl AdditiveWeightRule {
    pub fn new(config: &WeightConfig) -> Result<Self> {
        let WeightConfig {
            w_min,
            w_max,
            a_plus,
            a_minus,
        } = *config;

        if !w_min.is_finite() || w_min < 0.0 {
            return Err(StdpError::InvalidParameter(format!(
                "w_min must be finite and >= 0 (got {})",
                w_min
            )));
        }
        if w_min > w_max {
            return Err(StdpError::InvalidParameter(format!(
                "w_min ({}) must not exceed w_max ({})",
                w_min, w_max
            )));
        }
        for (name, rate) in [("A_plus", a_plus), ("A_minus", a_minus)] {
            if !rate.is_finite() || rate < 0.0 {
                return Err(StdpError::InvalidParameter(format!(
                    "{} must be finite and >= 0 (got {})",
                    name, rate
                )));
            }
        }

        let scale = weight_scale_for(w_max)?;
        let raw = |value: f64| (value * scale as f64).round();

        for (name, rate) in [("A_plus", a_plus), ("A_minus", a_minus)] {
            if rate > 0.0 && raw(rate) == 0.0 {
                warn!(
                    rate = name,
                    value = rate,
                    scale,
                    "Learning rate rounds to zero raw units, updates in this direction are disabled"
                );
            }
        }

        Ok(Self {
            config: *config,
            scale,
            w_min_raw: raw(w_min).min(u16::MAX as f64) as u16,
            w_max_raw: raw(w_max).min(u16::MAX as f64) as u16,
            a_plus_raw: raw(a_plus).min(u64::MAX as f64) as u64,
            a_minus_raw: raw(a_minus).min(u64::MAX as f64) as u64,
        })
    }

    /// Apply one update and clamp the result to `[w_min, w_max]`
    ///
    /// Out-of-range input weights come back inside the bounds.
    #[inline]
    pub fn apply(&self, weight: u16, signal: u16, direction: UpdateDirection) -> u16 {
        let (rate, sign) = match direction {
            UpdateDirection::Potentiate => (self.a_plus_raw, 1i128),
            UpdateDirection::Depress => (self.a_minus_raw, -1i128),
        };
        let delta = (rate as u128 * signal as u128) >> STDP_FIXED_POINT;
        let updated = weight as i128 + sign * delta as i128;
        updated.clamp(self.w_min_raw as i128, self.w_max_raw as i128) as u16
    }

    /// Real weight to raw units, clamped to the rule's bounds
    pub fn to_raw(&self, weight: f64) -> u16 {
        let raw = (weight * self.scale as f64).round();
        if raw.is_nan() {
            return self.w_min_raw;
        }
        raw.clamp(self.w_min_raw as f64, self.w_max_raw as f64) as u16
    }

    pub fn to_weight(&self, raw: u16) -> f64 {
        raw as f64 / self.scale as f64
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    pub fn w_min(&self) -> f64 {
        self.config.w_min
    }

    pub fn w_max(&self) -> f64 {
        self.config.w_max
    }

    pub fn a_plus(&self) -> f64 {
        self.config.a_plus
    }

    pub fn a_minus(&self) -> f64 {
        self.config.a_minus
    }

    pub fn w_min_raw(&self) -> u16 {
        self.w_min_raw
    }

    pub fn w_max_raw(&self) -> u16 {
        self.w_max_raw
    }
}
