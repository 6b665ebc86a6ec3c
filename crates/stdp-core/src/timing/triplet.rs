// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Two-time-constant triplet STDP timing dependence
//!
//! Trace terms kept in the synapse row:
//! - slot 0, `x`: pre-synaptic trace, decays with `τx`, bumped on pre spikes
//! - slot 1, `y`: slow post-synaptic trace, decays with `τy`, bumped on post spikes
//!
//! ```text
//! post spike at t:  Δw+ ∝ x(t) · (1 + y(t - ε))
//! pre spike at t:   Δw- ∝ y_post(t)            (post-neuron trace, τy)
//! ```
//!
//! `y(t - ε)` is sampled after decay but before the triggering spike's bump,
//! so bursts of post-synaptic activity amplify potentiation.

use tracing::info;

use super::check_timestep;
use crate::error::Result;
use crate::fixed::{fixed_add, saturate_u16, STDP_FIXED_POINT, STDP_FIXED_POINT_ONE};
use crate::lut::ExpDecayLut;
use crate::params::LutSpec;
use crate::trace::SynapseTrace;

/// Triplet rule: two trace terms per synapse, LUTs for τx and τy
#[derive(Debug, Clone, PartialEq)]
pub struct TripletRule {
    tau_x_lut: ExpDecayLut,
    tau_y_lut: ExpDecayLut,
}

impl TripletRule {
    pub const TRACE_TERMS: usize = 2;

    pub fn new(tau_x: f64, tau_y: f64, lut: LutSpec, timestep_us: u32) -> Result<Self> {
        check_timestep(timestep_us)?;
        let rule = Self {
            tau_x_lut: ExpDecayLut::new(tau_x, lut)?,
            tau_y_lut: ExpDecayLut::new(tau_y, lut)?,
        };
        info!(
            tau_x,
            tau_y,
            lut_size = lut.size,
            lut_shift = lut.shift,
            "Constructed STDP triplet rule"
        );
        Ok(rule)
    }

    pub(crate) fn from_luts(tau_x_lut: ExpDecayLut, tau_y_lut: ExpDecayLut) -> Self {
        Self {
            tau_x_lut,
            tau_y_lut,
        }
    }

    pub fn tau_x(&self) -> Option<f64> {
        self.tau_x_lut.tau()
    }

    pub fn tau_y(&self) -> Option<f64> {
        self.tau_y_lut.tau()
    }

    /// Each term decays with its own table
    #[inline]
    pub fn decay(&self, trace: SynapseTrace, elapsed_ms: u32) -> SynapseTrace {
        let [x, y] = trace.0;
        SynapseTrace([
            self.tau_x_lut.decay(x, elapsed_ms),
            self.tau_y_lut.decay(y, elapsed_ms),
        ])
    }

    #[inline]
    pub fn on_pre_spike(&self, trace: SynapseTrace) -> SynapseTrace {
        let [x, y] = trace.0;
        SynapseTrace([fixed_add(x, STDP_FIXED_POINT_ONE), y])
    }

    #[inline]
    pub fn on_post_spike(&self, trace: SynapseTrace) -> SynapseTrace {
        let [x, y] = trace.0;
        SynapseTrace([x, fixed_add(y, STDP_FIXED_POINT_ONE)])
    }

    /// `x · (1 + y)` on decayed, not yet bumped, terms
    #[inline]
    pub fn potentiation_signal(&self, decayed: &SynapseTrace) -> u16 {
        let [x, y] = decayed.0;
        let gain = STDP_FIXED_POINT_ONE as u64 + y as u64;
        let product = (x as u64 * gain) >> STDP_FIXED_POINT;
        saturate_u16(product.min(u32::MAX as u64) as u32)
    }

    /// The post-synaptic neuron's trace shares the slow τy decay
    pub fn post_trace_lut(&self) -> &ExpDecayLut {
        &self.tau_y_lut
    }

    /// Tables in parameter region order
    pub fn luts(&self) -> [&ExpDecayLut; 2] {
        [&self.tau_x_lut, &self.tau_y_lut]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::SUPPORTED_TIMESTEP_US;

    fn rule() -> TripletRule {
        TripletRule::new(16.8, 114.0, LutSpec::default(), SUPPORTED_TIMESTEP_US).unwrap()
    }

    #[test]
    fn test_spikes_bump_separate_terms() {
        let rule = rule();
        let after_pre = rule.on_pre_spike(SynapseTrace::ZERO);
        assert_eq!(after_pre, SynapseTrace([STDP_FIXED_POINT_ONE, 0]));

        let after_post = rule.on_post_spike(after_pre);
        assert_eq!(
            after_post,
            SynapseTrace([STDP_FIXED_POINT_ONE, STDP_FIXED_POINT_ONE])
        );
    }

    #[test]
    fn test_terms_decay_independently() {
        let rule = rule();
        let one = STDP_FIXED_POINT_ONE;
        let decayed = rule.decay(SynapseTrace([one, one]), 50);
        // Slow term keeps far more of its value than the fast one
        assert!(decayed.auxiliary() > decayed.primary());
        assert_eq!(decayed.primary(), rule.luts()[0].lookup(50));
        assert_eq!(decayed.auxiliary(), rule.luts()[1].lookup(50));
    }

    #[test]
    fn test_potentiation_without_slow_trace_equals_pair_signal() {
        let trace = SynapseTrace([1000, 0]);
        assert_eq!(rule().potentiation_signal(&trace), 1000);
    }

    #[test]
    fn test_potentiation_scaled_by_slow_trace() {
        // x = 0.5, y = 1.0 -> 0.5 * 2.0 = 1.0
        let trace = SynapseTrace([STDP_FIXED_POINT_ONE / 2, STDP_FIXED_POINT_ONE]);
        assert_eq!(rule().potentiation_signal(&trace), STDP_FIXED_POINT_ONE);
    }

    #[test]
    fn test_potentiation_saturates() {
        let trace = SynapseTrace([u16::MAX, u16::MAX]);
        assert_eq!(rule().potentiation_signal(&trace), u16::MAX);
    }
}
