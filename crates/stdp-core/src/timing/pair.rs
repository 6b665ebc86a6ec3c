// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Pairwise STDP timing dependence
//!
//! ```text
//! pre spike at t:   Δw- ∝ y(t) = y(t_post) · e^(-(t - t_post)/τ-)
//! post spike at t:  Δw+ ∝ x(t) = x(t_pre)  · e^(-(t - t_pre)/τ+)
//! ```
//!
//! The synapse keeps the single pre-synaptic trace `x`; the post-synaptic
//! trace `y` lives with the post-synaptic neuron.

use tracing::info;

use super::check_timestep;
use crate::error::Result;
use crate::fixed::{fixed_add, STDP_FIXED_POINT_ONE};
use crate::lut::ExpDecayLut;
use crate::params::LutSpec;
use crate::trace::SynapseTrace;

/// Pair rule: one trace term per synapse, LUTs for τ+ and τ-
#[derive(Debug, Clone, PartialEq)]
pub struct PairRule {
    tau_plus_lut: ExpDecayLut,
    tau_minus_lut: ExpDecayLut,
}

impl PairRule {
    pub const TRACE_TERMS: usize = 1;

    pub fn new(tau_plus: f64, tau_minus: f64, lut: LutSpec, timestep_us: u32) -> Result<Self> {
        check_timestep(timestep_us)?;
        let rule = Self {
            tau_plus_lut: ExpDecayLut::new(tau_plus, lut)?,
            tau_minus_lut: ExpDecayLut::new(tau_minus, lut)?,
        };
        info!(
            tau_plus,
            tau_minus,
            lut_size = lut.size,
            lut_shift = lut.shift,
            "Constructed STDP pair rule"
        );
        Ok(rule)
    }

    /// Rebuild from tables loaded out of a plastic parameter region
    pub(crate) fn from_luts(tau_plus_lut: ExpDecayLut, tau_minus_lut: ExpDecayLut) -> Self {
        Self {
            tau_plus_lut,
            tau_minus_lut,
        }
    }

    /// τ+ in ms (`None` if loaded from a parameter region)
    pub fn tau_plus(&self) -> Option<f64> {
        self.tau_plus_lut.tau()
    }

    /// τ- in ms (`None` if loaded from a parameter region)
    pub fn tau_minus(&self) -> Option<f64> {
        self.tau_minus_lut.tau()
    }

    #[inline]
    pub fn decay(&self, trace: SynapseTrace, elapsed_ms: u32) -> SynapseTrace {
        let [x, unused] = trace.0;
        SynapseTrace([self.tau_plus_lut.decay(x, elapsed_ms), unused])
    }

    #[inline]
    pub fn on_pre_spike(&self, trace: SynapseTrace) -> SynapseTrace {
        let [x, unused] = trace.0;
        SynapseTrace([fixed_add(x, STDP_FIXED_POINT_ONE), unused])
    }

    /// The pair rule keeps no post-synaptic state in the synapse
    #[inline]
    pub fn on_post_spike(&self, trace: SynapseTrace) -> SynapseTrace {
        trace
    }

    /// Decayed pre-synaptic trace at the post-synaptic spike
    #[inline]
    pub fn potentiation_signal(&self, decayed: &SynapseTrace) -> u16 {
        decayed.primary()
    }

    /// τ- governs the post-synaptic neuron's trace
    pub fn post_trace_lut(&self) -> &ExpDecayLut {
        &self.tau_minus_lut
    }

    /// Tables in parameter region order
    pub fn luts(&self) -> [&ExpDecayLut; 2] {
        [&self.tau_plus_lut, &self.tau_minus_lut]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::SUPPORTED_TIMESTEP_US;

    fn rule() -> PairRule {
        PairRule::new(20.0, 20.0, LutSpec::default(), SUPPORTED_TIMESTEP_US).unwrap()
    }

    #[test]
    fn test_pre_spike_bumps_primary_only() {
        let trace = rule().on_pre_spike(SynapseTrace::ZERO);
        assert_eq!(trace, SynapseTrace([STDP_FIXED_POINT_ONE, 0]));
    }

    #[test]
    fn test_post_spike_leaves_trace() {
        let trace = SynapseTrace([1500, 0]);
        assert_eq!(rule().on_post_spike(trace), trace);
    }

    #[test]
    fn test_decay_matches_lut() {
        let rule = rule();
        let decayed = rule.decay(SynapseTrace([STDP_FIXED_POINT_ONE, 0]), 10);
        assert_eq!(decayed.primary(), 1242);
        assert_eq!(rule.potentiation_signal(&decayed), 1242);
    }

    #[test]
    fn test_taus_reported() {
        let rule = PairRule::new(16.8, 33.7, LutSpec::default(), SUPPORTED_TIMESTEP_US).unwrap();
        assert_eq!(rule.tau_plus(), Some(16.8));
        assert_eq!(rule.tau_minus(), Some(33.7));
    }

    #[test]
    fn test_equality_follows_taus() {
        assert_eq!(rule(), rule());
        let other = PairRule::new(20.0, 25.0, LutSpec::default(), SUPPORTED_TIMESTEP_US).unwrap();
        assert_ne!(rule(), other);
    }
}
