// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Timing Dependence Rules
//!
//! The rule set is closed: [`TimingRule`] is an enum over the pair and
//! triplet variants and every operation is dispatched statically.
//!
//! ## Plastic parameter region
//!
//! A rule's LUTs travel to the host's table loader as a flat region of
//! little-endian u16 entries, tables in rule order:
//!
//! ```text
//! Pair:    [τ+ LUT][τ- LUT]
//! Triplet: [τx LUT][τy LUT]
//! ```

pub mod pair;
pub mod triplet;

pub use pair::PairRule;
pub use triplet::TripletRule;

use crate::error::{Result, StdpError};
use crate::fixed::{fixed_add, STDP_FIXED_POINT_ONE};
use crate::lut::ExpDecayLut;
use crate::params::{LutSpec, TimingConfig, SUPPORTED_TIMESTEP_US};
use crate::trace::{PostTrace, SynapseTrace};

/// Reject any simulation timestep other than 1 ms
pub fn check_timestep(timestep_us: u32) -> Result<()> {
    if timestep_us != SUPPORTED_TIMESTEP_US {
        return Err(StdpError::UnsupportedTimestep { timestep_us });
    }
    Ok(())
}

/// Discriminant used when rebuilding a rule from a parameter region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimingRuleKind {
    Pair,
    Triplet,
}

/// Timing dependence rule
#[derive(Debug, Clone, PartialEq)]
pub enum TimingRule {
    Pair(PairRule),
    Triplet(TripletRule),
}

impl TimingRule {
    /// Build the rule selected by `config`, generating its LUTs
    pub fn from_config(config: &TimingConfig, lut: LutSpec, timestep_us: u32) -> Result<Self> {
        match *config {
            TimingConfig::Pair {
                tau_plus,
                tau_minus,
            } => Ok(TimingRule::Pair(PairRule::new(
                tau_plus,
                tau_minus,
                lut,
                timestep_us,
            )?)),
            TimingConfig::Triplet { tau_x, tau_y } => Ok(TimingRule::Triplet(TripletRule::new(
                tau_x,
                tau_y,
                lut,
                timestep_us,
            )?)),
        }
    }

    pub fn kind(&self) -> TimingRuleKind {
        match self {
            TimingRule::Pair(_) => TimingRuleKind::Pair,
            TimingRule::Triplet(_) => TimingRuleKind::Triplet,
        }
    }

    /// Human-readable rule name
    pub fn name(&self) -> &'static str {
        match self {
            TimingRule::Pair(_) => "STDP pair rule",
            TimingRule::Triplet(_) => "STDP triplet rule",
        }
    }

    /// Suffix selecting the matching on-chip binary
    pub fn vertex_executable_suffix(&self) -> &'static str {
        match self {
            TimingRule::Pair(_) => "pair",
            TimingRule::Triplet(_) => "triplet",
        }
    }

    /// Number of trace terms kept in each synapse row
    pub fn trace_size(&self) -> usize {
        match self {
            TimingRule::Pair(_) => PairRule::TRACE_TERMS,
            TimingRule::Triplet(_) => TripletRule::TRACE_TERMS,
        }
    }

    /// Bytes of pre-synaptic trace per synapse row
    pub fn pre_trace_size_bytes(&self) -> usize {
        self.trace_size() * crate::row::TRACE_SLOT_BYTES
    }

    #[inline]
    pub fn decay(&self, trace: SynapseTrace, elapsed_ms: u32) -> SynapseTrace {
        match self {
            TimingRule::Pair(rule) => rule.decay(trace, elapsed_ms),
            TimingRule::Triplet(rule) => rule.decay(trace, elapsed_ms),
        }
    }

    #[inline]
    pub fn on_pre_spike(&self, trace: SynapseTrace) -> SynapseTrace {
        match self {
            TimingRule::Pair(rule) => rule.on_pre_spike(trace),
            TimingRule::Triplet(rule) => rule.on_pre_spike(trace),
        }
    }

    #[inline]
    pub fn on_post_spike(&self, trace: SynapseTrace) -> SynapseTrace {
        match self {
            TimingRule::Pair(rule) => rule.on_post_spike(trace),
            TimingRule::Triplet(rule) => rule.on_post_spike(trace),
        }
    }

    /// Potentiation magnitude from the synapse's decayed (pre-bump) trace
    #[inline]
    pub fn potentiation_signal(&self, decayed: &SynapseTrace) -> u16 {
        match self {
            TimingRule::Pair(rule) => rule.potentiation_signal(decayed),
            TimingRule::Triplet(rule) => rule.potentiation_signal(decayed),
        }
    }

    /// Depression magnitude from the post-synaptic neuron's trace at `time`
    ///
    /// Returns 0 when the neuron's last spike coincides with `time`.
    ///
    /// # Errors
    /// `NonMonotonicSpike` if the neuron's trace is already past `time`.
    pub fn depression_signal(&self, post: &PostTrace, time: u32) -> Result<u16> {
        if time < post.last_spike_time {
            return Err(StdpError::NonMonotonicSpike {
                last_update_time: post.last_spike_time,
                event_time: time,
            });
        }
        let delta_t = time - post.last_spike_time;
        if delta_t == 0 {
            return Ok(0);
        }
        Ok(self.post_trace_lut().decay(post.value, delta_t))
    }

    /// Fold a post-synaptic spike at `time` into the neuron's trace
    pub fn add_post_spike(&self, post: &mut PostTrace, time: u32) -> Result<()> {
        if time < post.last_spike_time {
            return Err(StdpError::NonMonotonicSpike {
                last_update_time: post.last_spike_time,
                event_time: time,
            });
        }
        let decayed = self
            .post_trace_lut()
            .decay(post.value, time - post.last_spike_time);
        post.value = fixed_add(decayed, STDP_FIXED_POINT_ONE);
        post.last_spike_time = time;
        Ok(())
    }

    fn post_trace_lut(&self) -> &ExpDecayLut {
        match self {
            TimingRule::Pair(rule) => rule.post_trace_lut(),
            TimingRule::Triplet(rule) => rule.post_trace_lut(),
        }
    }

    /// Tables in parameter region order
    pub fn luts(&self) -> [&ExpDecayLut; 2] {
        match self {
            TimingRule::Pair(rule) => rule.luts(),
            TimingRule::Triplet(rule) => rule.luts(),
        }
    }

    /// Size of this rule's plastic parameter region
    pub fn params_size_bytes(&self) -> usize {
        self.luts().iter().map(|lut| lut.size_bytes()).sum()
    }

    /// Append the rule's LUTs to a plastic parameter region
    ///
    /// # Errors
    /// `UnsupportedTimestep` unless `timestep_us` is 1000.
    pub fn write_plastic_params(&self, out: &mut Vec<u8>, timestep_us: u32) -> Result<()> {
        check_timestep(timestep_us)?;
        out.reserve(self.params_size_bytes());
        for lut in self.luts() {
            lut.write_le(out);
        }
        Ok(())
    }

    /// Rebuild a rule from the front of a plastic parameter region
    ///
    /// Returns the rule and the number of bytes consumed. Time constants
    /// are not stored in the region, so the rebuilt rule reports `None` taus.
    pub fn read_plastic_params(
        kind: TimingRuleKind,
        lut: LutSpec,
        bytes: &[u8],
    ) -> Result<(Self, usize)> {
        let table_bytes = lut.size * crate::lut::LUT_ENTRY_BYTES;
        let needed = 2 * table_bytes;
        if bytes.len() < needed {
            return Err(StdpError::TruncatedParams {
                expected: needed,
                actual: bytes.len(),
            });
        }
        let first = ExpDecayLut::read_le(lut, bytes)?;
        let second = ExpDecayLut::read_le(lut, &bytes[table_bytes..])?;

        let rule = match kind {
            TimingRuleKind::Pair => TimingRule::Pair(PairRule::from_luts(first, second)),
            TimingRuleKind::Triplet => {
                TimingRule::Triplet(TripletRule::from_luts(first, second))
            }
        };
        Ok((rule, needed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> TimingRule {
        TimingRule::from_config(
            &TimingConfig::Pair {
                tau_plus: 20.0,
                tau_minus: 20.0,
            },
            LutSpec::default(),
            SUPPORTED_TIMESTEP_US,
        )
        .unwrap()
    }

    fn triplet() -> TimingRule {
        TimingRule::from_config(
            &TimingConfig::Triplet {
                tau_x: 16.8,
                tau_y: 114.0,
            },
            LutSpec::default(),
            SUPPORTED_TIMESTEP_US,
        )
        .unwrap()
    }

    #[test]
    fn test_trace_size() {
        assert_eq!(pair().trace_size(), 1);
        assert_eq!(triplet().trace_size(), 2);
        assert_eq!(pair().pre_trace_size_bytes(), 2);
        assert_eq!(triplet().pre_trace_size_bytes(), 4);
    }

    #[test]
    fn test_names() {
        assert_eq!(pair().vertex_executable_suffix(), "pair");
        assert_eq!(triplet().vertex_executable_suffix(), "triplet");
        assert_eq!(triplet().kind(), TimingRuleKind::Triplet);
    }

    #[test]
    fn test_unsupported_timestep() {
        let err = TimingRule::from_config(&TimingConfig::default(), LutSpec::default(), 100)
            .unwrap_err();
        assert_eq!(err, StdpError::UnsupportedTimestep { timestep_us: 100 });
    }

    #[test]
    fn test_invalid_tau() {
        let err = TimingRule::from_config(
            &TimingConfig::Triplet {
                tau_x: 16.8,
                tau_y: 0.0,
            },
            LutSpec::default(),
            SUPPORTED_TIMESTEP_US,
        )
        .unwrap_err();
        assert!(matches!(err, StdpError::InvalidParameter(_)));
    }

    #[test]
    fn test_decay_saturates_past_table() {
        let rule = triplet();
        let trace = SynapseTrace([40_000, 30_000]);
        let at_max = rule.decay(trace, 255);
        assert_eq!(rule.decay(trace, 256), at_max);
        assert_eq!(rule.decay(trace, 1_000_000), at_max);
    }

    #[test]
    fn test_post_trace_accumulates() {
        let rule = pair();
        let mut post = PostTrace::new(0);
        rule.add_post_spike(&mut post, 0).unwrap();
        assert_eq!(post.value, STDP_FIXED_POINT_ONE);

        rule.add_post_spike(&mut post, 20).unwrap();
        // e^-1 * 2048 = 753, plus one spike
        assert_eq!(post.value, 753 + STDP_FIXED_POINT_ONE);
        assert_eq!(post.last_spike_time, 20);

        let err = rule.add_post_spike(&mut post, 19).unwrap_err();
        assert_eq!(
            err,
            StdpError::NonMonotonicSpike {
                last_update_time: 20,
                event_time: 19
            }
        );
    }

    #[test]
    fn test_depression_signal() {
        let rule = pair();
        let mut post = PostTrace::new(0);
        rule.add_post_spike(&mut post, 5).unwrap();

        assert_eq!(rule.depression_signal(&post, 5).unwrap(), 0); // coincident
        assert_eq!(rule.depression_signal(&post, 15).unwrap(), 1242);
        assert!(matches!(
            rule.depression_signal(&post, 4),
            Err(StdpError::NonMonotonicSpike { .. })
        ));
    }

    #[test]
    fn test_triplet_depression_follows_slow_trace() {
        let rule = triplet();
        let mut post = PostTrace::new(0);
        rule.add_post_spike(&mut post, 0).unwrap();

        let signal = rule.depression_signal(&post, 50).unwrap();
        assert_eq!(signal, rule.luts()[1].lookup(50));
        assert_eq!(signal, 1321);
        assert_ne!(signal, rule.luts()[0].lookup(50));

        rule.add_post_spike(&mut post, 50).unwrap();
        assert_eq!(post.value, 1321 + STDP_FIXED_POINT_ONE);
    }

    #[test]
    fn test_params_region_round_trip() {
        let rule = triplet();
        assert_eq!(rule.params_size_bytes(), 1024);

        let mut region = Vec::new();
        rule.write_plastic_params(&mut region, SUPPORTED_TIMESTEP_US)
            .unwrap();
        assert_eq!(region.len(), 1024);

        region.extend_from_slice(&[1, 2, 3]); // following region data
        let (loaded, consumed) =
            TimingRule::read_plastic_params(TimingRuleKind::Triplet, LutSpec::default(), &region)
                .unwrap();
        assert_eq!(consumed, 1024);
        assert_eq!(loaded.luts()[0].values(), rule.luts()[0].values());
        assert_eq!(loaded.luts()[1].values(), rule.luts()[1].values());

        let trace = SynapseTrace([3000, 5000]);
        assert_eq!(loaded.decay(trace, 37), rule.decay(trace, 37));
    }

    #[test]
    fn test_params_region_rejects_timestep() {
        let mut region = Vec::new();
        let err = pair().write_plastic_params(&mut region, 500).unwrap_err();
        assert_eq!(err, StdpError::UnsupportedTimestep { timestep_us: 500 });
        assert!(region.is_empty());
    }

    #[test]
    fn test_params_region_truncated() {
        let err =
            TimingRule::read_plastic_params(TimingRuleKind::Pair, LutSpec::default(), &[0; 600])
                .unwrap_err();
        assert_eq!(
            err,
            StdpError::TruncatedParams {
                expected: 1024,
                actual: 600
            }
        );
    }
}
