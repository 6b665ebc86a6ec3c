// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # STDP Rule Engine
//!
//! Applies spike events to synapse plastic state. One engine serves a whole
//! plastic projection: it owns the timing and weight rules (and through them
//! the immutable LUTs) and is shared read-only by every synapse update.
//!
//! ## Event handling
//!
//! For an event at `time` on a synapse last updated at `t_last`:
//!
//! 1. `elapsed = time - t_last` (an earlier `time` is `NonMonotonicSpike`)
//! 2. the synapse trace is decayed by `elapsed`
//! 3. pre spike: depress by the post-synaptic neuron's trace, then bump
//! 4. post spike: potentiate by the decayed synapse trace, then bump
//! 5. `t_last = time`
//!
//! The post-synaptic neuron's [`PostTrace`] is only ever borrowed here. The
//! host advances it with [`RuleEngine::add_post_spike`] before delivering the
//! matching post events to the neuron's synapses.

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::error::{Result, StdpError};
use crate::params::{LutSpec, TimingConfig, WeightConfig};
use crate::row::{RowLayout, SynapseState};
use crate::timing::TimingRule;
use crate::trace::{PostTrace, SynapseTrace};
use crate::weight::{UpdateDirection, WeightRule};

/// Which side of the synapse fired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpikeRole {
    Pre,
    Post,
}

/// A timestamped spike delivered to one synapse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpikeEvent {
    /// Time in ms
    pub time: u32,
    pub role: SpikeRole,
}

impl SpikeEvent {
    pub fn pre(time: u32) -> Self {
        Self {
            time,
            role: SpikeRole::Pre,
        }
    }

    pub fn post(time: u32) -> Self {
        Self {
            time,
            role: SpikeRole::Post,
        }
    }
}

/// Timing rule + weight rule for one plastic projection
#[derive(Debug, Clone, PartialEq)]
pub struct RuleEngine {
    timing: TimingRule,
    weight: WeightRule,
    layout: RowLayout,
}

impl RuleEngine {
    pub fn new(timing: TimingRule, weight: WeightRule) -> Self {
        let layout = RowLayout::for_rule(&timing);
        info!(
            rule = timing.name(),
            row_size_bytes = layout.row_size_bytes(),
            params_size_bytes = timing.params_size_bytes(),
            "STDP rule engine ready"
        );
        Self {
            timing,
            weight,
            layout,
        }
    }

    /// Build both rules from construction records
    pub fn from_config(
        timing: &TimingConfig,
        weight: &WeightConfig,
        lut: LutSpec,
        timestep_us: u32,
    ) -> Result<Self> {
        let timing = TimingRule::from_config(timing, lut, timestep_us)?;
        let weight = WeightRule::from_config(weight)?;
        Ok(Self::new(timing, weight))
    }

    pub fn timing(&self) -> &TimingRule {
        &self.timing
    }

    pub fn weight_rule(&self) -> &WeightRule {
        &self.weight
    }

    pub fn row_layout(&self) -> RowLayout {
        self.layout
    }

    pub fn row_size_bytes(&self) -> usize {
        self.layout.row_size_bytes()
    }

    pub fn params_size_bytes(&self) -> usize {
        self.timing.params_size_bytes()
    }

    pub fn write_plastic_params(&self, out: &mut Vec<u8>, timestep_us: u32) -> Result<()> {
        self.timing.write_plastic_params(out, timestep_us)
    }

    /// Fresh synapse state: zero traces, weight clamped into bounds
    pub fn new_synapse(&self, initial_weight: f64, start_time: u32) -> SynapseState {
        let (w_min, w_max) = self.weight.bounds();
        if !(w_min..=w_max).contains(&initial_weight) {
            warn!(
                initial_weight,
                w_min, w_max, "Initial weight outside bounds, clamping"
            );
        }
        SynapseState {
            last_update_time: start_time,
            weight: self.weight.to_raw(initial_weight),
            trace: SynapseTrace::ZERO,
        }
    }

    /// Empty post-synaptic trace for a neuron
    pub fn new_post_trace(&self, start_time: u32) -> PostTrace {
        PostTrace::new(start_time)
    }

    /// Fold a post-synaptic spike into the neuron's trace store
    pub fn add_post_spike(&self, post: &mut PostTrace, time: u32) -> Result<()> {
        self.timing.add_post_spike(post, time)
    }

    pub fn weight_of(&self, state: &SynapseState) -> f64 {
        self.weight.to_weight(state.weight)
    }

    fn elapsed_since(state: &SynapseState, time: u32) -> Result<u32> {
        time.checked_sub(state.last_update_time)
            .ok_or(StdpError::NonMonotonicSpike {
                last_update_time: state.last_update_time,
                event_time: time,
            })
    }

    /// Apply one spike event and return the updated state
    ///
    /// A spike landing on the same timestep as the synapse's last update, or
    /// (for pre events) the post-synaptic trace's last spike, leaves the
    /// weight alone; its trace contribution is still recorded.
    ///
    /// # Errors
    /// `NonMonotonicSpike` if `event.time` precedes the synapse's last
    /// update, or (for pre events) the post-synaptic trace's last spike.
    pub fn on_spike(
        &self,
        state: &SynapseState,
        post: &PostTrace,
        event: SpikeEvent,
    ) -> Result<SynapseState> {
        let elapsed = Self::elapsed_since(state, event.time)?;
        let decayed = self.timing.decay(state.trace, elapsed);

        let (signal, weight, trace) = match event.role {
            SpikeRole::Pre => {
                let signal = self.timing.depression_signal(post, event.time)?;
                let weight = self
                    .weight
                    .apply(state.weight, signal, UpdateDirection::Depress);
                (signal, weight, self.timing.on_pre_spike(decayed))
            }
            SpikeRole::Post => {
                let signal = if elapsed == 0 {
                    0
                } else {
                    self.timing.potentiation_signal(&decayed)
                };
                let weight = self
                    .weight
                    .apply(state.weight, signal, UpdateDirection::Potentiate);
                (signal, weight, self.timing.on_post_spike(decayed))
            }
        };

        debug!(
            time = event.time,
            role = ?event.role,
            elapsed,
            decayed = ?decayed.terms(),
            signal,
            old_weight = state.weight,
            new_weight = weight,
            "STDP update"
        );

        Ok(SynapseState {
            last_update_time: event.time,
            weight,
            trace,
        })
    }

    /// Decay the synapse trace up to `time` without a spike or weight change
    pub fn flush(&self, state: &SynapseState, time: u32) -> Result<SynapseState> {
        let elapsed = Self::elapsed_since(state, time)?;
        Ok(SynapseState {
            last_update_time: time,
            weight: state.weight,
            trace: self.timing.decay(state.trace, elapsed),
        })
    }

    /// Apply one spike event to an encoded row in place
    pub fn on_spike_row(&self, row: &mut [u8], post: &PostTrace, event: SpikeEvent) -> Result<()> {
        let state = self.layout.decode(row)?;
        let updated = self.on_spike(&state, post, event)?;
        self.layout.encode_into(&updated, row)
    }

    /// Deliver one post-synaptic spike to every synapse onto a neuron
    ///
    /// `post` is the neuron's trace store, already advanced to `time`.
    /// On error some states may already hold the update.
    pub fn process_post_spike_batch(
        &self,
        states: &mut [SynapseState],
        post: &PostTrace,
        time: u32,
    ) -> Result<()> {
        let event = SpikeEvent::post(time);
        states.par_iter_mut().try_for_each(|state| {
            *state = self.on_spike(state, post, event)?;
            Ok(())
        })
    }

    /// Apply `event` to a contiguous block of encoded rows in place
    ///
    /// `post_traces[i]` is the post-synaptic trace store for row `i`.
    pub fn process_rows(
        &self,
        rows: &mut [u8],
        post_traces: &[PostTrace],
        event: SpikeEvent,
    ) -> Result<()> {
        let row_size = self.layout.row_size_bytes();
        let expected = post_traces.len() * row_size;
        if rows.len() < expected {
            return Err(StdpError::TruncatedRow {
                expected,
                actual: rows.len(),
            });
        }
        if rows.len() != expected {
            return Err(StdpError::InvalidParameter(format!(
                "{} bytes of rows for {} post traces of {}-byte rows",
                rows.len(),
                post_traces.len(),
                row_size
            )));
        }

        rows.par_chunks_mut(row_size)
            .zip(post_traces.par_iter())
            .try_for_each(|(row, post)| self.on_spike_row(row, post, event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::SUPPORTED_TIMESTEP_US;

    fn pair_engine() -> RuleEngine {
        RuleEngine::from_config(
            &TimingConfig::default(),
            &WeightConfig::default(),
            LutSpec::default(),
            SUPPORTED_TIMESTEP_US,
        )
        .unwrap()
    }

    #[test]
    fn test_new_synapse_clamps_weight() {
        let engine = pair_engine();
        assert_eq!(engine.new_synapse(0.5, 0).weight, 16384);
        assert_eq!(engine.new_synapse(7.0, 0).weight, 32768);
        assert_eq!(engine.new_synapse(-1.0, 3).last_update_time, 3);
    }

    #[test]
    fn test_pre_then_post_potentiates() {
        let engine = pair_engine();
        let mut post = engine.new_post_trace(0);
        let state = engine.new_synapse(0.5, 0);

        let state = engine.on_spike(&state, &post, SpikeEvent::pre(0)).unwrap();
        assert_eq!(state.weight, 16384); // no prior post activity

        engine.add_post_spike(&mut post, 10).unwrap();
        let state = engine.on_spike(&state, &post, SpikeEvent::post(10)).unwrap();
        assert_eq!(state.weight, 16384 + 198);
        assert_eq!(state.last_update_time, 10);
    }

    #[test]
    fn test_post_then_pre_depresses() {
        let engine = pair_engine();
        let mut post = engine.new_post_trace(0);
        let state = engine.new_synapse(0.5, 0);

        engine.add_post_spike(&mut post, 0).unwrap();
        let state = engine.on_spike(&state, &post, SpikeEvent::post(0)).unwrap();
        let state = engine.on_spike(&state, &post, SpikeEvent::pre(10)).unwrap();
        assert_eq!(state.weight, 16384 - 198);
        assert_eq!(state.trace.primary(), 2048);
    }

    #[test]
    fn test_coincident_post_leaves_weight() {
        let engine = pair_engine();
        let mut post = engine.new_post_trace(0);
        let state = engine.new_synapse(0.5, 0);

        let state = engine.on_spike(&state, &post, SpikeEvent::pre(10)).unwrap();
        engine.add_post_spike(&mut post, 10).unwrap();
        let state = engine.on_spike(&state, &post, SpikeEvent::post(10)).unwrap();
        assert_eq!(state.weight, 16384);
        assert_eq!(state.trace.primary(), 2048);
        assert_eq!(state.last_update_time, 10);
    }

    #[test]
    fn test_non_monotonic_event() {
        let engine = pair_engine();
        let post = engine.new_post_trace(0);
        let state = engine.new_synapse(0.5, 20);
        assert_eq!(
            engine.on_spike(&state, &post, SpikeEvent::pre(19)),
            Err(StdpError::NonMonotonicSpike {
                last_update_time: 20,
                event_time: 19
            })
        );
        assert!(engine.flush(&state, 5).is_err());
    }

    #[test]
    fn test_flush_only_decays() {
        let engine = pair_engine();
        let post = engine.new_post_trace(0);
        let state = engine.new_synapse(0.5, 0);
        let state = engine.on_spike(&state, &post, SpikeEvent::pre(0)).unwrap();

        let flushed = engine.flush(&state, 10).unwrap();
        assert_eq!(flushed.weight, state.weight);
        assert_eq!(flushed.trace.primary(), 1242);
        assert_eq!(flushed.last_update_time, 10);
    }

    #[test]
    fn test_row_in_place() {
        let engine = pair_engine();
        let mut post = engine.new_post_trace(0);
        let layout = engine.row_layout();
        let mut row = layout.encode(&engine.new_synapse(0.5, 0));

        engine
            .on_spike_row(&mut row, &post, SpikeEvent::pre(0))
            .unwrap();
        engine.add_post_spike(&mut post, 10).unwrap();
        engine
            .on_spike_row(&mut row, &post, SpikeEvent::post(10))
            .unwrap();

        let state = layout.decode(&row).unwrap();
        assert_eq!(state.weight, 16384 + 198);
        assert!(engine.on_spike_row(&mut row[..5], &post, SpikeEvent::pre(11)).is_err());
    }

    #[test]
    fn test_batch_matches_sequential() {
        let engine = pair_engine();
        let mut post = engine.new_post_trace(0);
        let blank = engine.new_post_trace(0);

        let mut states: Vec<SynapseState> = (0..64u32)
            .map(|i| {
                let state = engine.new_synapse(0.5, 0);
                engine.on_spike(&state, &blank, SpikeEvent::pre(i % 30)).unwrap()
            })
            .collect();
        let expected: Vec<SynapseState> = {
            let mut post = post;
            engine.add_post_spike(&mut post, 40).unwrap();
            states
                .iter()
                .map(|s| engine.on_spike(s, &post, SpikeEvent::post(40)).unwrap())
                .collect()
        };

        engine.add_post_spike(&mut post, 40).unwrap();
        engine
            .process_post_spike_batch(&mut states, &post, 40)
            .unwrap();
        assert_eq!(states, expected);

        let err = engine.process_post_spike_batch(&mut states, &post, 39);
        assert!(matches!(err, Err(StdpError::NonMonotonicSpike { .. })));
    }

    #[test]
    fn test_process_rows_length_checks() {
        let engine = pair_engine();
        let posts = vec![engine.new_post_trace(0); 3];
        let mut rows = vec![0u8; 8 * 3];
        engine
            .process_rows(&mut rows, &posts, SpikeEvent::pre(1))
            .unwrap();
        for row in rows.chunks(8) {
            let state = engine.row_layout().decode(row).unwrap();
            assert_eq!(state.last_update_time, 1);
            assert_eq!(state.trace.primary(), 2048);
        }

        let mut short = vec![0u8; 20];
        assert_eq!(
            engine.process_rows(&mut short, &posts, SpikeEvent::pre(2)),
            Err(StdpError::TruncatedRow {
                expected: 24,
                actual: 20
            })
        );
        let mut long = vec![0u8; 30];
        assert!(matches!(
            engine.process_rows(&mut long, &posts, SpikeEvent::pre(2)),
            Err(StdpError::InvalidParameter(_))
        ));
    }
}
