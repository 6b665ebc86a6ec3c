// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Trace stores
//!
//! Two independently owned stores take part in every update:
//! - [`SynapseTrace`]: kept in the plastic synapse row, mutated only by the
//!   rule engine processing that synapse's events.
//! - [`PostTrace`]: kept per post-synaptic neuron and read (never written)
//!   by every synapse converging on that neuron.

/// Upper bound on trace terms any timing rule keeps per synapse
pub const MAX_TRACE_TERMS: usize = 2;

/// Per-synapse trace terms (fixed point)
///
/// Slot 0 is the primary pre-synaptic trace. Slot 1 is the triplet rule's
/// slow trace and stays zero under the pair rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct SynapseTrace(pub [u16; MAX_TRACE_TERMS]);

impl SynapseTrace {
    pub const ZERO: SynapseTrace = SynapseTrace([0; MAX_TRACE_TERMS]);

    pub fn new(terms: [u16; MAX_TRACE_TERMS]) -> Self {
        Self(terms)
    }

    #[inline(always)]
    pub fn primary(&self) -> u16 {
        self.0[0]
    }

    #[inline(always)]
    pub fn auxiliary(&self) -> u16 {
        self.0[1]
    }

    #[inline(always)]
    pub fn terms(&self) -> &[u16; MAX_TRACE_TERMS] {
        &self.0
    }
}

/// Post-synaptic trace owned by one neuron
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PostTrace {
    /// Time (ms) of the last post-synaptic spike folded into `value`
    pub last_spike_time: u32,
    /// Trace value at `last_spike_time`, fixed point
    pub value: u16,
}

impl PostTrace {
    /// Initial post trace: no activity since `start_time`
    pub fn new(start_time: u32) -> Self {
        Self {
            last_spike_time: start_time,
            value: 0,
        }
    }
}
