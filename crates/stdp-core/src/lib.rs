// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # STDP Core
//!
//! Spike-timing-dependent plasticity for fixed-point plastic synapse rows:
//! - Exponential decay LUT generation (11 fractional bits)
//! - Pair and triplet timing rules
//! - Additive weight rule with clamped bounds
//! - Plastic synapse row codec and LUT parameter region
//! - Rule engine applying ordered spike events, per synapse or in batches
//!
//! ## Architecture
//! - No `exp()` at run time: all decay goes through LUTs built once
//! - Rules are closed enums, injected into the engine (no registry)
//! - Synapse state is exclusively owned; post-synaptic traces are borrowed
//! - Parallelism across synapses only (rayon)

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod engine;
pub mod error;
pub mod fixed;
pub mod lut;
pub mod params;
pub mod row;
pub mod timing;
pub mod trace;
pub mod weight;

// Re-export key types
pub use engine::{RuleEngine, SpikeEvent, SpikeRole};
pub use error::{Result, StdpError};
pub use fixed::{STDP_FIXED_POINT, STDP_FIXED_POINT_ONE};
pub use lut::{generate_exp_decay_lut, ExpDecayLut};
pub use params::{LutSpec, TimingConfig, WeightConfig, SUPPORTED_TIMESTEP_US};
pub use row::{RowLayout, SynapseState};
pub use timing::{PairRule, TimingRule, TimingRuleKind, TripletRule};
pub use trace::{PostTrace, SynapseTrace};
pub use weight::{AdditiveWeightRule, UpdateDirection, WeightRule};
