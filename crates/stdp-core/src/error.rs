// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for the STDP rule engine
//!
//! Every variant is fatal for the operation that raised it. Weight values
//! outside `[w_min, w_max]` are NOT errors: the weight rule clamps them.

/// Errors raised by rule construction, row decoding and spike processing
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StdpError {
    /// Bad tau, LUT size/shift, weight bounds or learning rates
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// LUT indices are defined at 1 ms granularity only
    #[error("STDP LUT generation only supports 1ms timesteps (got {timestep_us}us)")]
    UnsupportedTimestep { timestep_us: u32 },

    /// Plastic synapse row shorter than the rule's row size
    #[error("Truncated synapse row: expected {expected} bytes, got {actual}")]
    TruncatedRow { expected: usize, actual: usize },

    /// Plastic parameter region shorter than the rule's LUTs
    #[error("Truncated plastic parameter region: expected {expected} bytes, got {actual}")]
    TruncatedParams { expected: usize, actual: usize },

    /// Spike delivered with a timestamp earlier than the stored trace time
    #[error("Non-monotonic spike: event at {event_time}ms precedes last update at {last_update_time}ms")]
    NonMonotonicSpike {
        last_update_time: u32,
        event_time: u32,
    },
}

/// Result type for rule engine operations
pub type Result<T> = core::result::Result<T, StdpError>;
