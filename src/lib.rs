// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # stdp-engine
//!
//! Fixed-point spike-timing-dependent plasticity for neuromorphic hardware.
//! Pair and triplet timing rules drive an additive weight rule over compact
//! little-endian synapse rows, with decay computed from lookup tables.
//!
//! ## Quick Start
//!
//! ```rust
//! use stdp_engine::prelude::*;
//!
//! let engine = RuleEngine::from_config(
//!     &TimingConfig::Pair { tau_plus: 20.0, tau_minus: 20.0 },
//!     &WeightConfig::default(),
//!     LutSpec::default(),
//!     SUPPORTED_TIMESTEP_US,
//! )?;
//!
//! let mut post = engine.new_post_trace(0);
//! let synapse = engine.new_synapse(0.5, 0);
//!
//! let synapse = engine.on_spike(&synapse, &post, SpikeEvent::pre(0))?;
//! engine.add_post_spike(&mut post, 10)?;
//! let synapse = engine.on_spike(&synapse, &post, SpikeEvent::post(10))?;
//!
//! assert!(engine.weight_of(&synapse) > 0.5);
//! # Ok::<(), stdp_engine::engine::StdpError>(())
//! ```
//!
//! ## Feature Flags
//! - **`config`** (default): TOML configuration with env/CLI overrides
//! - **`observability`** (default): `tracing-subscriber` initialization
//! - **`file-logging`**: rolling log files

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use stdp_core as engine;

#[cfg(feature = "config")]
pub use stdp_config as config;

#[cfg(feature = "observability")]
pub use stdp_observability as observability;

/// Logging options described by the `[logging]` configuration section
#[cfg(all(feature = "config", feature = "observability"))]
pub fn logging_options(
    config: &stdp_config::StdpConfig,
) -> anyhow::Result<stdp_observability::LoggingOptions> {
    let format = config.logging.format.parse::<stdp_observability::LogFormat>()?;
    Ok(stdp_observability::LoggingOptions {
        level: config.logging.level.to_lowercase(),
        format,
        ..Default::default()
    })
}

/// Prelude with commonly used types
pub mod prelude {
    pub use crate::engine::{
        LutSpec, PostTrace, RowLayout, RuleEngine, SpikeEvent, SpikeRole, StdpError,
        SynapseState, TimingConfig, TimingRule, WeightConfig, WeightRule, SUPPORTED_TIMESTEP_US,
    };

    #[cfg(feature = "config")]
    pub use crate::config::{load_config, validate_config, StdpConfig};

    #[cfg(feature = "observability")]
    pub use crate::observability::{init_logging, parse_debug_flags, LogFormat, LoggingOptions};
}

#[cfg(all(test, feature = "config", feature = "observability"))]
mod tests {
    use super::*;

    #[test]
    fn test_logging_options_from_config() {
        let mut config = stdp_config::StdpConfig::default();
        config.logging.level = "DEBUG".to_string();
        config.logging.format = "json".to_string();

        let options = logging_options(&config).unwrap();
        assert_eq!(options.level, "debug");
        assert_eq!(options.format, stdp_observability::LogFormat::Json);

        config.logging.format = "yaml".to_string();
        assert!(logging_options(&config).is_err());
    }
}
