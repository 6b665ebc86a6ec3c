// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! Three tiers, later tiers winning:
//! 1. TOML file (base values)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::{ConfigError, ConfigResult, StdpConfig, TimingRuleName};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const CONFIG_FILE_NAME: &str = "stdp_configuration.toml";

/// Find the STDP configuration file
///
/// Search order:
/// 1. `STDP_CONFIG_PATH` environment variable
/// 2. Current working directory: `./stdp_configuration.toml`
/// 3. Up to 5 parent directories
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("STDP_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by STDP_CONFIG_PATH not found: {}",
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));
        search_paths.extend(
            cwd.ancestors()
                .skip(1)
                .take(5)
                .map(|dir| dir.join(CONFIG_FILE_NAME)),
        );
    }

    if let Some(path) = search_paths.iter().find(|p| p.exists()) {
        return Ok(path.clone());
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "STDP configuration file '{}' not found in any of these locations:\n{}\n\nSet STDP_CONFIG_PATH environment variable to specify custom location.",
        CONFIG_FILE_NAME, search_list
    )))
}

/// Load configuration from TOML file
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, will search for config file.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if config file is not found or contains invalid TOML.
/// Values are not validated here; see [`crate::validate_config`].
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<StdpConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: StdpConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config);
    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli);
    }

    Ok(config)
}

/// Overwrite `target` with `value` parsed as `T`; unparsable values are ignored
fn set_parsed<T: FromStr>(target: &mut T, value: Option<&str>) {
    if let Some(parsed) = value.and_then(|v| v.trim().parse::<T>().ok()) {
        *target = parsed;
    }
}

/// Apply one override source, looking keys up through `get`
fn apply_overrides<'a, F>(config: &mut StdpConfig, get: F, keys: &OverrideKeys)
where
    F: Fn(&str) -> Option<std::borrow::Cow<'a, str>>,
{
    set_parsed(
        &mut config.simulation.timestep_us,
        get(keys.timestep_us).as_deref(),
    );
    set_parsed(&mut config.lut.size, get(keys.lut_size).as_deref());
    set_parsed(&mut config.lut.shift, get(keys.lut_shift).as_deref());
    set_parsed::<TimingRuleName>(&mut config.timing.rule, get(keys.rule).as_deref());
    set_parsed(&mut config.timing.tau_plus, get(keys.tau_plus).as_deref());
    set_parsed(&mut config.timing.tau_minus, get(keys.tau_minus).as_deref());
    set_parsed(&mut config.timing.tau_x, get(keys.tau_x).as_deref());
    set_parsed(&mut config.timing.tau_y, get(keys.tau_y).as_deref());
    set_parsed(&mut config.weight.w_min, get(keys.w_min).as_deref());
    set_parsed(&mut config.weight.w_max, get(keys.w_max).as_deref());
    set_parsed(&mut config.weight.a_plus, get(keys.a_plus).as_deref());
    set_parsed(&mut config.weight.a_minus, get(keys.a_minus).as_deref());

    if let Some(value) = get(keys.log_level) {
        config.logging.level = value.into_owned();
    }
    if let Some(value) = get(keys.log_format) {
        config.logging.format = value.into_owned();
    }
}

/// Names of every overridable field in one override source
struct OverrideKeys {
    timestep_us: &'static str,
    lut_size: &'static str,
    lut_shift: &'static str,
    rule: &'static str,
    tau_plus: &'static str,
    tau_minus: &'static str,
    tau_x: &'static str,
    tau_y: &'static str,
    w_min: &'static str,
    w_max: &'static str,
    a_plus: &'static str,
    a_minus: &'static str,
    log_level: &'static str,
    log_format: &'static str,
}

const ENV_KEYS: OverrideKeys = OverrideKeys {
    timestep_us: "STDP_TIMESTEP_US",
    lut_size: "STDP_LUT_SIZE",
    lut_shift: "STDP_LUT_SHIFT",
    rule: "STDP_TIMING_RULE",
    tau_plus: "STDP_TAU_PLUS",
    tau_minus: "STDP_TAU_MINUS",
    tau_x: "STDP_TAU_X",
    tau_y: "STDP_TAU_Y",
    w_min: "STDP_W_MIN",
    w_max: "STDP_W_MAX",
    a_plus: "STDP_A_PLUS",
    a_minus: "STDP_A_MINUS",
    log_level: "STDP_LOG_LEVEL",
    log_format: "STDP_LOG_FORMAT",
};

const CLI_KEYS: OverrideKeys = OverrideKeys {
    timestep_us: "timestep_us",
    lut_size: "lut_size",
    lut_shift: "lut_shift",
    rule: "rule",
    tau_plus: "tau_plus",
    tau_minus: "tau_minus",
    tau_x: "tau_x",
    tau_y: "tau_y",
    w_min: "w_min",
    w_max: "w_max",
    a_plus: "a_plus",
    a_minus: "a_minus",
    log_level: "log_level",
    log_format: "log_format",
};

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `STDP_TIMESTEP_US` -> `simulation.timestep_us`
/// - `STDP_LUT_SIZE`, `STDP_LUT_SHIFT` -> `lut.size`, `lut.shift`
/// - `STDP_TIMING_RULE` -> `timing.rule`
/// - `STDP_TAU_PLUS`, `STDP_TAU_MINUS`, `STDP_TAU_X`, `STDP_TAU_Y` -> `timing.*`
/// - `STDP_W_MIN`, `STDP_W_MAX`, `STDP_A_PLUS`, `STDP_A_MINUS` -> `weight.*`
/// - `STDP_LOG_LEVEL`, `STDP_LOG_FORMAT` -> `logging.level`, `logging.format`
pub fn apply_environment_overrides(config: &mut StdpConfig) {
    apply_overrides(config, |key| env::var(key).ok().map(Into::into), &ENV_KEYS);
}

/// Apply CLI argument overrides to configuration
///
/// # Arguments
///
/// * `config` - Configuration to modify
/// * `cli_args` - Map of CLI arguments (e.g., `{"rule": "triplet", "tau_y": "120"}`)
pub fn apply_cli_overrides(config: &mut StdpConfig, cli_args: &HashMap<String, String>) {
    apply_overrides(
        config,
        |key| cli_args.get(key).map(|v| v.as_str().into()),
        &CLI_KEYS,
    );
}
