// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Plastic parameter region writer.
//!
//! Loads `stdp_configuration.toml`, builds the configured rule and writes its
//! decay LUTs as the little-endian parameter region the on-chip table loader
//! expects.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use stdp_engine::config::{load_config, validate_config};
use stdp_engine::observability::{debug_flags_help, init_logging, parse_debug_flags};
use tracing::info;

struct Args {
    config: Option<PathBuf>,
    out: PathBuf,
    overrides: HashMap<String, String>,
}

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: write_plastic_params [--config <path>] --out <path> [--set <key>=<value>]...\n\n\
         Defaults:\n\
         - config: $STDP_CONFIG_PATH or ./stdp_configuration.toml (searching parents)\n\n\
         Override keys: timestep_us, lut_size, lut_shift, rule, tau_plus, tau_minus,\n\
         tau_x, tau_y, w_min, w_max, a_plus, a_minus, log_level, log_format\n\n{}",
        debug_flags_help()
    );
    process::exit(2);
}

fn parse_args() -> Args {
    let mut config = None;
    let mut out = None;
    let mut overrides = HashMap::new();

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let v = args.next().unwrap_or_else(|| usage_and_exit());
                config = Some(PathBuf::from(v));
            }
            "--out" => {
                let v = args.next().unwrap_or_else(|| usage_and_exit());
                out = Some(PathBuf::from(v));
            }
            "--set" => {
                let v = args.next().unwrap_or_else(|| usage_and_exit());
                let Some((key, value)) = v.split_once('=') else {
                    eprintln!("Expected <key>=<value>, got: {v}");
                    usage_and_exit();
                };
                overrides.insert(key.trim().to_string(), value.trim().to_string());
            }
            "-h" | "--help" => usage_and_exit(),
            // Consumed by parse_debug_flags
            other if other.starts_with("--debug-") => {}
            other => {
                eprintln!("Unknown argument: {other}");
                usage_and_exit();
            }
        }
    }

    let out = out.unwrap_or_else(|| usage_and_exit());
    Args {
        config,
        out,
        overrides,
    }
}

fn main() -> Result<()> {
    let args = parse_args();

    let config = load_config(args.config.as_deref(), Some(&args.overrides))
        .context("Failed to load STDP configuration")?;
    validate_config(&config)?;

    let options = stdp_engine::logging_options(&config)?;
    let _logging = init_logging(&parse_debug_flags(), &options)?;

    let engine = config
        .build_engine()
        .context("Failed to build STDP rule engine")?;

    let mut region = Vec::with_capacity(engine.params_size_bytes());
    engine.write_plastic_params(&mut region, config.simulation.timestep_us)?;
    fs::write(&args.out, &region)
        .with_context(|| format!("Failed to write {}", args.out.display()))?;

    info!(
        rule = engine.timing().name(),
        bytes = region.len(),
        out = %args.out.display(),
        "Wrote plastic parameter region"
    );
    println!(
        "{} ({}): row size {} bytes, parameter region {} bytes -> {}",
        engine.timing().name(),
        engine.timing().vertex_executable_suffix(),
        engine.row_size_bytes(),
        region.len(),
        args.out.display()
    );

    Ok(())
}
