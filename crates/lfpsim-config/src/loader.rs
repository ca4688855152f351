// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! Three tiers, later ones win:
//! 1. TOML file (base values)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::{ConfigError, ConfigResult, LfpConfig};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "lfpsim_configuration.toml";

/// Find the configuration file
///
/// Search order:
/// 1. `LFPSIM_CONFIG_PATH` environment variable
/// 2. Current working directory: `./lfpsim_configuration.toml`
/// 3. Up to 5 parent directories
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("LFPSIM_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by LFPSIM_CONFIG_PATH not found: {}",
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));
        let mut current = cwd.as_path();
        for _ in 0..5 {
            match current.parent() {
                Some(parent) => {
                    search_paths.push(parent.join(CONFIG_FILE_NAME));
                    current = parent;
                }
                None => break,
            }
        }
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
        "'{}' not found in any of these locations:\n{}\n\nSet LFPSIM_CONFIG_PATH environment variable to specify custom location.",
        CONFIG_FILE_NAME, search_list
    )))
}

/// Load configuration from a TOML file
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, will search for config file.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if the config file is not found or contains invalid TOML.
/// Values are not validated here; call [`crate::validate_config`].
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<LfpConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: LfpConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config)?;
    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli)?;
    }

    Ok(config)
}

fn parse_f64(source: &str, value: &str) -> ConfigResult<f64> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| ConfigError::InvalidValue(format!("{} = '{}' is not a number", source, value)))
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `LFPSIM_LOG_LEVEL` -> `system.log_level`
/// - `LFPSIM_SIGMA` -> `medium.sigma`
/// - `LFPSIM_SAMPLING_PERIOD` -> `sampling_period` of every electrode
/// - `LFPSIM_METHOD` -> `method` of every electrode
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` when a numeric variable does not parse
pub fn apply_environment_overrides(config: &mut LfpConfig) -> ConfigResult<()> {
    if let Ok(value) = env::var("LFPSIM_LOG_LEVEL") {
        config.system.log_level = value;
    }
    if let Ok(value) = env::var("LFPSIM_SIGMA") {
        config.medium.sigma = parse_f64("LFPSIM_SIGMA", &value)?;
    }
    if let Ok(value) = env::var("LFPSIM_SAMPLING_PERIOD") {
        let period = parse_f64("LFPSIM_SAMPLING_PERIOD", &value)?;
        for electrode in &mut config.electrodes {
            electrode.sampling_period = period;
        }
    }
    if let Ok(value) = env::var("LFPSIM_METHOD") {
        for electrode in &mut config.electrodes {
            electrode.method = value.clone();
        }
    }
    Ok(())
}

/// Apply CLI argument overrides to configuration
///
/// Keys: `log_level`, `sigma`, `sampling_period`, `method`, `tstop`, `dt`
pub fn apply_cli_overrides(
    config: &mut LfpConfig,
    cli_args: &HashMap<String, String>,
) -> ConfigResult<()> {
    if let Some(value) = cli_args.get("log_level") {
        config.system.log_level = value.clone();
    }
    if let Some(value) = cli_args.get("sigma") {
        config.medium.sigma = parse_f64("sigma", value)?;
    }
    if let Some(value) = cli_args.get("sampling_period") {
        let period = parse_f64("sampling_period", value)?;
        for electrode in &mut config.electrodes {
            electrode.sampling_period = period;
        }
    }
    if let Some(value) = cli_args.get("method") {
        for electrode in &mut config.electrodes {
            electrode.method = value.clone();
        }
    }
    if let Some(value) = cli_args.get("tstop") {
        config.run.tstop = parse_f64("tstop", value)?;
    }
    if let Some(value) = cli_args.get("dt") {
        config.run.dt = parse_f64("dt", value)?;
    }
    Ok(())
}
