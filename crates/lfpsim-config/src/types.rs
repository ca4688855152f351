// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! Structs mapping to the sections of `lfpsim_configuration.toml`:
//!
//! ```toml
//! [system]
//! log_level = "info"
//!
//! [run]
//! tstop = 100.0
//! dt = 0.025
//!
//! [medium]
//! sigma = 0.3
//!
//! [[electrodes]]
//! name = "shank0"
//! position = [10.0, 50.0, 0.0]
//! method = "Line"
//! ```

use serde::{Deserialize, Serialize};

/// Transfer method tags accepted in `electrodes.method`
pub const KNOWN_METHODS: &[&str] = &["Point", "Line", "RC"];

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LfpConfig {
    pub system: SystemConfig,
    pub run: RunConfig,
    pub medium: MediumConfig,
    pub electrodes: Vec<ElectrodeConfig>,
}

/// System-level configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SystemConfig {
    pub log_level: String,
    /// Gather-to-root timeout for multi-rank runs (ms)
    pub collective_timeout_ms: u64,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            collective_timeout_ms: 30_000,
        }
    }
}

/// Simulation run parameters used by the recording tool
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RunConfig {
    /// Stop time (ms)
    pub tstop: f64,
    /// Integration timestep (ms)
    pub dt: f64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            tstop: 100.0,
            dt: 0.025,
        }
    }
}

/// Extracellular medium constants shared by every electrode
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MediumConfig {
    /// Extracellular conductivity (S/m)
    pub sigma: f64,
    /// Membrane capacitance (µF/cm²)
    pub capacitance: f64,
    /// Propagation velocity (µm/ms)
    pub velocity: f64,
    /// Added to a compartment's radius when a distance is clamped (µm)
    pub radius_margin: f64,
}

impl Default for MediumConfig {
    fn default() -> Self {
        Self {
            sigma: 0.3,
            capacitance: 1.0,
            velocity: 240.0,
            radius_margin: 0.1,
        }
    }
}

/// One `[[electrodes]]` entry
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ElectrodeConfig {
    pub name: String,
    /// (x, y, z) in µm
    pub position: [f64; 3],
    /// Sampling period (ms)
    pub sampling_period: f64,
    /// One of [`KNOWN_METHODS`]
    pub method: String,
    /// Exclusion pattern, `None` for the electrode default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_pattern: Option<String>,
}

impl Default for ElectrodeConfig {
    fn default() -> Self {
        Self {
            name: "electrode".to_string(),
            position: [0.0, 0.0, 0.0],
            sampling_period: 0.1,
            method: "Line".to_string(),
            exclude_pattern: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config: LfpConfig = toml::from_str("").unwrap();
        assert_eq!(config, LfpConfig::default());
        assert!(config.electrodes.is_empty());
        assert_eq!(config.medium.sigma, 0.3);
    }

    #[test]
    fn test_electrode_entries() {
        let config: LfpConfig = toml::from_str(
            r#"
            [[electrodes]]
            name = "a"
            position = [1.0, 2.0, 3.0]

            [[electrodes]]
            name = "b"
            position = [0.0, 100.0, 0.0]
            method = "RC"
            sampling_period = 0.5
            exclude_pattern = "axon.*"
            "#,
        )
        .unwrap();

        assert_eq!(config.electrodes.len(), 2);
        assert_eq!(config.electrodes[0].method, "Line");
        assert_eq!(config.electrodes[0].exclude_pattern, None);
        assert_eq!(config.electrodes[1].position, [0.0, 100.0, 0.0]);
        assert_eq!(config.electrodes[1].sampling_period, 0.5);
        assert_eq!(config.electrodes[1].exclude_pattern.as_deref(), Some("axon.*"));
    }

    #[test]
    fn test_serializes_as_json() {
        let json = serde_json::to_value(ElectrodeConfig::default()).unwrap();
        assert_eq!(json["method"], "Line");
        assert!(json.get("exclude_pattern").is_none());
    }
}
