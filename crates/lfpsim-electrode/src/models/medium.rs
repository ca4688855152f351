// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Physical constants of the extracellular medium shared by every transfer method

use serde::{Deserialize, Serialize};

use crate::types::{LfpError, Result};

/// Output-unit factor for the point- and line-source methods (signal in nV)
pub const SOURCE_UNIT_SCALE: f64 = 1e-1;

/// Output-unit factor for the RC method.
///
/// Two orders of magnitude below [`SOURCE_UNIT_SCALE`]; kept as is.
pub const RC_UNIT_SCALE: f64 = 1e-3;

/// Converts a fast membrane current sample into physical current.
/// Applied once by every method.
pub const FAST_MEMBRANE_CURRENT_SCALE: f64 = 100.0;

/// Homogeneous, isotropic conductor parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MediumParameters {
    /// Extracellular conductivity σ (S/m)
    pub sigma: f64,

    /// Specific membrane capacitance (µF/cm², Johnston and Wu 1995)
    pub capacitance: f64,

    /// Signal propagation velocity (µm/ms). Nauhaus et al. 2009 report
    /// 0.24 m/s in monkeys and 0.31 m/s in cats.
    pub velocity: f64,

    /// Added to a compartment's radius when an electrode falls inside it (µm)
    pub radius_margin: f64,
}

impl MediumParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values(sigma: f64, capacitance: f64, velocity: f64, radius_margin: f64) -> Self {
        Self {
            sigma,
            capacitance,
            velocity,
            radius_margin,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let checks: [(&'static str, f64); 4] = [
            ("sigma", self.sigma),
            ("capacitance", self.capacitance),
            ("velocity", self.velocity),
            ("radius_margin", self.radius_margin),
        ];
        for (name, value) in checks {
            if !value.is_finite() || value <= 0.0 {
                return Err(LfpError::InvalidParameter {
                    name,
                    value,
                    reason: "must be finite and greater than zero",
                });
            }
        }
        Ok(())
    }
}

impl Default for MediumParameters {
    fn default() -> Self {
        Self {
            sigma: 0.3,
            capacitance: 1.0,
            velocity: 240.0,
            radius_margin: 0.1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_parameters_validate() {
        assert!(MediumParameters::default().validate().is_ok());
    }

    #[test]
    fn test_non_positive_parameters_rejected() {
        let params = MediumParameters::with_values(0.0, 1.0, 240.0, 0.1);
        assert!(matches!(
            params.validate(),
            Err(LfpError::InvalidParameter { name: "sigma", .. })
        ));

        let params = MediumParameters::with_values(0.3, 1.0, f64::NAN, 0.1);
        assert!(matches!(
            params.validate(),
            Err(LfpError::InvalidParameter { name: "velocity", .. })
        ));

        let params = MediumParameters::with_values(0.3, 1.0, 240.0, 0.0);
        assert!(params.validate().is_err());
    }
}
