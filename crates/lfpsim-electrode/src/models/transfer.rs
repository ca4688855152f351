// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Transfer Resistance Methods
//!
//! A transfer resistance converts one compartment's membrane current into its
//! voltage contribution at one electrode.
//!
//! ```text
//! Point:  R = 1 / (4π·σ·d)                              × 1e-1 × 100
//! Line:   R = ln(φ) / (4π·σ·L)                          × 1e-1 × 100
//! RC:     R = exp(-(d / velocity) / (σ·capacitance))    × 1e-3 × 100
//!
//! d = clamped electrode-to-midpoint distance
//! L = clamped compartment length
//! φ = line-source ratio (see `line_source`)
//! ```

use core::f64::consts::PI;
use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use super::medium::{
    MediumParameters, FAST_MEMBRANE_CURRENT_SCALE, RC_UNIT_SCALE, SOURCE_UNIT_SCALE,
};
use crate::geometry::{CompartmentGeometry, GeometryProbe};
use crate::types::{LfpError, Point3};

/// Closed set of transfer resistance approximations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TransferMethod {
    /// Whole compartment as a point source at its midpoint
    Point,
    /// Compartment as a uniform line source along its axis
    #[default]
    Line,
    /// Exponential attenuation by propagation delay
    #[serde(rename = "RC")]
    Rc,
}

impl TransferMethod {
    pub const ALL: [TransferMethod; 3] = [TransferMethod::Point, TransferMethod::Line, TransferMethod::Rc];

    /// Tag accepted by [`FromStr`]
    pub fn tag(&self) -> &'static str {
        match self {
            TransferMethod::Point => "Point",
            TransferMethod::Line => "Line",
            TransferMethod::Rc => "RC",
        }
    }

    /// Transfer resistance of `geometry` as seen from `electrode`
    pub fn transfer_resistance(
        &self,
        geometry: &CompartmentGeometry,
        electrode: Point3,
        medium: &MediumParameters,
    ) -> f64 {
        let probe = GeometryProbe::new(*geometry, electrode, medium.radius_margin);
        let resistance = match self {
            TransferMethod::Point => point_source(&probe, medium),
            TransferMethod::Line => line_source(&probe, medium),
            TransferMethod::Rc => rc_propagation(&probe, medium),
        };
        resistance * FAST_MEMBRANE_CURRENT_SCALE
    }
}

impl fmt::Display for TransferMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for TransferMethod {
    type Err = LfpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Point" => Ok(TransferMethod::Point),
            "Line" => Ok(TransferMethod::Line),
            "RC" => Ok(TransferMethod::Rc),
            other => Err(LfpError::UnknownMethod(other.to_string())),
        }
    }
}

/// Point-source resistance in output units, before the fast-current factor
pub fn point_source(probe: &GeometryProbe, medium: &MediumParameters) -> f64 {
    let distance = probe.midpoint_distance();
    SOURCE_UNIT_SCALE / (4.0 * PI * distance * medium.sigma)
}

/// Line-source resistance in output units, before the fast-current factor.
///
/// With `h` the longitudinal distance from the end point and `l = h + L`:
///
/// ```text
/// h < 0 and l <= 0:  φ = (√(h²+r²) - h) / (√(l²+r²) - l)
/// h > 0 and l > 0:   φ = (√(l²+r²) + l) / (√(h²+r²) + h)
/// otherwise:         φ = (√(l²+r²) + l)·(√(h²+r²) - h) / r²
/// ```
///
/// Each branch only adds same-signed terms, which keeps the ratio away from
/// cancellation near either end point.
pub fn line_source(probe: &GeometryProbe, medium: &MediumParameters) -> f64 {
    let frame = probe.line_frame();
    let h = frame.longitudinal;
    let l = frame.far_longitudinal;
    let r_sq = frame.radial_squared;

    let phi = if h < 0.0 && l <= 0.0 {
        let top = (h * h + r_sq).sqrt() - h;
        let bottom = (l * l + r_sq).sqrt() - l;
        top / bottom
    } else if h > 0.0 && l > 0.0 {
        let top = (l * l + r_sq).sqrt() + l;
        let bottom = (h * h + r_sq).sqrt() + h;
        top / bottom
    } else {
        let a = (l * l + r_sq).sqrt() + l;
        let b = (h * h + r_sq).sqrt() - h;
        (a * b) / r_sq
    };

    SOURCE_UNIT_SCALE * phi.ln() / (4.0 * PI * frame.length * medium.sigma)
}

/// RC-attenuation resistance in output units, before the fast-current factor
pub fn rc_propagation(probe: &GeometryProbe, medium: &MediumParameters) -> f64 {
    let distance = probe.midpoint_distance();
    let rc = medium.sigma * medium.capacitance;
    let time_constant = distance / medium.velocity;
    RC_UNIT_SCALE * (-time_constant / rc).exp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn soma() -> CompartmentGeometry {
        CompartmentGeometry::new(Point3::new(0.0, 0.0, 0.0), Point3::new(10.0, 0.0, 0.0), 10.0)
    }

    #[test]
    fn test_parse_method_tags() {
        assert_eq!("Point".parse::<TransferMethod>(), Ok(TransferMethod::Point));
        assert_eq!("Line".parse::<TransferMethod>(), Ok(TransferMethod::Line));
        assert_eq!("RC".parse::<TransferMethod>(), Ok(TransferMethod::Rc));
        assert_eq!(
            "line".parse::<TransferMethod>(),
            Err(LfpError::UnknownMethod("line".to_string()))
        );
        assert_eq!(TransferMethod::default(), TransferMethod::Line);
    }

    #[test]
    fn test_point_source_value() {
        let medium = MediumParameters::default();
        let r = TransferMethod::Point.transfer_resistance(&soma(), Point3::new(5.0, 100.0, 0.0), &medium);
        // 1 / (4π · 100 · 0.3) · 0.1 · 100
        assert_relative_eq!(r, 10.0 / (4.0 * PI * 100.0 * 0.3), max_relative = 1e-12);
    }

    #[test]
    fn test_rc_value() {
        let medium = MediumParameters::default();
        let r = TransferMethod::Rc.transfer_resistance(&soma(), Point3::new(5.0, 120.0, 0.0), &medium);
        // exp(-(120 / 240) / 0.3) · 1e-3 · 100
        assert_relative_eq!(r, 0.1 * (-0.5f64 / 0.3).exp(), max_relative = 1e-12);
    }

    #[test]
    fn test_line_source_straddling_branch() {
        let medium = MediumParameters::default();
        // Perpendicular above the midpoint: h = -5, l = 5, r = 20
        let r = TransferMethod::Line.transfer_resistance(&soma(), Point3::new(5.0, 20.0, 0.0), &medium);
        let s = (25.0f64 + 400.0).sqrt();
        let phi = ((s + 5.0) * (s + 5.0)) / 400.0;
        assert_relative_eq!(r, 10.0 * phi.ln() / (4.0 * PI * 10.0 * 0.3), max_relative = 1e-12);
    }

    #[test]
    fn test_line_source_branches_agree_with_mirror_image() {
        // Beyond the end point and beyond the start point are mirror images
        let medium = MediumParameters::default();
        let past_end = TransferMethod::Line.transfer_resistance(&soma(), Point3::new(30.0, 8.0, 0.0), &medium);
        let before_start =
            TransferMethod::Line.transfer_resistance(&soma(), Point3::new(-20.0, 8.0, 0.0), &medium);
        assert!(past_end > 0.0);
        assert_relative_eq!(past_end, before_start, max_relative = 1e-9);
    }

    #[test]
    fn test_line_source_on_axis_past_end_caps() {
        // r = 0 outside the cylinder: φ reduces to l / h
        let medium = MediumParameters::default();
        let expected = |h: f64, l: f64| 10.0 * (l / h).ln() / (4.0 * PI * 10.0 * 0.3);

        let near_cap = TransferMethod::Line.transfer_resistance(&soma(), Point3::new(10.5, 0.0, 0.0), &medium);
        assert_relative_eq!(near_cap, expected(0.5, 10.5), max_relative = 1e-12);

        let past_end = TransferMethod::Line.transfer_resistance(&soma(), Point3::new(12.0, 0.0, 0.0), &medium);
        assert_relative_eq!(past_end, expected(2.0, 12.0), max_relative = 1e-12);

        let before_start =
            TransferMethod::Line.transfer_resistance(&soma(), Point3::new(-2.0, 0.0, 0.0), &medium);
        assert_relative_eq!(before_start, past_end, max_relative = 1e-12);
    }

    #[test]
    fn test_line_approaches_point_far_away() {
        let medium = MediumParameters::default();
        let far = Point3::new(5.0, 5_000.0, 0.0);
        let line = TransferMethod::Line.transfer_resistance(&soma(), far, &medium);
        let point = TransferMethod::Point.transfer_resistance(&soma(), far, &medium);
        assert_relative_eq!(line, point, max_relative = 1e-4);
    }

    #[test]
    fn test_electrode_at_midpoint_is_finite() {
        let medium = MediumParameters::default();
        let center = soma().midpoint();
        for method in TransferMethod::ALL {
            let r = method.transfer_resistance(&soma(), center, &medium);
            assert!(r.is_finite() && r > 0.0, "{} gave {}", method, r);
        }
    }

    #[test]
    fn test_methods_differ() {
        let medium = MediumParameters::default();
        let e = Point3::new(100.0, 50.0, 0.0);
        let values: Vec<f64> = TransferMethod::ALL
            .iter()
            .map(|m| m.transfer_resistance(&soma(), e, &medium))
            .collect();
        assert_ne!(values[0], values[1]);
        assert_ne!(values[1], values[2]);
        assert_ne!(values[0], values[2]);
    }
}
