// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Geometry Probe
//!
//! Pure geometry between one compartment (a cylinder between two 3D points)
//! and one electrode position. Every distance handed to a transfer model goes
//! through [`clamp_to_radius`] so an electrode placed inside or touching a
//! compartment never produces a singular resistance.

use serde::{Deserialize, Serialize};

use crate::types::Point3;

/// Static geometry of one compartment, frozen once the simulation starts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompartmentGeometry {
    /// First 3D point (x3d(0) in host terms)
    pub start: Point3,
    /// Second 3D point (x3d(1) in host terms)
    pub end: Point3,
    /// Diameter (µm)
    pub diameter: f64,
}

impl CompartmentGeometry {
    pub fn new(start: Point3, end: Point3, diameter: f64) -> Self {
        Self {
            start,
            end,
            diameter,
        }
    }

    #[inline]
    pub fn radius(&self) -> f64 {
        self.diameter / 2.0
    }

    #[inline]
    pub fn midpoint(&self) -> Point3 {
        self.start.midpoint(self.end)
    }

    /// Axis vector `end - start`
    #[inline]
    pub fn axis(&self) -> Point3 {
        self.end - self.start
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.axis().norm()
    }
}

/// Clamp a distance that falls within a compartment's radius to `radius + margin`.
///
/// A distance of exactly zero is clamped even for zero-diameter compartments.
#[inline]
pub fn clamp_to_radius(distance: f64, radius: f64, margin: f64) -> f64 {
    if distance < radius || distance <= 0.0 {
        radius + margin
    } else {
        distance
    }
}

/// Electrode position expressed in the local frame of a compartment axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineFrame {
    /// Signed longitudinal distance from the `end` point along the axis
    pub longitudinal: f64,
    /// `longitudinal + length`: signed longitudinal distance from the `start` point
    pub far_longitudinal: f64,
    /// Squared perpendicular distance to the axis, clamped when
    /// [`LineFrame::projects_onto_axis`]
    pub radial_squared: f64,
    /// Compartment length (clamped)
    pub length: f64,
}

impl LineFrame {
    /// Whether the electrode's projection falls on the segment `[start, end]`
    pub fn projects_onto_axis(&self) -> bool {
        self.longitudinal <= 0.0 && self.far_longitudinal >= 0.0
    }
}

/// Distances and projections between one compartment and one electrode
#[derive(Debug, Clone, Copy)]
pub struct GeometryProbe {
    geometry: CompartmentGeometry,
    electrode: Point3,
    radius_margin: f64,
}

impl GeometryProbe {
    pub fn new(geometry: CompartmentGeometry, electrode: Point3, radius_margin: f64) -> Self {
        Self {
            geometry,
            electrode,
            radius_margin,
        }
    }

    pub fn geometry(&self) -> &CompartmentGeometry {
        &self.geometry
    }

    /// Unclamped Euclidean distance from the electrode to the compartment midpoint
    pub fn raw_midpoint_distance(&self) -> f64 {
        self.electrode.distance(self.geometry.midpoint())
    }

    /// Electrode-to-midpoint distance, clamped to `radius + margin` inside the cylinder
    pub fn midpoint_distance(&self) -> f64 {
        clamp_to_radius(
            self.raw_midpoint_distance(),
            self.geometry.radius(),
            self.radius_margin,
        )
    }

    /// Compartment length, clamped the same way when shorter than its radius
    pub fn clamped_length(&self) -> f64 {
        clamp_to_radius(
            self.geometry.length(),
            self.geometry.radius(),
            self.radius_margin,
        )
    }

    /// Project the electrode onto the compartment axis.
    ///
    /// The longitudinal distance is measured from `end`, divided by the clamped
    /// length, and the radial part follows from Pythagoras, floored at zero
    /// against rounding. Only an electrode whose projection lands on the
    /// segment has `r²` clamped to `(radius + margin)²` when it is closer to
    /// the axis than the radius. Past either end cap `r²` stays exact, even
    /// on the axis itself.
    pub fn line_frame(&self) -> LineFrame {
        let axis = self.geometry.axis();
        let length = self.clamped_length();

        let from_end = self.electrode - self.geometry.end;
        let longitudinal = from_end.dot(axis) / length;

        let mut frame = LineFrame {
            longitudinal,
            far_longitudinal: longitudinal + length,
            radial_squared: (from_end.norm_squared() - longitudinal * longitudinal).max(0.0),
            length,
        };

        if frame.projects_onto_axis() {
            let radial = frame.radial_squared.sqrt();
            let clamped = clamp_to_radius(radial, self.geometry.radius(), self.radius_margin);
            if clamped != radial {
                frame.radial_squared = clamped * clamped;
            }
        }
        frame
    }
}
