// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Per-compartment field contribution
//!
//! ```text
//! contribution = Σ_segments  R × i_membrane(segment)
//! ```
//!
//! `R` is computed once from whole-compartment geometry and shared by every
//! sub-segment. Geometry is frozen after setup, so it is never recomputed.

use crate::geometry::CompartmentGeometry;
use crate::host::MembraneCurrents;
use crate::models::{MediumParameters, TransferMethod};
use crate::types::{CompartmentId, Point3, SegmentId};

/// One compartment bound to one electrode
#[derive(Debug, Clone, PartialEq)]
pub struct CompartmentContribution {
    compartment: CompartmentId,
    segments: Vec<SegmentId>,
    transfer_resistance: f64,
}

impl CompartmentContribution {
    pub fn new(
        compartment: CompartmentId,
        segments: Vec<SegmentId>,
        geometry: &CompartmentGeometry,
        electrode: Point3,
        method: TransferMethod,
        medium: &MediumParameters,
    ) -> Self {
        Self {
            compartment,
            segments,
            transfer_resistance: method.transfer_resistance(geometry, electrode, medium),
        }
    }

    pub fn compartment(&self) -> CompartmentId {
        self.compartment
    }

    pub fn segments(&self) -> &[SegmentId] {
        &self.segments
    }

    pub fn transfer_resistance(&self) -> f64 {
        self.transfer_resistance
    }

    /// Instantaneous voltage contribution from the host's current samples
    #[inline]
    pub fn contribution<M: MembraneCurrents + ?Sized>(&self, currents: &M) -> f64 {
        self.segments
            .iter()
            .map(|&segment| self.transfer_resistance * currents.membrane_current(segment))
            .sum()
    }
}
