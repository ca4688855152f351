// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Host simulation contract
//!
//! The electrical simulation engine is an external collaborator. Electrodes
//! only see it through these traits:
//! - `SimulationClock`: current time, declared stop time, timestep
//! - `MembraneCurrents`: live per-segment membrane current, refreshed by the host every step
//! - `CompartmentCatalog`: compartment enumeration, shape synthesis, fast-current mode
//! - `SamplingListener`: what the host's event loop calls back into

use crate::geometry::CompartmentGeometry;
use crate::types::{CompartmentId, Result, SegmentId};

/// Global simulation clock
pub trait SimulationClock {
    /// Current simulation time (ms)
    fn time(&self) -> f64;

    /// Declared stop time (ms)
    fn stop_time(&self) -> f64;

    /// Integration timestep (ms)
    fn timestep(&self) -> f64;
}

/// Read-only view of the host's live membrane currents
pub trait MembraneCurrents {
    /// Latest fast membrane current sample of one segment
    fn membrane_current(&self, segment: SegmentId) -> f64;
}

/// Everything an electrode reads while sampling
pub trait HostState: SimulationClock + MembraneCurrents {}

impl<T: SimulationClock + MembraneCurrents + ?Sized> HostState for T {}

/// One compartment as enumerated by the host
#[derive(Debug, Clone, PartialEq)]
pub struct CompartmentInfo {
    pub id: CompartmentId,
    /// Name matched against an electrode's exclusion pattern
    pub name: String,
    /// 3D geometry, `None` when the host has no 3D points for it yet
    pub geometry: Option<CompartmentGeometry>,
    /// Sub-segments, each with its own live membrane current
    pub segments: Vec<SegmentId>,
}

/// Setup-time access to the host's compartments
pub trait CompartmentCatalog {
    /// Enumerate every compartment this process simulates
    fn compartments(&self) -> Vec<CompartmentInfo>;

    /// Synthesize default 3D geometry for a compartment that has none
    fn define_shape(&mut self, id: CompartmentId) -> Result<CompartmentGeometry>;

    /// Whether fast membrane current computation is on
    fn fast_membrane_current_enabled(&self) -> bool;

    /// Turn fast membrane current computation on (process-wide)
    fn enable_fast_membrane_current(&mut self);

    /// Re-run the host's initialization so the new mode takes effect
    fn reinitialize(&mut self);
}

/// Callbacks the host's event loop delivers to a sampling component
pub trait SamplingListener {
    /// Period of the periodic callback (ms)
    fn sampling_period(&self) -> f64;

    /// Time of the first periodic callback (ms)
    fn sampling_offset(&self) -> f64 {
        0.0
    }

    /// Time of the `k`-th periodic callback
    fn fire_time(&self, k: u64) -> f64 {
        self.sampling_offset() + k as f64 * self.sampling_period()
    }

    /// Called once per simulation (re)initialization
    fn on_initialize(&mut self);

    /// Called on every periodic fire
    fn on_tick(&mut self, host: &dyn HostState) -> Result<()>;
}
