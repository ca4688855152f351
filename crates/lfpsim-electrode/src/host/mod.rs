// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Host Simulation Interface
//!
//! - **Traits** (`traits`): the contract a host engine presents to electrodes
//! - **In-memory host** (`memory`): replays caller-supplied membrane currents
//! - **Driver** (`driver`): fixed-step event loop delivering init and periodic callbacks

pub mod driver;
pub mod memory;
pub mod traits;

pub use driver::{FixedStepDriver, RunSummary};
pub use memory::{CurrentFn, InMemoryHost, SectionSpec};
pub use traits::{
    CompartmentCatalog, CompartmentInfo, HostState, MembraneCurrents, SamplingListener,
    SimulationClock,
};

use tracing::debug;

/// Enable fast membrane current mode unless the host already has it.
///
/// Check-then-set: the host is reinitialized only when the mode actually
/// changes. Returns `true` if this call switched it on.
pub fn ensure_fast_membrane_current<C: CompartmentCatalog + ?Sized>(host: &mut C) -> bool {
    if host.fast_membrane_current_enabled() {
        return false;
    }
    host.enable_fast_membrane_current();
    host.reinitialize();
    debug!("fast membrane current mode enabled");
    true
}
