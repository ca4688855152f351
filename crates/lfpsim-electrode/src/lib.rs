// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # LFP Electrodes
//!
//! Estimates the extracellular local field potential a virtual electrode
//! would record next to a simulated multi-compartment neuron population:
//! - **Models**: point source, line source and RC propagation transfer resistances
//! - **Geometry**: compartment endpoints, midpoint distance, near-field clamping
//! - **Electrode**: per-compartment contributions, summing, recording
//! - **Scheduler**: periodic ticks and end-of-run handling
//! - **Collective**: gather-to-root reduction for multi-process runs
//! - **Host**: the seams to the simulation engine, plus an in-memory host
//!
//! ## Example
//! ```
//! use lfpsim_electrode::{ElectrodeSettings, FixedStepDriver, InMemoryHost, LfpElectrode, SectionSpec};
//!
//! let mut host = InMemoryHost::new(0.025).with_current_fn(|_, t| if t > 1.0 { 0.5 } else { 0.0 });
//! host.add_section(SectionSpec::new("soma", 20.0, 20.0));
//!
//! let mut electrode = LfpElectrode::insert_serial(ElectrodeSettings::new(10.0, 50.0, 0.0), &mut host)?;
//! FixedStepDriver::new().run(&mut host, &mut [&mut electrode], 5.0)?;
//!
//! assert_eq!(electrode.times().len(), electrode.values().len());
//! # Ok::<(), lfpsim_electrode::LfpError>(())
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod types;

pub mod geometry;
pub mod models;

pub mod contribution;
pub mod electrode;
pub mod scheduler;
pub mod series;

pub mod collective;
pub mod host;

pub use collective::{Collective, GroupMember, SingleProcess, ThreadGroup, ROOT_RANK};
pub use contribution::CompartmentContribution;
pub use electrode::{
    compile_exclusion, ElectrodeSettings, LfpElectrode, LiveValue, RecordingState,
    DEFAULT_EXCLUDE_PATTERN, DEFAULT_SAMPLING_PERIOD,
};
pub use geometry::{CompartmentGeometry, GeometryProbe};
pub use host::{
    CompartmentCatalog, CompartmentInfo, FixedStepDriver, HostState, InMemoryHost,
    MembraneCurrents, RunSummary, SamplingListener, SectionSpec, SimulationClock,
};
pub use models::{MediumParameters, TransferMethod};
pub use scheduler::{SamplingScheduler, TickDecision};
pub use series::SampleSeries;
pub use types::{CompartmentId, Error, LfpError, Point3, Result, SegmentId};
