// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # lfpsim - Local Field Potential Estimation
//!
//! Virtual extracellular electrodes for multi-compartment neuron
//! simulations. This crate re-exports the workspace members and wires them
//! together:
//! - [`electrode`]: transfer resistance models, electrodes, sampling, collectives
//! - [`config`]: TOML configuration with environment and CLI overrides
//! - [`observability`]: logging setup and per-crate debug flags
//! - [`setup`]: electrodes built from a configuration
//! - [`scene`]: a small two-cell demonstration population
//! - [`report`]: serializable recorded series
//!
//! ## Usage
//!
//! ```rust,no_run
//! use lfpsim::prelude::*;
//!
//! let config = load_config(None, None)?;
//! let mut host = DemoScene::default().build_host(0, 1, config.run.dt);
//! let mut electrodes = electrodes_from_config(&config, &mut host, std::sync::Arc::new(SingleProcess))?;
//!
//! let mut listeners: Vec<&mut dyn SamplingListener> = electrodes
//!     .iter_mut()
//!     .map(|e| &mut e.electrode as &mut dyn SamplingListener)
//!     .collect();
//! FixedStepDriver::new().run(&mut host, &mut listeners, config.run.tstop)?;
//! # Ok::<(), lfpsim::LfpsimError>(())
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use lfpsim_config as config;
pub use lfpsim_electrode as electrode;
pub use lfpsim_observability as observability;

pub mod report;
pub mod scene;
pub mod setup;

pub use report::{write_json, ElectrodeReport};
pub use scene::{CellSpec, DemoScene};
pub use setup::{electrodes_from_config, medium_from_config, settings_from_config, NamedElectrode};

use lfpsim_config::ConfigError;
use lfpsim_electrode::LfpError;

/// Errors from building or running electrodes out of a configuration
#[derive(Debug, thiserror::Error)]
pub enum LfpsimError {
    #[error(transparent)]
    Electrode(#[from] LfpError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to write report: {0}")]
    Report(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LfpsimError>;

/// Commonly used items
pub mod prelude {
    pub use crate::config::{load_config, validate_config, LfpConfig};
    pub use crate::electrode::{
        Collective, ElectrodeSettings, FixedStepDriver, InMemoryHost, LfpElectrode,
        SamplingListener, SectionSpec, SingleProcess, ThreadGroup, TransferMethod,
    };
    pub use crate::report::{write_json, ElectrodeReport};
    pub use crate::scene::DemoScene;
    pub use crate::setup::{electrodes_from_config, NamedElectrode};
    pub use crate::{LfpsimError, Result};
}
