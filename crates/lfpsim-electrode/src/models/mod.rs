// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Transfer Resistance Models
//!
//! Three closed-form approximations of how a compartment's membrane current
//! shows up at an electrode in a homogeneous conductor.
//!
//! ## Adding a New Method
//!
//! 1. Add a variant to `TransferMethod` and its text tag
//! 2. Write the formula next to `point_source` / `line_source` / `rc_propagation`
//! 3. Add tests

pub mod medium;
pub mod transfer;

pub use medium::{MediumParameters, FAST_MEMBRANE_CURRENT_SCALE, RC_UNIT_SCALE, SOURCE_UNIT_SCALE};
pub use transfer::{line_source, point_source, rc_propagation, TransferMethod};
