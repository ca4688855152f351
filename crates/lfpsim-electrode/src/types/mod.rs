// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Electrode Types Module
//!
//! Core type definitions shared by the geometry, model and aggregation layers.

pub mod error;
pub mod ids;
pub mod spatial;

pub use error::{Error, LfpError, Result};
pub use ids::{CompartmentId, SegmentId};
pub use spatial::Point3;
