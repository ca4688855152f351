// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for electrode operations

use super::ids::{CompartmentId, SegmentId};

/// Error types for LFP electrode setup and collection
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LfpError {
    #[error("Unknown transfer method '{0}': must be one of Point, Line, RC")]
    UnknownMethod(String),

    #[error("Invalid exclusion pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Invalid parameter {name} = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("Collective gather timed out on rank {rank} after {timeout_ms} ms")]
    CollectiveTimeout { rank: usize, timeout_ms: u128 },

    #[error("Collective mismatch: {0}")]
    CollectiveMismatch(String),

    #[error("Unknown segment: {0}")]
    UnknownSegment(SegmentId),

    #[error("Unknown compartment: {0}")]
    UnknownCompartment(CompartmentId),
}

pub type Result<T> = core::result::Result<T, LfpError>;
pub type Error = LfpError;
