// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Collective Communication
//!
//! Multi-process runs split compartments across processes; each process sums
//! its own compartments and the partial sums meet at the root process once per
//! sampling tick. Electrodes receive this capability explicitly instead of
//! reaching for a global communication context.
//!
//! ## Implementations
//! - `SingleProcess`: one process, rank 0
//! - `ThreadGroup`: in-process group where each member is driven by its own thread

pub mod single;
pub mod thread_group;

pub use single::SingleProcess;
pub use thread_group::{GroupMember, ThreadGroup};

use crate::types::Result;

/// Rank that receives gathered values and holds the authoritative series
pub const ROOT_RANK: usize = 0;

/// Process identity and gather-to-root reduction
///
/// Every process must call [`Collective::gather_to_root`] on every sampling
/// tick; a missing participant stalls the root until it times out.
pub trait Collective: Send + Sync {
    /// Identifier of this process
    fn rank(&self) -> usize;

    /// Number of cooperating processes
    fn size(&self) -> usize;

    /// Send `value` to the root. Root receives every process's value in rank
    /// order; other ranks receive `None`.
    fn gather_to_root(&self, value: f64) -> Result<Option<Vec<f64>>>;

    fn is_root(&self) -> bool {
        self.rank() == ROOT_RANK
    }

    fn is_parallel(&self) -> bool {
        self.size() > 1
    }
}
