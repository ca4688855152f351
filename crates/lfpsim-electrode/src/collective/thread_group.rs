// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! In-process collective group
//!
//! Stands in for a multi-process launcher: each member plays one rank and is
//! driven from its own thread. Members deposit their value in a per-rank slot;
//! the root waits until every slot is filled, drains them and wakes anyone
//! waiting to deposit the next round.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use tracing::trace;

use super::{Collective, ROOT_RANK};
use crate::types::{LfpError, Result};

struct GatherState {
    slots: Vec<Option<f64>>,
}

struct Shared {
    timeout: Duration,
    state: Mutex<GatherState>,
    changed: Condvar,
}

/// Factory for a group of in-process ranks
pub struct ThreadGroup;

impl ThreadGroup {
    /// Create `size` members, one per rank, sharing one gather state.
    ///
    /// A gather that cannot complete within `timeout` fails with
    /// [`LfpError::CollectiveTimeout`].
    pub fn create(size: usize, timeout: Duration) -> Result<Vec<GroupMember>> {
        if size == 0 {
            return Err(LfpError::CollectiveMismatch(
                "a collective group needs at least one member".to_string(),
            ));
        }

        let shared = Arc::new(Shared {
            timeout,
            state: Mutex::new(GatherState {
                slots: vec![None; size],
            }),
            changed: Condvar::new(),
        });

        Ok((0..size)
            .map(|rank| GroupMember {
                rank,
                size,
                shared: Arc::clone(&shared),
            })
            .collect())
    }
}

/// One rank of a [`ThreadGroup`]
pub struct GroupMember {
    rank: usize,
    size: usize,
    shared: Arc<Shared>,
}

impl GroupMember {
    fn timeout_error(&self) -> LfpError {
        LfpError::CollectiveTimeout {
            rank: self.rank,
            timeout_ms: self.shared.timeout.as_millis(),
        }
    }
}

impl Collective for GroupMember {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn gather_to_root(&self, value: f64) -> Result<Option<Vec<f64>>> {
        let deadline = Instant::now() + self.shared.timeout;
        let mut state = self.shared.state.lock();

        // Previous round not drained by root yet
        while state.slots[self.rank].is_some() {
            if self.shared.changed.wait_until(&mut state, deadline).timed_out() {
                return Err(self.timeout_error());
            }
        }

        state.slots[self.rank] = Some(value);
        self.shared.changed.notify_all();

        if self.rank != ROOT_RANK {
            return Ok(None);
        }

        while state.slots.iter().any(Option::is_none) {
            if self.shared.changed.wait_until(&mut state, deadline).timed_out() {
                // Withdraw so a retry does not see a stale root value
                state.slots[ROOT_RANK] = None;
                return Err(self.timeout_error());
            }
        }

        let values: Vec<f64> = state.slots.iter_mut().filter_map(Option::take).collect();
        self.shared.changed.notify_all();
        trace!(ranks = values.len(), "gathered partial sums");
        Ok(Some(values))
    }
}
