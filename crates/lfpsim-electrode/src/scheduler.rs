// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Sampling Scheduler
//!
//! Periodic tick source for one electrode. Fires at `offset + k·period` for an
//! unbounded `k`, and decides per fire whether the electrode may collect.
//!
//! ```text
//! t > T_stop                  → Overrun: halt collection until the next init
//! t > T_stop - period         → SkipFinalTick
//! otherwise                   → Collect
//! ```
//!
//! The final tick is skipped because under multi-process execution it is not
//! reliably delivered on every process, and a missing participant stalls the
//! gather. This only works when the stop time is set before each run.

use crate::types::{LfpError, Result};

/// Outcome of one periodic fire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickDecision {
    /// Compute and record a sample
    Collect,
    /// Within one sampling period of the stop time
    SkipFinalTick,
    /// First fire past the stop time; `report` when it is more than rounding
    Overrun { report: bool },
    /// Already halted by an earlier overrun
    Halted,
}

#[derive(Debug, Clone)]
pub struct SamplingScheduler {
    period: f64,
    offset: f64,
    halted: bool,
}

impl SamplingScheduler {
    pub fn new(period: f64) -> Result<Self> {
        Self::with_offset(period, 0.0)
    }

    pub fn with_offset(period: f64, offset: f64) -> Result<Self> {
        if !period.is_finite() || period <= 0.0 {
            return Err(LfpError::InvalidParameter {
                name: "sampling_period",
                value: period,
                reason: "must be finite and greater than zero",
            });
        }
        Ok(Self {
            period,
            offset,
            halted: false,
        })
    }

    pub fn period(&self) -> f64 {
        self.period
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Time of the `k`-th fire, computed directly so rounding does not accumulate
    pub fn fire_time(&self, k: u64) -> f64 {
        self.offset + k as f64 * self.period
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Release the overrun latch at simulation (re)initialization
    pub fn reset(&mut self) {
        self.halted = false;
    }

    /// Decide what the fire at time `t` does.
    ///
    /// An overrun within one timestep of the stop time is rounding and is not
    /// reported. Only the root process reports.
    pub fn decide(&mut self, t: f64, stop_time: f64, dt: f64, is_root: bool) -> TickDecision {
        if self.halted {
            return TickDecision::Halted;
        }

        if t > stop_time {
            self.halted = true;
            let beyond_rounding = t - stop_time > dt;
            return TickDecision::Overrun {
                report: beyond_rounding && is_root,
            };
        }

        if t > stop_time - self.period {
            return TickDecision::SkipFinalTick;
        }

        TickDecision::Collect
    }
}
