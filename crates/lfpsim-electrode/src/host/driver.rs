// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Fixed-step event loop for an [`InMemoryHost`]
//!
//! Plays the host engine's part of the scheduling contract: one
//! initialization callback per run, then periodic callbacks at
//! `offset + k·period` for every listener. A tick is delivered on the first
//! step whose time is within half a timestep of its fire time.

use tracing::{info, trace};

use super::memory::InMemoryHost;
use super::traits::{SamplingListener, SimulationClock};
use crate::types::Result;

/// Counters of one driven run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Timesteps advanced
    pub steps: u64,
    /// Periodic callbacks delivered, over all listeners
    pub ticks: u64,
}

/// Drives an [`InMemoryHost`] and a set of listeners
#[derive(Debug, Default)]
pub struct FixedStepDriver {
    next_fire: Vec<u64>,
}

impl FixedStepDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Initialize and run until `stop_time`
    pub fn run(
        &mut self,
        host: &mut InMemoryHost,
        listeners: &mut [&mut dyn SamplingListener],
        stop_time: f64,
    ) -> Result<RunSummary> {
        self.run_past_stop(host, listeners, stop_time, stop_time)
    }

    /// Initialize with a declared stop time of `stop_time` but keep stepping
    /// until `end_time`, the way a host with a stale stop time overruns.
    pub fn run_past_stop(
        &mut self,
        host: &mut InMemoryHost,
        listeners: &mut [&mut dyn SamplingListener],
        stop_time: f64,
        end_time: f64,
    ) -> Result<RunSummary> {
        host.set_stop_time(stop_time);
        host.initialize();
        for listener in listeners.iter_mut() {
            listener.on_initialize();
        }
        self.next_fire = vec![0; listeners.len()];

        info!(
            stop_time,
            end_time,
            dt = host.timestep(),
            listeners = listeners.len(),
            "simulation run started"
        );

        let half_step = host.timestep() / 2.0;
        let mut summary = RunSummary::default();
        loop {
            summary.ticks += self.deliver_due(host, listeners)?;
            if host.time() >= end_time - half_step {
                break;
            }
            host.advance();
            summary.steps += 1;
        }

        info!(steps = summary.steps, ticks = summary.ticks, "simulation run finished");
        Ok(summary)
    }

    fn deliver_due(
        &mut self,
        host: &InMemoryHost,
        listeners: &mut [&mut dyn SamplingListener],
    ) -> Result<u64> {
        let t = host.time();
        let half_step = host.timestep() / 2.0;
        let mut delivered = 0;

        for (listener, next) in listeners.iter_mut().zip(self.next_fire.iter_mut()) {
            while listener.fire_time(*next) <= t + half_step {
                trace!(t, k = *next, "periodic tick");
                listener.on_tick(host)?;
                *next += 1;
                delivered += 1;
            }
        }

        Ok(delivered)
    }
}
