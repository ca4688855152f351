// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Demonstration population
//!
//! Two short somata 200 µm apart on the x axis, each producing one biphasic
//! membrane current transient: the first cell fires at 10 ms, the second
//! answers 40 ms later, the first answers again 20 ms after that, and so on
//! until the run ends. Cells are dealt round-robin to ranks so a
//! multi-rank run sees each cell on exactly one rank.

use std::f64::consts::PI;

use lfpsim_electrode::{InMemoryHost, Point3, SectionSpec};

/// Duration of one transient (ms)
const TRANSIENT_MS: f64 = 2.0;

/// One cell of the scene
#[derive(Debug, Clone, PartialEq)]
pub struct CellSpec {
    pub name: String,
    pub start: Point3,
    pub end: Point3,
    pub diameter: f64,
    /// Transient onset times (ms)
    pub onsets: Vec<f64>,
    /// Peak membrane current
    pub amplitude: f64,
}

impl CellSpec {
    /// Membrane current at time `t`: one sine period per transient
    pub fn current(&self, t: f64) -> f64 {
        self.onsets
            .iter()
            .filter(|&&onset| t >= onset && t < onset + TRANSIENT_MS)
            .map(|&onset| self.amplitude * (2.0 * PI * (t - onset) / TRANSIENT_MS).sin())
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DemoScene {
    pub cells: Vec<CellSpec>,
}

impl Default for DemoScene {
    fn default() -> Self {
        Self::reciprocal_pair(150.0)
    }
}

impl DemoScene {
    /// Two reciprocally exciting cells, transients up to `tstop`
    pub fn reciprocal_pair(tstop: f64) -> Self {
        let mut first = Vec::new();
        let mut second = Vec::new();
        let mut t = 10.0;
        while t < tstop {
            first.push(t);
            t += 40.0;
            if t < tstop {
                second.push(t);
            }
            t += 20.0;
        }

        let cell = |name: &str, x0: f64, x1: f64, onsets: Vec<f64>| CellSpec {
            name: name.to_string(),
            start: Point3::new(x0, 0.0, 0.0),
            end: Point3::new(x1, 0.0, 0.0),
            diameter: 10.0,
            onsets,
            amplitude: 1.0,
        };

        Self {
            cells: vec![
                cell("soma1", -100.0, -110.0, first),
                cell("soma2", 100.0, 110.0, second),
            ],
        }
    }

    /// Cells simulated by `rank` out of `ranks`
    pub fn cells_for_rank(&self, rank: usize, ranks: usize) -> Vec<&CellSpec> {
        let ranks = ranks.max(1);
        self.cells
            .iter()
            .enumerate()
            .filter(|(i, _)| i % ranks == rank)
            .map(|(_, cell)| cell)
            .collect()
    }

    /// Host holding this rank's cells, one segment per cell
    pub fn build_host(&self, rank: usize, ranks: usize, dt: f64) -> InMemoryHost {
        let cells: Vec<CellSpec> = self
            .cells_for_rank(rank, ranks)
            .into_iter()
            .cloned()
            .collect();

        let waveforms = cells.clone();
        let mut host = InMemoryHost::new(dt).with_current_fn(move |segment, t| {
            waveforms
                .get(segment.0 as usize)
                .map_or(0.0, |cell| cell.current(t))
        });

        for cell in &cells {
            host.add_section(
                SectionSpec::new(cell.name.clone(), cell.start.distance(cell.end), cell.diameter)
                    .with_points(cell.start, cell.end),
            );
        }
        host
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lfpsim_electrode::{MembraneCurrents, SegmentId};

    #[test]
    fn test_reciprocal_onsets() {
        let scene = DemoScene::reciprocal_pair(150.0);
        assert_eq!(scene.cells[0].onsets, vec![10.0, 70.0, 130.0]);
        assert_eq!(scene.cells[1].onsets, vec![50.0, 110.0]);
    }

    #[test]
    fn test_transient_is_biphasic_and_bounded() {
        let cell = &DemoScene::default().cells[0];
        assert_eq!(cell.current(9.9), 0.0);
        assert!(cell.current(10.5) > 0.0);
        assert!(cell.current(11.5) < 0.0);
        assert_eq!(cell.current(12.5), 0.0);
    }

    #[test]
    fn test_cells_dealt_round_robin() {
        let scene = DemoScene::default();
        assert_eq!(scene.cells_for_rank(0, 1).len(), 2);
        assert_eq!(scene.cells_for_rank(0, 2)[0].name, "soma1");
        assert_eq!(scene.cells_for_rank(1, 2)[0].name, "soma2");
        assert!(scene.cells_for_rank(2, 3).is_empty());
    }

    #[test]
    fn test_host_replays_this_ranks_cells() {
        let mut host = DemoScene::default().build_host(1, 2, 0.5);
        assert_eq!(host.section_count(), 1);

        host.initialize();
        for _ in 0..101 {
            host.advance();
        }
        // t = 50.5 ms, inside soma2's first transient
        assert!(host.membrane_current(SegmentId(0)) > 0.0);
    }
}
