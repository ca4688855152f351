// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Serializable recordings

use std::io::Write;

use serde::{Deserialize, Serialize};

use lfpsim_electrode::{SampleSeries, TransferMethod};

use crate::setup::NamedElectrode;
use crate::Result;

/// One electrode's recorded series with the settings that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElectrodeReport {
    pub name: String,
    pub position: [f64; 3],
    pub method: TransferMethod,
    pub sampling_period: f64,
    pub rank: usize,
    pub series: SampleSeries,
}

impl From<&NamedElectrode> for ElectrodeReport {
    fn from(named: &NamedElectrode) -> Self {
        let e = &named.electrode;
        let p = e.position();
        Self {
            name: named.name.clone(),
            position: [p.x, p.y, p.z],
            method: e.method(),
            sampling_period: e.sampling_period(),
            rank: e.rank(),
            series: e.series().clone(),
        }
    }
}

/// Write reports as a pretty-printed JSON array
pub fn write_json<W: Write>(reports: &[ElectrodeReport], writer: W) -> Result<()> {
    serde_json::to_writer_pretty(writer, reports)?;
    Ok(())
}
