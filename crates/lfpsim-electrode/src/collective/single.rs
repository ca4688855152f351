// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Single-process collective

use super::{Collective, ROOT_RANK};
use crate::types::Result;

/// The only process of a serial run
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleProcess;

impl Collective for SingleProcess {
    fn rank(&self) -> usize {
        ROOT_RANK
    }

    fn size(&self) -> usize {
        1
    }

    fn gather_to_root(&self, value: f64) -> Result<Option<Vec<f64>>> {
        Ok(Some(vec![value]))
    }
}
