// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! In-memory reference host
//!
//! Holds sections, their segments and a fixed-step clock. It integrates
//! nothing: every step it asks a caller-supplied current function for each
//! segment's membrane current at the new time.

use super::traits::{CompartmentCatalog, CompartmentInfo, MembraneCurrents, SimulationClock};
use crate::geometry::CompartmentGeometry;
use crate::types::{CompartmentId, LfpError, Point3, Result, SegmentId};

/// Membrane current of a segment at a given time
pub type CurrentFn = Box<dyn Fn(SegmentId, f64) -> f64 + Send>;

/// Description of one section to add to an [`InMemoryHost`]
#[derive(Debug, Clone, PartialEq)]
pub struct SectionSpec {
    pub name: String,
    /// Length (µm), used when shape has to be synthesized
    pub length: f64,
    /// Diameter (µm)
    pub diameter: f64,
    /// Number of sub-segments
    pub nseg: u32,
    /// Explicit 3D points, `None` to let `define_shape` lay it out
    pub points: Option<(Point3, Point3)>,
}

impl SectionSpec {
    pub fn new(name: impl Into<String>, length: f64, diameter: f64) -> Self {
        Self {
            name: name.into(),
            length,
            diameter,
            nseg: 1,
            points: None,
        }
    }

    pub fn with_points(mut self, start: Point3, end: Point3) -> Self {
        self.points = Some((start, end));
        self
    }

    pub fn with_nseg(mut self, nseg: u32) -> Self {
        self.nseg = nseg.max(1);
        self
    }
}

struct Section {
    id: CompartmentId,
    name: String,
    length: f64,
    diameter: f64,
    geometry: Option<CompartmentGeometry>,
    segments: Vec<SegmentId>,
}

/// Fixed-step host holding sections and replaying membrane currents
pub struct InMemoryHost {
    dt: f64,
    step: u64,
    stop_time: f64,
    fast_membrane_current: bool,
    initializations: usize,
    sections: Vec<Section>,
    currents: Vec<f64>,
    current_fn: Option<CurrentFn>,
    shape_cursor: f64,
}

impl InMemoryHost {
    pub fn new(dt: f64) -> Self {
        Self {
            dt,
            step: 0,
            stop_time: 0.0,
            fast_membrane_current: false,
            initializations: 0,
            sections: Vec::new(),
            currents: Vec::new(),
            current_fn: None,
            shape_cursor: 0.0,
        }
    }

    /// Drive every segment's membrane current from `f(segment, time)`
    pub fn with_current_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(SegmentId, f64) -> f64 + Send + 'static,
    {
        self.current_fn = Some(Box::new(f));
        self
    }

    /// Add a section and return its identifier
    pub fn add_section(&mut self, spec: SectionSpec) -> CompartmentId {
        let id = CompartmentId(self.sections.len() as u32);
        let segments = (0..spec.nseg)
            .map(|_| {
                let segment = SegmentId(self.currents.len() as u32);
                self.currents.push(0.0);
                segment
            })
            .collect();
        let geometry = spec
            .points
            .map(|(start, end)| CompartmentGeometry::new(start, end, spec.diameter));

        self.sections.push(Section {
            id,
            name: spec.name,
            length: spec.length,
            diameter: spec.diameter,
            geometry,
            segments,
        });
        id
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    pub fn segments(&self, id: CompartmentId) -> Result<&[SegmentId]> {
        self.sections
            .get(id.0 as usize)
            .map(|s| s.segments.as_slice())
            .ok_or(LfpError::UnknownCompartment(id))
    }

    /// Overwrite one segment's current (kept until the current function next runs)
    pub fn set_membrane_current(&mut self, segment: SegmentId, value: f64) -> Result<()> {
        let slot = self
            .currents
            .get_mut(segment.0 as usize)
            .ok_or(LfpError::UnknownSegment(segment))?;
        *slot = value;
        Ok(())
    }

    pub fn set_stop_time(&mut self, stop_time: f64) {
        self.stop_time = stop_time;
    }

    /// Number of times the host has been (re)initialized
    pub fn initialization_count(&self) -> usize {
        self.initializations
    }

    /// Reset the clock to 0 and sample currents at t = 0
    pub fn initialize(&mut self) {
        self.step = 0;
        self.initializations += 1;
        self.refresh_currents();
    }

    /// Advance one timestep and refresh currents
    pub fn advance(&mut self) {
        self.step += 1;
        self.refresh_currents();
    }

    fn refresh_currents(&mut self) {
        let t = self.time();
        if let Some(f) = &self.current_fn {
            for (i, current) in self.currents.iter_mut().enumerate() {
                *current = f(SegmentId(i as u32), t);
            }
        }
    }
}

impl SimulationClock for InMemoryHost {
    fn time(&self) -> f64 {
        self.step as f64 * self.dt
    }

    fn stop_time(&self) -> f64 {
        self.stop_time
    }

    fn timestep(&self) -> f64 {
        self.dt
    }
}

impl MembraneCurrents for InMemoryHost {
    fn membrane_current(&self, segment: SegmentId) -> f64 {
        self.currents.get(segment.0 as usize).copied().unwrap_or(0.0)
    }
}

impl CompartmentCatalog for InMemoryHost {
    fn compartments(&self) -> Vec<CompartmentInfo> {
        self.sections
            .iter()
            .map(|s| CompartmentInfo {
                id: s.id,
                name: s.name.clone(),
                geometry: s.geometry,
                segments: s.segments.clone(),
            })
            .collect()
    }

    /// Lay sections without 3D points end to end along the x axis
    fn define_shape(&mut self, id: CompartmentId) -> Result<CompartmentGeometry> {
        let section = self
            .sections
            .get_mut(id.0 as usize)
            .ok_or(LfpError::UnknownCompartment(id))?;
        if let Some(geometry) = section.geometry {
            return Ok(geometry);
        }

        let start = Point3::new(self.shape_cursor, 0.0, 0.0);
        let end = Point3::new(self.shape_cursor + section.length, 0.0, 0.0);
        self.shape_cursor += section.length;

        let geometry = CompartmentGeometry::new(start, end, section.diameter);
        section.geometry = Some(geometry);
        Ok(geometry)
    }

    fn fast_membrane_current_enabled(&self) -> bool {
        self.fast_membrane_current
    }

    fn enable_fast_membrane_current(&mut self) {
        self.fast_membrane_current = true;
    }

    fn reinitialize(&mut self) {
        self.initialize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sections_and_segments() {
        let mut host = InMemoryHost::new(0.1);
        let soma = host.add_section(SectionSpec::new("soma", 10.0, 10.0));
        let dend = host.add_section(SectionSpec::new("dend", 100.0, 2.0).with_nseg(3));

        assert_eq!(host.section_count(), 2);
        assert_eq!(host.segments(soma).unwrap(), &[SegmentId(0)]);
        assert_eq!(host.segments(dend).unwrap().len(), 3);
        assert!(host.segments(CompartmentId(9)).is_err());
    }

    #[test]
    fn test_define_shape_lays_sections_along_x() {
        let mut host = InMemoryHost::new(0.1);
        let a = host.add_section(SectionSpec::new("a", 10.0, 2.0));
        let b = host.add_section(SectionSpec::new("b", 5.0, 1.0));

        let ga = host.define_shape(a).unwrap();
        let gb = host.define_shape(b).unwrap();
        assert_eq!(ga.end, Point3::new(10.0, 0.0, 0.0));
        assert_eq!(gb.start, Point3::new(10.0, 0.0, 0.0));
        assert_eq!(gb.end, Point3::new(15.0, 0.0, 0.0));

        // Shape is synthesized once
        assert_eq!(host.define_shape(a).unwrap(), ga);
    }

    #[test]
    fn test_current_fn_refreshes_on_advance() {
        let mut host = InMemoryHost::new(0.5).with_current_fn(|seg, t| seg.0 as f64 + t);
        host.add_section(SectionSpec::new("soma", 10.0, 10.0).with_nseg(2));

        host.initialize();
        assert_eq!(host.membrane_current(SegmentId(1)), 1.0);

        host.advance();
        assert_eq!(host.time(), 0.5);
        assert_eq!(host.membrane_current(SegmentId(0)), 0.5);
        assert_eq!(host.membrane_current(SegmentId(1)), 1.5);
    }

    #[test]
    fn test_set_membrane_current() {
        let mut host = InMemoryHost::new(0.1);
        host.add_section(SectionSpec::new("soma", 10.0, 10.0));
        host.set_membrane_current(SegmentId(0), 2.5).unwrap();
        assert_eq!(host.membrane_current(SegmentId(0)), 2.5);
        assert_eq!(
            host.set_membrane_current(SegmentId(4), 1.0),
            Err(LfpError::UnknownSegment(SegmentId(4)))
        );
    }
}
