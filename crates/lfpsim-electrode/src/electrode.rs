// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # LFP Electrode
//!
//! Owns every compartment contribution for one electrode position, sums them
//! on each sampling tick, reduces across processes when running in parallel
//! and records the `(time, value)` series.
//!
//! ## Lifecycle
//! 1. `insert`: enable fast membrane currents, bind every non-excluded compartment
//! 2. `on_initialize` (every run start): clear the series, back to `Idle`
//! 3. `on_tick` (every sampling period): `collect` → `Recording`
//!
//! ## Multi-process runs
//! Only the root rank records the full field. Other ranks record their local
//! partial sums: those series are incomplete by construction.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use regex::Regex;
use tracing::{debug, trace, warn};

use crate::collective::{Collective, SingleProcess};
use crate::contribution::CompartmentContribution;
use crate::host::{ensure_fast_membrane_current, CompartmentCatalog, HostState, SamplingListener};
use crate::models::{MediumParameters, TransferMethod};
use crate::scheduler::{SamplingScheduler, TickDecision};
use crate::series::SampleSeries;
use crate::types::{LfpError, Point3, Result};

/// Default sampling period (ms)
pub const DEFAULT_SAMPLING_PERIOD: f64 = 0.1;

/// Compartments whose names match are skipped (non-conductive or structural)
pub const DEFAULT_EXCLUDE_PATTERN: &str = ".*(?:dummy|myelin|node|branch).*";

/// Construction parameters of an electrode
#[derive(Debug, Clone, PartialEq)]
pub struct ElectrodeSettings {
    pub position: Point3,
    /// Sampling period (ms)
    pub sampling_period: f64,
    pub method: TransferMethod,
    /// Matched from the start of each compartment name
    pub exclude_pattern: String,
    pub medium: MediumParameters,
}

impl ElectrodeSettings {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            position: Point3::new(x, y, z),
            sampling_period: DEFAULT_SAMPLING_PERIOD,
            method: TransferMethod::default(),
            exclude_pattern: DEFAULT_EXCLUDE_PATTERN.to_string(),
            medium: MediumParameters::default(),
        }
    }

    pub fn with_sampling_period(mut self, sampling_period: f64) -> Self {
        self.sampling_period = sampling_period;
        self
    }

    pub fn with_method(mut self, method: TransferMethod) -> Self {
        self.method = method;
        self
    }

    /// Select the method by its tag (`"Point"`, `"Line"` or `"RC"`)
    pub fn with_method_tag(mut self, tag: &str) -> Result<Self> {
        self.method = tag.parse()?;
        Ok(self)
    }

    pub fn with_exclude_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_pattern = pattern.into();
        self
    }

    pub fn with_medium(mut self, medium: MediumParameters) -> Self {
        self.medium = medium;
        self
    }
}

/// Compile an exclusion pattern anchored at the start of the name
pub fn compile_exclusion(pattern: &str) -> Result<Regex> {
    Regex::new(&format!("^(?:{})", pattern)).map_err(|e| LfpError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

/// Externally visible slot mirroring the latest aggregate value
#[derive(Debug, Clone, Default)]
pub struct LiveValue(Arc<AtomicU64>);

impl LiveValue {
    pub fn get(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Relaxed))
    }

    fn set(&self, value: f64) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

/// Whether the electrode has accepted a sample since the last initialization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingState {
    Idle,
    Recording,
}

pub struct LfpElectrode {
    position: Point3,
    method: TransferMethod,
    exclude: Regex,
    contributions: Vec<CompartmentContribution>,
    scheduler: SamplingScheduler,
    series: SampleSeries,
    state: RecordingState,
    collective: Arc<dyn Collective>,
    live_value: LiveValue,
}

impl LfpElectrode {
    /// Bind an electrode to every non-excluded compartment of `host`.
    ///
    /// Turns on the host's fast membrane current mode first and synthesizes
    /// geometry for compartments that have none.
    pub fn insert<C>(
        settings: ElectrodeSettings,
        host: &mut C,
        collective: Arc<dyn Collective>,
    ) -> Result<Self>
    where
        C: CompartmentCatalog + ?Sized,
    {
        settings.medium.validate()?;
        let p = settings.position;
        if let Some((name, value)) = [("position.x", p.x), ("position.y", p.y), ("position.z", p.z)]
            .into_iter()
            .find(|(_, v)| !v.is_finite())
        {
            return Err(LfpError::InvalidParameter {
                name,
                value,
                reason: "electrode coordinates must be finite",
            });
        }
        let scheduler = SamplingScheduler::new(settings.sampling_period)?;
        let exclude = compile_exclusion(&settings.exclude_pattern)?;

        ensure_fast_membrane_current(host);

        let mut contributions = Vec::new();
        let mut excluded = 0usize;
        for info in host.compartments() {
            if exclude.is_match(&info.name) {
                trace!(compartment = %info.name, "excluded from LFP");
                excluded += 1;
                continue;
            }

            let geometry = match info.geometry {
                Some(geometry) => geometry,
                None => host.define_shape(info.id)?,
            };

            contributions.push(CompartmentContribution::new(
                info.id,
                info.segments,
                &geometry,
                settings.position,
                settings.method,
                &settings.medium,
            ));
        }

        debug!(
            x = settings.position.x,
            y = settings.position.y,
            z = settings.position.z,
            method = %settings.method,
            compartments = contributions.len(),
            excluded,
            rank = collective.rank(),
            "LFP electrode inserted"
        );

        Ok(Self {
            position: settings.position,
            method: settings.method,
            exclude,
            contributions,
            scheduler,
            series: SampleSeries::new(),
            state: RecordingState::Idle,
            collective,
            live_value: LiveValue::default(),
        })
    }

    /// [`LfpElectrode::insert`] for a serial (single-process) run
    pub fn insert_serial<C>(settings: ElectrodeSettings, host: &mut C) -> Result<Self>
    where
        C: CompartmentCatalog + ?Sized,
    {
        Self::insert(settings, host, Arc::new(SingleProcess))
    }

    pub fn position(&self) -> Point3 {
        self.position
    }

    pub fn method(&self) -> TransferMethod {
        self.method
    }

    pub fn sampling_period(&self) -> f64 {
        self.scheduler.period()
    }

    pub fn contributions(&self) -> &[CompartmentContribution] {
        &self.contributions
    }

    pub fn series(&self) -> &SampleSeries {
        &self.series
    }

    pub fn times(&self) -> &[f64] {
        self.series.times()
    }

    pub fn values(&self) -> &[f64] {
        self.series.values()
    }

    pub fn state(&self) -> RecordingState {
        self.state
    }

    pub fn is_parallel(&self) -> bool {
        self.collective.is_parallel()
    }

    pub fn rank(&self) -> usize {
        self.collective.rank()
    }

    /// Handle to the slot mirroring the latest aggregate (root only)
    pub fn live_value(&self) -> LiveValue {
        self.live_value.clone()
    }

    /// Whether a compartment with this name contributes to the field
    pub fn is_lfp_section(&self, name: &str) -> bool {
        !self.exclude.is_match(name)
    }

    /// Field value at the host's current time.
    ///
    /// At exactly t = 0 the host's first membrane current sample is not
    /// valid yet and the value is defined as 0. In parallel runs every rank
    /// must call this on every tick; root returns the reduced total, other
    /// ranks their local partial sum.
    pub fn compute<H: HostState + ?Sized>(&self, host: &H) -> Result<f64> {
        if host.time() == 0.0 {
            return Ok(0.0);
        }

        let local: f64 = self
            .contributions
            .iter()
            .map(|c| c.contribution(host))
            .sum();

        let mut result = local;
        if self.collective.is_parallel() {
            if let Some(partials) = self.collective.gather_to_root(local)? {
                result = partials.iter().sum();
            }
        }

        if self.collective.is_root() {
            self.live_value.set(result);
        }

        Ok(result)
    }

    /// Handle one periodic fire: decide, then compute and record
    pub fn collect<H: HostState + ?Sized>(&mut self, host: &H) -> Result<TickDecision> {
        let time = host.time();
        let stop_time = host.stop_time();
        let decision =
            self.scheduler
                .decide(time, stop_time, host.timestep(), self.collective.is_root());

        match decision {
            TickDecision::Collect => {
                let value = self.compute(host)?;
                self.series.push(time, value);
                self.state = RecordingState::Recording;
                trace!(time, value, "LFP sample");
            }
            TickDecision::Overrun { report: true } => {
                warn!(
                    time,
                    stop_time,
                    "simulation time is past the stop time; LFP collection stopped. \
                     Set the stop time before running. If both are within rounding \
                     error this can be ignored"
                );
            }
            TickDecision::Overrun { report: false } => {
                debug!(time, stop_time, "LFP collection stopped at stop time");
            }
            TickDecision::SkipFinalTick | TickDecision::Halted => {}
        }

        Ok(decision)
    }

    /// Drop recorded samples; contributions are kept
    pub fn clear(&mut self) {
        self.series.clear();
        self.state = RecordingState::Idle;
        self.scheduler.reset();
    }
}

impl SamplingListener for LfpElectrode {
    fn sampling_period(&self) -> f64 {
        self.scheduler.period()
    }

    fn sampling_offset(&self) -> f64 {
        self.scheduler.offset()
    }

    fn fire_time(&self, k: u64) -> f64 {
        self.scheduler.fire_time(k)
    }

    fn on_initialize(&mut self) {
        self.clear();
    }

    fn on_tick(&mut self, host: &dyn HostState) -> Result<()> {
        self.collect(host).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{InMemoryHost, MembraneCurrents, SectionSpec, SimulationClock};
    use crate::types::SegmentId;

    fn host_with_soma() -> InMemoryHost {
        let mut host = InMemoryHost::new(0.1).with_current_fn(|_, t| if t > 0.0 { 1.0 } else { 1e9 });
        host.add_section(
            SectionSpec::new("soma", 10.0, 10.0)
                .with_points(Point3::ORIGIN, Point3::new(10.0, 0.0, 0.0)),
        );
        host
    }

    #[test]
    fn test_default_exclusion_pattern() {
        let mut host = InMemoryHost::new(0.1);
        host.add_section(SectionSpec::new("soma", 10.0, 10.0));
        host.add_section(SectionSpec::new("axon_myelin[0]", 100.0, 1.0));
        host.add_section(SectionSpec::new("dummy", 1.0, 1.0));
        host.add_section(SectionSpec::new("node[3]", 1.0, 1.0));
        host.add_section(SectionSpec::new("dend", 100.0, 2.0));

        let electrode = LfpElectrode::insert_serial(ElectrodeSettings::new(0.0, 50.0, 0.0), &mut host).unwrap();
        assert_eq!(electrode.contributions().len(), 2);
        assert!(electrode.is_lfp_section("soma"));
        assert!(!electrode.is_lfp_section("cell.branch_7"));
    }

    #[test]
    fn test_insert_synthesizes_shape_and_enables_fast_current() {
        let mut host = InMemoryHost::new(0.1);
        host.add_section(SectionSpec::new("soma", 10.0, 10.0));
        let electrode = LfpElectrode::insert_serial(ElectrodeSettings::new(5.0, 50.0, 0.0), &mut host).unwrap();
        assert!(host.fast_membrane_current_enabled());
        assert!(electrode.contributions()[0].transfer_resistance() > 0.0);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let mut host = InMemoryHost::new(0.1);
        let bad_pattern = ElectrodeSettings::new(0.0, 0.0, 0.0).with_exclude_pattern("(unclosed");
        assert!(matches!(
            LfpElectrode::insert_serial(bad_pattern, &mut host),
            Err(LfpError::InvalidPattern { .. })
        ));

        let bad_period = ElectrodeSettings::new(0.0, 0.0, 0.0).with_sampling_period(0.0);
        assert!(LfpElectrode::insert_serial(bad_period, &mut host).is_err());

        assert_eq!(
            ElectrodeSettings::new(0.0, 0.0, 0.0).with_method_tag("Dipole"),
            Err(LfpError::UnknownMethod("Dipole".to_string()))
        );
    }

    #[test]
    fn test_non_finite_coordinate_named_in_error() {
        let mut host = InMemoryHost::new(0.1);

        let result = LfpElectrode::insert_serial(ElectrodeSettings::new(1.0, f64::INFINITY, f64::NAN), &mut host);
        match result {
            Err(LfpError::InvalidParameter { name, value, .. }) => {
                assert_eq!(name, "position.y");
                assert_eq!(value, f64::INFINITY);
            }
            other => panic!("expected InvalidParameter, got {:?}", other.map(|_| ())),
        }

        let result = LfpElectrode::insert_serial(ElectrodeSettings::new(f64::NAN, 0.0, 0.0), &mut host);
        assert!(matches!(
            result,
            Err(LfpError::InvalidParameter { name: "position.x", value, .. }) if value.is_nan()
        ));
    }

    #[test]
    fn test_listener_fire_times_follow_scheduler() {
        let mut host = InMemoryHost::new(0.1);
        let electrode = LfpElectrode::insert_serial(
            ElectrodeSettings::new(0.0, 50.0, 0.0).with_sampling_period(0.5),
            &mut host,
        )
        .unwrap();
        let listener: &dyn SamplingListener = &electrode;
        assert_eq!(listener.fire_time(0), 0.0);
        assert_eq!(listener.fire_time(3), 1.5);
        assert_eq!(listener.fire_time(7), electrode.scheduler.fire_time(7));
    }

    #[test]
    fn test_first_sample_is_zero() {
        let mut host = host_with_soma();
        let electrode = LfpElectrode::insert_serial(ElectrodeSettings::new(-100.0, 50.0, 0.0), &mut host).unwrap();
        host.initialize();
        assert_eq!(host.membrane_current(SegmentId(0)), 1e9);
        assert_eq!(electrode.compute(&host).unwrap(), 0.0);

        host.advance();
        let value = electrode.compute(&host).unwrap();
        assert_eq!(value, electrode.contributions()[0].transfer_resistance());
        assert_eq!(electrode.live_value().get(), value);
    }

    #[test]
    fn test_collect_and_clear() {
        let mut host = host_with_soma();
        host.set_stop_time(1.0);
        let mut electrode = LfpElectrode::insert_serial(ElectrodeSettings::new(-100.0, 50.0, 0.0), &mut host).unwrap();
        host.initialize();
        assert_eq!(electrode.state(), RecordingState::Idle);

        assert_eq!(electrode.collect(&host).unwrap(), TickDecision::Collect);
        assert_eq!(electrode.state(), RecordingState::Recording);
        assert_eq!(electrode.times(), &[0.0]);
        assert_eq!(electrode.values(), &[0.0]);

        electrode.clear();
        assert!(electrode.series().is_empty());
        assert_eq!(electrode.state(), RecordingState::Idle);
        assert_eq!(electrode.contributions().len(), 1);
        assert_eq!(host.time(), 0.0);
    }
}
