// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! End-to-end recording: TOML file -> electrodes -> demo scene -> reports

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use approx::assert_relative_eq;
use tempfile::TempDir;

use lfpsim::prelude::*;
use lfpsim::electrode::ROOT_RANK;

const CONFIG: &str = r#"
[system]
log_level = "warn"
collective_timeout_ms = 10000

[run]
tstop = 60.0
dt = 0.025

[[electrodes]]
name = "midline"
position = [0.0, 50.0, 0.0]

[[electrodes]]
name = "near_soma1"
position = [-105.0, 20.0, 0.0]
method = "RC"
sampling_period = 0.5
"#;

fn write_config(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("lfpsim_configuration.toml");
    fs::write(&path, CONFIG).unwrap();
    path
}

fn record_rank(
    config: &LfpConfig,
    collective: Arc<dyn Collective>,
) -> Vec<ElectrodeReport> {
    let scene = DemoScene::reciprocal_pair(config.run.tstop);
    let mut host = scene.build_host(collective.rank(), collective.size(), config.run.dt);
    let mut electrodes = electrodes_from_config(config, &mut host, collective).unwrap();

    let mut listeners: Vec<&mut dyn SamplingListener> = electrodes
        .iter_mut()
        .map(|named| &mut named.electrode as &mut dyn SamplingListener)
        .collect();
    FixedStepDriver::new()
        .run(&mut host, &mut listeners, config.run.tstop)
        .unwrap();

    electrodes.iter().map(ElectrodeReport::from).collect()
}

fn load(path: &Path, overrides: Option<&HashMap<String, String>>) -> LfpConfig {
    let config = load_config(Some(path), overrides).unwrap();
    validate_config(&config).unwrap();
    config
}

#[test]
fn test_serial_recording_from_file() {
    let dir = TempDir::new().unwrap();
    let config = load(&write_config(&dir), None);

    let reports = record_rank(&config, Arc::new(SingleProcess));
    assert_eq!(reports.len(), 2);

    let midline = &reports[0];
    assert_eq!(midline.name, "midline");
    assert_eq!(midline.method, TransferMethod::Line);
    assert_eq!(midline.series.values()[0], 0.0);
    // Quiet until the first transient at 10 ms
    assert!(midline
        .series
        .iter()
        .filter(|&(t, _)| t < 10.0)
        .all(|(_, v)| v == 0.0));
    assert!(midline
        .series
        .iter()
        .filter(|&(t, _)| t > 10.0 && t < 12.0)
        .any(|(_, v)| v != 0.0));

    let near = &reports[1];
    assert_eq!(near.method, TransferMethod::Rc);
    assert_relative_eq!(near.sampling_period, 0.5);
    assert!(near.series.len() < midline.series.len());
    assert_relative_eq!(near.series.times()[1], 0.5, epsilon = 1e-9);
}

#[test]
fn test_cli_overrides_shorten_the_run() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir);

    let mut overrides = HashMap::new();
    overrides.insert("tstop".to_string(), "20".to_string());
    let short = load(&path, Some(&overrides));
    assert_relative_eq!(short.run.tstop, 20.0);

    let reports = record_rank(&short, Arc::new(SingleProcess));
    let last = reports[0].series.last().map(|(t, _)| t).unwrap();
    assert!(last <= 20.0);
    assert!(last > 19.0);
}

#[test]
fn test_two_ranks_match_serial() {
    let dir = TempDir::new().unwrap();
    let config = load(&write_config(&dir), None);

    let serial = record_rank(&config, Arc::new(SingleProcess));

    let members = ThreadGroup::create(2, Duration::from_secs(10)).unwrap();
    let handles: Vec<_> = members
        .into_iter()
        .map(|member| {
            let config = config.clone();
            thread::spawn(move || record_rank(&config, Arc::new(member)))
        })
        .collect();
    let mut per_rank: Vec<Vec<ElectrodeReport>> =
        handles.into_iter().map(|h| h.join().unwrap()).collect();
    let root = per_rank.swap_remove(ROOT_RANK);

    for (parallel, expected) in root.iter().zip(&serial) {
        assert_eq!(parallel.rank, ROOT_RANK);
        assert_eq!(parallel.series.times(), expected.series.times());
        for (a, b) in parallel.series.values().iter().zip(expected.series.values()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-12, max_relative = 1e-9);
        }
    }
}

#[test]
fn test_report_json_from_recording() {
    let dir = TempDir::new().unwrap();
    let config = load(&write_config(&dir), None);
    let reports = record_rank(&config, Arc::new(SingleProcess));

    let out_path = dir.path().join("series.json");
    let file = fs::File::create(&out_path).unwrap();
    write_json(&reports, file).unwrap();

    let parsed: Vec<ElectrodeReport> =
        serde_json::from_str(&fs::read_to_string(&out_path).unwrap()).unwrap();
    assert_eq!(parsed.len(), reports.len());
    for (read, written) in parsed.iter().zip(&reports) {
        assert_eq!(read.name, written.name);
        assert_eq!(read.method, written.method);
        assert_eq!(read.series.len(), written.series.len());
        for (a, b) in read.series.values().iter().zip(written.series.values()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-15, max_relative = 1e-12);
        }
    }
}
