// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Record the field of the demonstration population.
//!
//! Loads electrodes from a configuration file, runs the two-cell demo scene
//! to the stop time and writes every electrode's series as JSON. With
//! `--ranks N` the cells are split over N in-process ranks and only the root
//! rank's (complete) series are written.

use std::collections::HashMap;
use std::env;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use tracing::info;

use lfpsim::config::{load_config, validate_config, LfpConfig};
use lfpsim::electrode::{
    Collective, FixedStepDriver, LfpError, SamplingListener, SingleProcess, ThreadGroup, ROOT_RANK,
};
use lfpsim::observability::{debug_flags_help, init_logging, parse_debug_flags, LoggingConfig};
use lfpsim::{electrodes_from_config, write_json, DemoScene, ElectrodeReport, LfpsimError};

struct Args {
    config: Option<PathBuf>,
    output: Option<PathBuf>,
    ranks: usize,
    overrides: HashMap<String, String>,
}

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: lfp_record [--config <path>] [--tstop <ms>] [--dt <ms>] [--ranks <n>] \
         [--log-level <level>] [--output <path>] [--debug-<crate>]\n\n\
         Defaults:\n\
         - config: $LFPSIM_CONFIG_PATH or ./lfpsim_configuration.toml\n\
         - tstop, dt: from the [run] section\n\
         - ranks: 1\n\
         - output: stdout\n\n{}",
        debug_flags_help()
    );
    process::exit(2);
}

fn parse_args() -> Args {
    let mut parsed = Args {
        config: None,
        output: None,
        ranks: 1,
        overrides: HashMap::new(),
    };

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let v = args.next().unwrap_or_else(|| usage_and_exit());
                parsed.config = Some(PathBuf::from(v));
            }
            "--output" => {
                let v = args.next().unwrap_or_else(|| usage_and_exit());
                parsed.output = Some(PathBuf::from(v));
            }
            "--ranks" => {
                let v = args.next().unwrap_or_else(|| usage_and_exit());
                parsed.ranks = match v.parse::<usize>() {
                    Ok(n) if n > 0 => n,
                    _ => {
                        eprintln!("--ranks expects a positive integer, got {v}");
                        usage_and_exit();
                    }
                };
            }
            "--tstop" | "--dt" | "--log-level" => {
                let v = args.next().unwrap_or_else(|| usage_and_exit());
                let key = arg.trim_start_matches("--").replace('-', "_");
                parsed.overrides.insert(key, v);
            }
            "-h" | "--help" => usage_and_exit(),
            other if other.starts_with("--debug-") => {}
            other => {
                eprintln!("Unknown argument: {other}");
                usage_and_exit();
            }
        }
    }

    parsed
}

/// Build this rank's host, insert the configured electrodes and run
fn record_rank(
    config: &LfpConfig,
    scene: &DemoScene,
    collective: Arc<dyn Collective>,
) -> Result<Vec<ElectrodeReport>> {
    let mut host = scene.build_host(collective.rank(), collective.size(), config.run.dt);
    let mut electrodes = electrodes_from_config(config, &mut host, Arc::clone(&collective))?;

    let mut listeners: Vec<&mut dyn SamplingListener> = electrodes
        .iter_mut()
        .map(|named| &mut named.electrode as &mut dyn SamplingListener)
        .collect();
    let summary = FixedStepDriver::new()
        .run(&mut host, &mut listeners, config.run.tstop)?;
    info!(
        rank = collective.rank(),
        steps = summary.steps,
        ticks = summary.ticks,
        "rank finished"
    );

    Ok(electrodes.iter().map(ElectrodeReport::from).collect())
}

fn record(config: &LfpConfig, ranks: usize) -> Result<Vec<ElectrodeReport>> {
    let scene = DemoScene::reciprocal_pair(config.run.tstop);

    if ranks == 1 {
        return record_rank(config, &scene, Arc::new(SingleProcess));
    }

    let timeout = Duration::from_millis(config.system.collective_timeout_ms);
    let members = ThreadGroup::create(ranks, timeout)?;
    let handles: Vec<_> = members
        .into_iter()
        .map(|member| {
            let config = config.clone();
            let scene = scene.clone();
            thread::spawn(move || record_rank(&config, &scene, Arc::new(member)))
        })
        .collect();

    let results = handles
        .into_iter()
        .enumerate()
        .map(|(rank, handle)| {
            handle
                .join()
                .unwrap_or_else(|_| Err(anyhow!("rank {} panicked", rank)))
        })
        .collect();
    root_reports(results)
}

fn is_collective_timeout(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<LfpError>(),
        Some(LfpError::CollectiveTimeout { .. })
    ) || matches!(
        err.downcast_ref::<LfpsimError>(),
        Some(LfpsimError::Electrode(LfpError::CollectiveTimeout { .. }))
    )
}

/// Root's reports from every rank's outcome, indexed by rank.
///
/// A rank that fails leaves the others waiting in the gather until they time
/// out, so the first failure that is not a timeout is the one reported.
fn root_reports(results: Vec<Result<Vec<ElectrodeReport>>>) -> Result<Vec<ElectrodeReport>> {
    let ranks = results.len();
    let mut root = None;
    let mut failures = Vec::new();
    for (rank, result) in results.into_iter().enumerate() {
        match result {
            Ok(reports) if rank == ROOT_RANK => root = Some(reports),
            Ok(_) => {}
            Err(err) => failures.push((rank, err)),
        }
    }

    if !failures.is_empty() {
        let cause = failures
            .iter()
            .position(|(_, err)| !is_collective_timeout(err))
            .unwrap_or(0);
        let (rank, err) = failures.swap_remove(cause);
        return Err(err.context(format!("rank {} failed", rank)));
    }
    root.ok_or_else(|| anyhow!("no root rank in a group of {}", ranks))
}

fn run() -> Result<()> {
    let args = parse_args();
    let debug_flags = parse_debug_flags();

    let config = load_config(args.config.as_deref(), Some(&args.overrides))
        .context("Failed to load configuration")?;
    validate_config(&config)?;

    let _logging = init_logging(
        &LoggingConfig::default().with_level(config.system.log_level.clone()),
        &debug_flags,
    )?;
    info!(
        electrodes = config.electrodes.len(),
        tstop = config.run.tstop,
        dt = config.run.dt,
        ranks = args.ranks,
        "recording"
    );

    let reports = record(&config, args.ranks)?;

    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            write_json(&reports, &mut writer)?;
            writer.flush()?;
            info!(path = %path.display(), "series written");
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            write_json(&reports, &mut writer)?;
            writeln!(writer)?;
        }
    }

    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("lfp_record: {e:#}");
        process::exit(1);
    }
}
