// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Electrodes built from an [`LfpConfig`]

use std::sync::Arc;

use tracing::info;

use lfpsim_config::{validate_config, ElectrodeConfig, LfpConfig, MediumConfig};
use lfpsim_electrode::host::ensure_fast_membrane_current;
use lfpsim_electrode::{
    Collective, CompartmentCatalog, ElectrodeSettings, LfpElectrode, MediumParameters,
};

use crate::Result;

/// An electrode and the name it was configured under
pub struct NamedElectrode {
    pub name: String,
    pub electrode: LfpElectrode,
}

pub fn medium_from_config(medium: &MediumConfig) -> MediumParameters {
    MediumParameters::with_values(
        medium.sigma,
        medium.capacitance,
        medium.velocity,
        medium.radius_margin,
    )
}

/// Translate one `[[electrodes]]` entry
pub fn settings_from_config(
    electrode: &ElectrodeConfig,
    medium: MediumParameters,
) -> Result<ElectrodeSettings> {
    let [x, y, z] = electrode.position;
    let mut settings = ElectrodeSettings::new(x, y, z)
        .with_sampling_period(electrode.sampling_period)
        .with_method_tag(&electrode.method)?
        .with_medium(medium);
    if let Some(pattern) = &electrode.exclude_pattern {
        settings = settings.with_exclude_pattern(pattern.clone());
    }
    Ok(settings)
}

/// Validate `config` and insert one electrode per `[[electrodes]]` entry.
///
/// Fast membrane current mode is switched on once, before any electrode is
/// bound, so the host is reinitialized at most one time.
pub fn electrodes_from_config<C>(
    config: &LfpConfig,
    host: &mut C,
    collective: Arc<dyn Collective>,
) -> Result<Vec<NamedElectrode>>
where
    C: CompartmentCatalog + ?Sized,
{
    validate_config(config)?;
    ensure_fast_membrane_current(host);

    let medium = medium_from_config(&config.medium);
    let electrodes = config
        .electrodes
        .iter()
        .map(|entry| -> Result<NamedElectrode> {
            let settings = settings_from_config(entry, medium)?;
            let electrode = LfpElectrode::insert(settings, &mut *host, Arc::clone(&collective))?;
            Ok(NamedElectrode {
                name: entry.name.clone(),
                electrode,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    info!(
        electrodes = electrodes.len(),
        rank = collective.rank(),
        ranks = collective.size(),
        "electrodes inserted from configuration"
    );
    Ok(electrodes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LfpsimError;
    use lfpsim_config::ConfigError;
    use lfpsim_electrode::{InMemoryHost, SectionSpec, SingleProcess, TransferMethod};

    fn config_with(entries: Vec<ElectrodeConfig>) -> LfpConfig {
        LfpConfig {
            electrodes: entries,
            ..Default::default()
        }
    }

    fn entry(name: &str, method: &str) -> ElectrodeConfig {
        ElectrodeConfig {
            name: name.to_string(),
            position: [0.0, 40.0, 0.0],
            method: method.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_settings_from_config() {
        let mut config_entry = entry("tip", "RC");
        config_entry.sampling_period = 0.5;
        config_entry.exclude_pattern = Some("axon.*".to_string());

        let settings = settings_from_config(&config_entry, MediumParameters::default()).unwrap();
        assert_eq!(settings.method, TransferMethod::Rc);
        assert_eq!(settings.sampling_period, 0.5);
        assert_eq!(settings.exclude_pattern, "axon.*");
        assert_eq!(settings.position.y, 40.0);
    }

    #[test]
    fn test_default_pattern_kept_when_unset() {
        let settings =
            settings_from_config(&entry("tip", "Line"), MediumParameters::default()).unwrap();
        assert_eq!(
            settings.exclude_pattern,
            lfpsim_electrode::DEFAULT_EXCLUDE_PATTERN
        );
    }

    #[test]
    fn test_electrodes_from_config_reinitializes_once() {
        let mut host = InMemoryHost::new(0.025);
        host.add_section(SectionSpec::new("soma", 10.0, 10.0));
        let config = config_with(vec![entry("a", "Line"), entry("b", "Point")]);

        let electrodes =
            electrodes_from_config(&config, &mut host, Arc::new(SingleProcess)).unwrap();

        assert_eq!(electrodes.len(), 2);
        assert_eq!(electrodes[0].name, "a");
        assert_eq!(electrodes[1].electrode.method(), TransferMethod::Point);
        assert_eq!(electrodes[0].electrode.contributions().len(), 1);
        assert_eq!(host.initialization_count(), 1);
    }

    #[test]
    fn test_invalid_config_rejected_before_insertion() {
        let mut host = InMemoryHost::new(0.025);
        let config = config_with(vec![entry("a", "Dipole")]);

        let result = electrodes_from_config(&config, &mut host, Arc::new(SingleProcess));
        assert!(matches!(
            result,
            Err(LfpsimError::Config(ConfigError::ValidationError(_)))
        ));
        assert_eq!(host.initialization_count(), 0);
    }
}
