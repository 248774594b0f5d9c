use crate::{
    bursts::BurstSegmenter,
    error::{IdealisationResult, SettingsError},
    resolution::ResolutionImposer,
};
use clap::Args;
use dwell_common::{Concentration, DwellTime};
use serde::Deserialize;
use std::{fs::File, io::BufReader, path::Path};

fn default_single_channel_bursts() -> bool {
    true
}

/// Per-record settings. These can be flattened into a command line parser, or
/// read from a kebab-case JSON document.
#[derive(Debug, Clone, PartialEq, Args, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct IdealisationSettings {
    /// Resolution imposed on the record, in seconds.
    #[clap(long)]
    pub resolution: DwellTime,

    /// Shortest shut time separating two bursts, in seconds. The sign is kept
    /// for downstream consumers, segmentation uses the magnitude.
    #[clap(long, allow_hyphen_values = true)]
    pub critical_gap: DwellTime,

    /// Agonist concentration, in molar.
    #[clap(long, default_value_t = 0.0)]
    #[serde(default)]
    pub concentration: Concentration,

    /// Whether each burst is taken to come from a single channel.
    #[clap(long, default_value_t = true, action = clap::ArgAction::Set)]
    #[serde(default = "default_single_channel_bursts")]
    pub single_channel_bursts: bool,
}

impl IdealisationSettings {
    pub fn new(resolution: DwellTime, critical_gap: DwellTime) -> Self {
        Self {
            resolution,
            critical_gap,
            concentration: 0.0,
            single_channel_bursts: true,
        }
    }

    pub fn with_concentration(self, concentration: Concentration) -> Self {
        Self {
            concentration,
            ..self
        }
    }

    /// Checks both thresholds without touching any record.
    pub fn validate(&self) -> IdealisationResult<()> {
        ResolutionImposer::new(self.resolution)?;
        BurstSegmenter::new(self.critical_gap)?;
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_reader(BufReader::new(File::open(path)?))?;
        settings.validate()?;
        Ok(settings)
    }
}
