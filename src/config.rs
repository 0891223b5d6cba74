use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::polling::{BACKOFF_CUTOFF_SECS, BACKOFF_FACTOR, INITIAL_BACKOFF_SECS};
use crate::errors::PipelineError;
use crate::validator::{GenericValidator, GeospatialValidator, RecordValidator, TemporalValidator};

/// Pipeline phase at which a dry run stops assembling stages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DryRunPhase {
    /// Stop after the configuration generator (and its counter).
    Configuration,
    /// Stop after records are built.
    Build,
    /// Stop after records are validated.
    Validate,
}

impl FromStr for DryRunPhase {
    type Err = PipelineError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "configuration" => Ok(Self::Configuration),
            "build" => Ok(Self::Build),
            "validate" => Ok(Self::Validate),
            other => Err(PipelineError::Configuration(format!(
                "unknown dry-run phase `{other}` (expected configuration, build, or validate)"
            ))),
        }
    }
}

impl fmt::Display for DryRunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Configuration => "configuration",
            Self::Build => "build",
            Self::Validate => "validate",
        })
    }
}

/// Kind of dataset; selects the default validator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DatasetType {
    #[default]
    Generic,
    Temporal,
    Geospatial,
}

impl DatasetType {
    /// Default validator for records of this dataset type.
    pub fn validator(self, model: bool) -> Box<dyn RecordValidator> {
        match self {
            DatasetType::Generic => Box::new(GenericValidator::new(model)),
            DatasetType::Temporal => Box::new(TemporalValidator::new(model)),
            DatasetType::Geospatial => Box::new(GeospatialValidator::new(model)),
        }
    }

    /// Wire name (`GENERIC`, `TEMPORAL`, `GEOSPATIAL`).
    pub fn name(self) -> &'static str {
        match self {
            DatasetType::Generic => "GENERIC",
            DatasetType::Temporal => "TEMPORAL",
            DatasetType::Geospatial => "GEOSPATIAL",
        }
    }
}

impl fmt::Display for DatasetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DatasetType {
    type Err = PipelineError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        [Self::Generic, Self::Temporal, Self::Geospatial]
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(value))
            .ok_or_else(|| PipelineError::Configuration(format!("unknown dataset type `{value}`")))
    }
}

/// Exponential backoff used while polling for prediction results.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackoffPolicy {
    /// First delay.
    pub initial: Duration,
    /// Largest delay that is still slept; polling stops once the next delay exceeds it.
    pub cutoff: Duration,
    /// Multiplier applied after each round. Values below 2 are treated as 2.
    pub factor: u32,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            initial: Duration::from_secs(INITIAL_BACKOFF_SECS),
            cutoff: Duration::from_secs(BACKOFF_CUTOFF_SECS),
            factor: BACKOFF_FACTOR,
        }
    }
}

impl BackoffPolicy {
    /// Delays in order: `initial`, `initial * factor`, ... up to and including `cutoff`.
    pub fn delays(&self) -> impl Iterator<Item = Duration> + use<> {
        let cutoff = self.cutoff;
        let factor = self.factor.max(2);
        let mut next = Some(self.initial).filter(|delay| !delay.is_zero());
        std::iter::from_fn(move || {
            let current = next.filter(|delay| *delay <= cutoff)?;
            next = current.checked_mul(factor);
            Some(current)
        })
    }
}

/// Top-level pipeline configuration.
#[derive(Clone, Debug, Default)]
pub struct PipelineConfig {
    /// `true` for inference records, `false` for training dataset records.
    pub model: bool,
    /// Stop assembling stages at this phase.
    pub dry_run: Option<DryRunPhase>,
    /// Dataset type used to pick the default validator.
    pub dataset_type: DatasetType,
}

impl PipelineConfig {
    /// Default validator for this configuration.
    pub fn validator(&self) -> Box<dyn RecordValidator> {
        self.dataset_type.validator(self.model)
    }
}
