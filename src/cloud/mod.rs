//! Remote model service interface.
//!
//! The transport (REST resources, URL templates, authentication) lives
//! behind [`RemoteService`]; the pipeline only relies on the contracts
//! documented on each method.

/// Cloud wire encoding of records.
pub mod encode;
/// In-process service used by tests and offline runs.
pub mod memory;

pub use encode::encode_record;
pub use memory::InMemoryService;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::CloudError;
use crate::record::Record;
use crate::types::{DatasetId, ModelVersion};

/// State of a training session or trained model.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrainingStatus {
    #[default]
    #[serde(rename = "UNKNOWN")]
    Unknown,
    #[serde(rename = "QUEUED")]
    Queued,
    #[serde(rename = "STARTED")]
    Started,
    #[serde(rename = "PCT_COMPLETE")]
    Progress,
    #[serde(rename = "COMPLETE")]
    Complete,
}

impl fmt::Display for TrainingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TrainingStatus::Unknown => "unknown",
            TrainingStatus::Queued => "queued",
            TrainingStatus::Started => "started",
            TrainingStatus::Progress => "progress",
            TrainingStatus::Complete => "complete",
        };
        f.write_str(name)
    }
}

/// Trained (or training) model version of a dataset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub dataset_id: DatasetId,
    pub version: ModelVersion,
    pub status: TrainingStatus,
    /// Training progress in `[0, 1]`.
    #[serde(rename = "percentComplete", default)]
    pub progress: f64,
    #[serde(default)]
    pub comments: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ModelInfo {
    /// Model with the given status and no timestamps.
    pub fn new(dataset_id: impl Into<DatasetId>, version: ModelVersion, status: TrainingStatus) -> Self {
        Self {
            dataset_id: dataset_id.into(),
            version,
            status,
            progress: if status == TrainingStatus::Complete { 1.0 } else { 0.0 },
            comments: String::new(),
            created_at: None,
            updated_at: None,
        }
    }

    /// Fail with a model error unless training is complete.
    pub fn ensure_complete(&self) -> Result<(), CloudError> {
        if self.status == TrainingStatus::Complete {
            return Ok(());
        }
        Err(CloudError::Model {
            message: "Model training incomplete".into(),
            model: Some((self.dataset_id.clone(), self.version)),
        })
    }

    /// Last status change, falling back to creation time.
    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.updated_at.or(self.created_at)
    }
}

/// Newest model version whose training completed.
pub fn latest_complete(models: &[ModelInfo]) -> Option<&ModelInfo> {
    models
        .iter()
        .filter(|model| model.status == TrainingStatus::Complete)
        .max_by_key(|model| model.version)
}

/// Current training session of a dataset.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingSession {
    pub status: TrainingStatus,
    #[serde(rename = "percentComplete", default)]
    pub progress: f64,
    pub model_version: Option<ModelVersion>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Remote handle of a submitted record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordHandle {
    pub record_id: String,
    pub dataset_id: DatasetId,
    /// Model the record was submitted to; `None` for dataset records.
    pub model_version: Option<ModelVersion>,
    /// Last time the remote side updated the record (e.g. wrote a prediction).
    pub updated_at: Option<DateTime<Utc>>,
    /// Remote result payload, once available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
}

impl RecordHandle {
    /// Returns `true` when the remote side updated the record after `since`.
    pub fn updated_since(&self, since: DateTime<Utc>) -> bool {
        self.updated_at.is_some_and(|updated| updated > since)
    }
}

impl fmt::Display for RecordHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "record {} in dataset {}", self.record_id, self.dataset_id)?;
        if let Some(result) = &self.result {
            write!(f, ": {result}")?;
        }
        Ok(())
    }
}

/// Remote model service operating on one dataset.
pub trait RemoteService {
    /// Dataset all operations apply to.
    fn dataset_id(&self) -> &str;

    /// Every model version of the dataset.
    fn models(&self) -> Result<Vec<ModelInfo>, CloudError>;

    /// A specific model version.
    fn model(&self, version: ModelVersion) -> Result<ModelInfo, CloudError>;

    /// Add a training record to the dataset.
    fn add_dataset_record(&self, record: &Record) -> Result<RecordHandle, CloudError>;

    /// Submit a record to `model` for inference.
    ///
    /// Returns `Ok(None)` when the service accepted the call but produced no
    /// handle. Fails with [`CloudError::Model`] when the model is unusable.
    fn add_model_record(
        &self,
        model: &ModelInfo,
        record: &Record,
    ) -> Result<Option<RecordHandle>, CloudError>;

    /// Refresh a submitted record.
    fn prediction(&self, handle: &RecordHandle) -> Result<RecordHandle, CloudError>;

    /// Current training session.
    fn training_status(&self) -> Result<TrainingSession, CloudError>;

    /// Start or restart training.
    fn start_training(&self) -> Result<(), CloudError>;

    /// Stop the current training session.
    fn stop_training(&self) -> Result<(), CloudError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn latest_complete_skips_unfinished_models() {
        let models = vec![
            ModelInfo::new("d", 1, TrainingStatus::Complete),
            ModelInfo::new("d", 4, TrainingStatus::Progress),
            ModelInfo::new("d", 3, TrainingStatus::Complete),
            ModelInfo::new("d", 2, TrainingStatus::Complete),
        ];
        assert_eq!(latest_complete(&models).map(|m| m.version), Some(3));
        assert!(latest_complete(&models[1..2]).is_none());
    }

    #[test]
    fn incomplete_model_is_unusable() {
        let err = ModelInfo::new("houses", 2, TrainingStatus::Queued)
            .ensure_complete()
            .unwrap_err();
        assert_eq!(err.to_string(), "Model training incomplete: model version 2 dataset houses");
    }

    #[test]
    fn status_uses_wire_names() {
        let json = r#"{"status":"PCT_COMPLETE","percentComplete":0.4,"modelVersion":2,"createdAt":null,"updatedAt":"2025-03-01T10:00:00Z"}"#;
        let session: TrainingSession = serde_json::from_str(json).unwrap();
        assert_eq!(session.status, TrainingStatus::Progress);
        assert_eq!(session.model_version, Some(2));
        assert_eq!(
            session.updated_at,
            Some(Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap())
        );
    }

    #[test]
    fn handles_compare_update_time_strictly() {
        let at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let mut handle = RecordHandle {
            record_id: "r1".into(),
            dataset_id: "d".into(),
            model_version: Some(1),
            updated_at: None,
            result: None,
        };
        assert!(!handle.updated_since(at));
        handle.updated_at = Some(at);
        assert!(!handle.updated_since(at));
        handle.updated_at = Some(at + chrono::Duration::seconds(1));
        assert!(handle.updated_since(at));
    }
}
