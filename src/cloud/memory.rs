use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde_json::Value as Json;

use crate::cloud::{
    ModelInfo, RecordHandle, RemoteService, TrainingSession, TrainingStatus, encode_record,
};
use crate::errors::CloudError;
use crate::record::Record;
use crate::types::{DatasetId, ModelVersion, RecordName};

/// In-process [`RemoteService`] for one dataset.
///
/// Dataset records are stored in their encoded wire form. Model submissions
/// stay pending until [`InMemoryService::complete_prediction`] stamps them.
pub struct InMemoryService {
    dataset_id: DatasetId,
    state: Mutex<ServiceState>,
}

#[derive(Default)]
struct ServiceState {
    models: Vec<ModelInfo>,
    dataset_records: IndexMap<RecordName, Json>,
    model_records: IndexMap<(ModelVersion, RecordName), RecordHandle>,
    rejected: HashMap<RecordName, u16>,
    training: TrainingSession,
}

impl InMemoryService {
    /// Create an empty service for `dataset_id`.
    pub fn new(dataset_id: impl Into<DatasetId>) -> Self {
        Self {
            dataset_id: dataset_id.into(),
            state: Mutex::new(ServiceState::default()),
        }
    }

    /// Register a model version with the given status.
    pub fn with_model(self, version: ModelVersion, status: TrainingStatus) -> Self {
        let model = ModelInfo::new(self.dataset_id.clone(), version, status);
        self.lock().models.push(model);
        self
    }

    /// Change the status of a registered model.
    pub fn set_model_status(&self, version: ModelVersion, status: TrainingStatus) {
        let mut state = self.lock();
        if let Some(model) = state.models.iter_mut().find(|model| model.version == version) {
            model.status = status;
            model.updated_at = Some(Utc::now());
        }
    }

    /// Make every future submission of `record` fail with HTTP `status`.
    pub fn reject_record(&self, record: impl Into<RecordName>, status: u16) {
        self.lock().rejected.insert(record.into(), status);
    }

    /// Stamp every submission of `record_id` as updated now with `result`.
    pub fn complete_prediction(&self, record_id: &str, result: Json) {
        self.complete_prediction_at(record_id, Utc::now(), result);
    }

    /// Stamp every submission of `record_id` as updated at `at` with `result`.
    pub fn complete_prediction_at(&self, record_id: &str, at: DateTime<Utc>, result: Json) {
        let mut state = self.lock();
        for ((_, id), handle) in state.model_records.iter_mut() {
            if id == record_id {
                handle.updated_at = Some(at);
                handle.result = Some(result.clone());
            }
        }
    }

    /// Encoded dataset record by name.
    pub fn dataset_record(&self, name: &str) -> Option<Json> {
        self.lock().dataset_records.get(name).cloned()
    }

    /// Names of uploaded dataset records in upload order.
    pub fn dataset_record_names(&self) -> Vec<RecordName> {
        self.lock().dataset_records.keys().cloned().collect()
    }

    /// Every model submission in submission order.
    pub fn submissions(&self) -> Vec<RecordHandle> {
        self.lock().model_records.values().cloned().collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ServiceState> {
        self.state.lock().expect("in-memory service state poisoned")
    }

    fn check_rejected(
        &self,
        state: &ServiceState,
        record: &Record,
        resource: &'static str,
    ) -> Result<(), CloudError> {
        match state.rejected.get(record.name()) {
            Some(status) => Err(resource_error(*status, resource, record.name(), "add")),
            None => Ok(()),
        }
    }
}

fn resource_error(status: u16, resource: &'static str, name: &str, action: &str) -> CloudError {
    let reason = match status {
        400 => "Bad Request",
        404 => "Not Found",
        409 => "Conflict",
        500 => "Internal Server Error",
        _ => "Error",
    };
    CloudError::Resource {
        status,
        reason: reason.into(),
        body: String::new(),
        resource,
        resource_name: name.to_string(),
        action: action.to_string(),
    }
}

impl RemoteService for InMemoryService {
    fn dataset_id(&self) -> &str {
        &self.dataset_id
    }

    fn models(&self) -> Result<Vec<ModelInfo>, CloudError> {
        Ok(self.lock().models.clone())
    }

    fn model(&self, version: ModelVersion) -> Result<ModelInfo, CloudError> {
        self.lock()
            .models
            .iter()
            .find(|model| model.version == version)
            .cloned()
            .ok_or_else(|| resource_error(404, "Model", &version.to_string(), "load"))
    }

    fn add_dataset_record(&self, record: &Record) -> Result<RecordHandle, CloudError> {
        let mut state = self.lock();
        self.check_rejected(&state, record, "Record")?;
        state
            .dataset_records
            .insert(record.name().to_string(), encode_record(record));
        Ok(RecordHandle {
            record_id: record.name().to_string(),
            dataset_id: self.dataset_id.clone(),
            model_version: None,
            updated_at: Some(Utc::now()),
            result: None,
        })
    }

    fn add_model_record(
        &self,
        model: &ModelInfo,
        record: &Record,
    ) -> Result<Option<RecordHandle>, CloudError> {
        let mut state = self.lock();
        let current = state
            .models
            .iter()
            .find(|candidate| candidate.version == model.version)
            .ok_or_else(|| resource_error(404, "Model", &model.version.to_string(), "load"))?;
        current.ensure_complete()?;
        self.check_rejected(&state, record, "Record")?;
        let handle = RecordHandle {
            record_id: record.name().to_string(),
            dataset_id: self.dataset_id.clone(),
            model_version: Some(model.version),
            updated_at: None,
            result: None,
        };
        state
            .model_records
            .insert((model.version, handle.record_id.clone()), handle.clone());
        Ok(Some(handle))
    }

    fn prediction(&self, handle: &RecordHandle) -> Result<RecordHandle, CloudError> {
        let version = handle.model_version.unwrap_or_default();
        self.lock()
            .model_records
            .get(&(version, handle.record_id.clone()))
            .cloned()
            .ok_or_else(|| resource_error(404, "Record", &handle.record_id, "load"))
    }

    fn training_status(&self) -> Result<TrainingSession, CloudError> {
        Ok(self.lock().training.clone())
    }

    fn start_training(&self) -> Result<(), CloudError> {
        let now = Utc::now();
        let mut state = self.lock();
        let next_version = state.models.iter().map(|model| model.version).max().unwrap_or(0) + 1;
        state.training = TrainingSession {
            status: TrainingStatus::Queued,
            progress: 0.0,
            model_version: Some(next_version),
            created_at: Some(now),
            updated_at: Some(now),
        };
        Ok(())
    }

    fn stop_training(&self) -> Result<(), CloudError> {
        let mut state = self.lock();
        state.training.status = TrainingStatus::Unknown;
        state.training.updated_at = Some(Utc::now());
        Ok(())
    }
}
