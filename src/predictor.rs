use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use crate::cloud::{ModelInfo, RecordHandle, RemoteService, latest_complete};
use crate::config::BackoffPolicy;
use crate::constants::targets::SUBMITTER;
use crate::errors::{CloudError, PipelineError};
use crate::record::Record;
use crate::types::ModelVersion;

/// Submits upstream records to a trained model, one per `next`.
///
/// Per-record submission failures are logged and the record skipped. A
/// fatal model error ends iteration; it is kept in [`Predictor::halted`].
pub struct Predictor<'s, S: ?Sized, I> {
    service: &'s S,
    model: ModelInfo,
    upstream: I,
    halted: Option<CloudError>,
}

impl<'s, S, I> Predictor<'s, S, I>
where
    S: RemoteService + ?Sized,
    I: Iterator<Item = Record>,
{
    /// Select the model and wrap `upstream`.
    ///
    /// With no `version`, the newest model whose training completed is used.
    pub fn new(
        service: &'s S,
        upstream: impl IntoIterator<IntoIter = I>,
        version: Option<ModelVersion>,
    ) -> Result<Self, CloudError> {
        let model = match version {
            Some(version) => service.model(version)?,
            None => latest_complete(&service.models()?)
                .cloned()
                .ok_or_else(|| CloudError::model("No completed models available"))?,
        };
        info!(
            target: SUBMITTER,
            dataset = service.dataset_id(),
            version = model.version,
            status = %model.status,
            "selected model"
        );
        Ok(Self {
            service,
            model,
            upstream: upstream.into_iter(),
            halted: None,
        })
    }

    /// Model records are submitted to.
    pub fn model(&self) -> &ModelInfo {
        &self.model
    }

    /// Fatal error that stopped iteration, if any.
    pub fn halted(&self) -> Option<&CloudError> {
        self.halted.as_ref()
    }
}

impl<S, I> Iterator for Predictor<'_, S, I>
where
    S: RemoteService + ?Sized,
    I: Iterator<Item = Record>,
{
    type Item = RecordHandle;

    fn next(&mut self) -> Option<RecordHandle> {
        if self.halted.is_some() {
            return None;
        }
        loop {
            let record = self.upstream.next()?;
            match self.service.add_model_record(&self.model, &record) {
                Ok(Some(handle)) => {
                    debug!(target: SUBMITTER, record = record.name(), "submitted record");
                    return Some(handle);
                }
                Ok(None) => {
                    warn!(target: SUBMITTER, record = record.name(), "service returned no handle")
                }
                Err(err) if err.is_fatal() => {
                    error!(target: SUBMITTER, record = record.name(), "{err}");
                    self.halted = Some(err);
                    return None;
                }
                Err(err) => warn!(target: SUBMITTER, record = record.name(), "{err}"),
            }
        }
    }
}

/// Blocks between polling rounds.
pub trait Sleeper {
    /// Wait for `delay`.
    fn sleep(&mut self, delay: Duration);
}

impl<F: FnMut(Duration)> Sleeper for F {
    fn sleep(&mut self, delay: Duration) {
        self(delay)
    }
}

/// Sleeps the current thread.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&mut self, delay: Duration) {
        std::thread::sleep(delay);
    }
}

/// Outcome of [`poll_predictions`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PollReport {
    /// Refreshed handles whose result updated after submission, in completion order.
    pub complete: Vec<RecordHandle>,
    /// Handles still pending when polling gave up, in submission order.
    pub incomplete: Vec<RecordHandle>,
    /// Number of sleep/check rounds performed.
    pub rounds: usize,
}

impl PollReport {
    /// Returns `true` when every submitted record completed.
    pub fn is_complete(&self) -> bool {
        self.incomplete.is_empty()
    }
}

/// Poll until every handle updated after `submitted_at` or the backoff runs out.
///
/// Each round sleeps the next delay from `policy`, then refreshes every
/// pending handle. Refresh failures keep the handle pending. Never fails;
/// leftovers are logged and reported as incomplete.
pub fn poll_predictions<S>(
    service: &S,
    pending: Vec<RecordHandle>,
    submitted_at: DateTime<Utc>,
    policy: &BackoffPolicy,
    sleeper: &mut impl Sleeper,
) -> PollReport
where
    S: RemoteService + ?Sized,
{
    let mut report = PollReport {
        incomplete: pending,
        ..PollReport::default()
    };
    for delay in policy.delays() {
        if report.incomplete.is_empty() {
            break;
        }
        debug!(
            target: SUBMITTER,
            delay_secs = delay.as_secs_f64(),
            pending = report.incomplete.len(),
            "waiting for predictions"
        );
        sleeper.sleep(delay);
        report.rounds += 1;

        let mut still_pending = Vec::with_capacity(report.incomplete.len());
        for handle in report.incomplete.drain(..) {
            match service.prediction(&handle) {
                Ok(fresh) if fresh.updated_since(submitted_at) => {
                    info!(target: SUBMITTER, record = %fresh.record_id, "prediction complete");
                    report.complete.push(fresh);
                }
                Ok(_) => still_pending.push(handle),
                Err(err) => {
                    warn!(target: SUBMITTER, record = %handle.record_id, "{err}");
                    still_pending.push(handle);
                }
            }
        }
        report.incomplete = still_pending;
    }
    for handle in &report.incomplete {
        warn!(target: SUBMITTER, record = %handle.record_id, "Predictions not complete");
    }
    report
}

/// Submit every record to a model, then poll for their results.
///
/// Fails only when no usable model can be selected.
pub fn run_prediction<S>(
    records: impl IntoIterator<Item = Record>,
    service: &S,
    version: Option<ModelVersion>,
    policy: &BackoffPolicy,
    sleeper: &mut impl Sleeper,
) -> Result<PollReport, PipelineError>
where
    S: RemoteService + ?Sized,
{
    let submitted_at = Utc::now();
    let mut predictor = Predictor::new(service, records, version)?;
    let pending: Vec<RecordHandle> = predictor.by_ref().collect();
    if let Some(err) = predictor.halted() {
        warn!(target: SUBMITTER, submitted = pending.len(), "submission stopped early: {err}");
    }
    Ok(poll_predictions(service, pending, submitted_at, policy, sleeper))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud::{InMemoryService, TrainingStatus};
    use crate::record::{FileType, UnstructuredData};
    use serde_json::json;

    fn record(name: &str) -> Record {
        Record::assemble(
            name,
            Vec::new(),
            vec![UnstructuredData::new("mem://blob", FileType::Image)],
        )
        .unwrap()
    }

    fn records(names: &[&str]) -> Vec<Record> {
        names.iter().map(|name| record(name)).collect()
    }

    #[test]
    fn picks_newest_completed_model() {
        let service = InMemoryService::new("d")
            .with_model(1, TrainingStatus::Complete)
            .with_model(2, TrainingStatus::Complete)
            .with_model(3, TrainingStatus::Started);
        let predictor = Predictor::new(&service, Vec::<Record>::new(), None).unwrap();
        assert_eq!(predictor.model().version, 2);
    }

    #[test]
    fn no_completed_model_fails_immediately() {
        let service = InMemoryService::new("d").with_model(1, TrainingStatus::Queued);
        let err = Predictor::new(&service, Vec::<Record>::new(), None).err().unwrap();
        assert_eq!(err.to_string(), "No completed models available");
    }

    #[test]
    fn submission_errors_skip_the_record() {
        let service = InMemoryService::new("d").with_model(1, TrainingStatus::Complete);
        service.reject_record("b", 400);
        let predictor = Predictor::new(&service, records(&["a", "b", "c"]), None).unwrap();
        let ids: Vec<String> = predictor.map(|handle| handle.record_id).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn fatal_model_error_ends_iteration() {
        let service = InMemoryService::new("d").with_model(1, TrainingStatus::Complete);
        let mut predictor = Predictor::new(&service, records(&["a", "b", "c"]), Some(1)).unwrap();
        assert_eq!(predictor.next().unwrap().record_id, "a");
        service.set_model_status(1, TrainingStatus::Progress);
        assert!(predictor.next().is_none());
        assert!(predictor.halted().unwrap().is_fatal());
        service.set_model_status(1, TrainingStatus::Complete);
        assert!(predictor.next().is_none());
    }

    #[test]
    fn never_updating_records_are_incomplete_after_seven_rounds() {
        let service = InMemoryService::new("d").with_model(1, TrainingStatus::Complete);
        let mut slept = Vec::new();
        let mut sleeper = |delay: Duration| slept.push(delay.as_secs());
        let report = run_prediction(
            records(&["a", "b", "c"]),
            &service,
            None,
            &BackoffPolicy::default(),
            &mut sleeper,
        )
        .unwrap();
        assert_eq!(slept, vec![1, 2, 4, 8, 16, 32, 64]);
        assert_eq!(report.rounds, 7);
        assert!(report.complete.is_empty());
        assert_eq!(report.incomplete.len(), 3);
        assert!(!report.is_complete());
    }

    #[test]
    fn completed_records_leave_the_pending_set() {
        let service = InMemoryService::new("d").with_model(1, TrainingStatus::Complete);
        let later = Utc::now() + chrono::Duration::hours(1);
        let mut rounds = 0;
        let mut sleeper = |_delay: Duration| {
            rounds += 1;
            match rounds {
                1 => service.complete_prediction_at("b", later, json!({"label": "cat"})),
                3 => service.complete_prediction_at("a", later, json!({"label": "dog"})),
                _ => {}
            }
        };
        let report = run_prediction(
            records(&["a", "b"]),
            &service,
            None,
            &BackoffPolicy::default(),
            &mut sleeper,
        )
        .unwrap();
        assert!(report.is_complete());
        assert_eq!(report.rounds, 3);
        let ids: Vec<&str> = report.complete.iter().map(|h| h.record_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(report.complete[0].result, Some(json!({"label": "cat"})));
    }

    #[test]
    fn nothing_pending_means_no_sleep() {
        let service = InMemoryService::new("d");
        let mut sleeper = |delay: Duration| assert!(delay.is_zero(), "should not sleep");
        let report = poll_predictions(
            &service,
            Vec::new(),
            Utc::now(),
            &BackoffPolicy::default(),
            &mut sleeper,
        );
        assert_eq!(report, PollReport::default());
    }
}
