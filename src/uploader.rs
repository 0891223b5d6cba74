use tracing::{debug, error, info, warn};

use crate::cloud::{RecordHandle, RemoteService, TrainingSession};
use crate::constants::targets::UPLOADER;
use crate::errors::CloudError;
use crate::pipeline::CountHandle;
use crate::record::Record;

/// Adds upstream records to the training dataset, yielding their handles.
///
/// Resource failures are logged and the record skipped; a fatal model error
/// ends iteration.
pub struct Uploader<'s, S: ?Sized, I> {
    service: &'s S,
    upstream: I,
    halted: bool,
}

impl<'s, S, I> Uploader<'s, S, I>
where
    S: RemoteService + ?Sized,
    I: Iterator<Item = Record>,
{
    /// Wrap `upstream`.
    pub fn new(service: &'s S, upstream: impl IntoIterator<IntoIter = I>) -> Self {
        Self {
            service,
            upstream: upstream.into_iter(),
            halted: false,
        }
    }
}

impl<S, I> Iterator for Uploader<'_, S, I>
where
    S: RemoteService + ?Sized,
    I: Iterator<Item = Record>,
{
    type Item = RecordHandle;

    fn next(&mut self) -> Option<RecordHandle> {
        if self.halted {
            return None;
        }
        loop {
            let record = self.upstream.next()?;
            match self.service.add_dataset_record(&record) {
                Ok(handle) => {
                    debug!(target: UPLOADER, record = record.name(), "uploaded record");
                    return Some(handle);
                }
                Err(err) if err.is_fatal() => {
                    error!(target: UPLOADER, record = record.name(), "{err}");
                    self.halted = true;
                    return None;
                }
                Err(err) => warn!(target: UPLOADER, record = record.name(), "{err}"),
            }
        }
    }
}

/// Training control for the service's dataset.
pub struct Trainer<'s, S: ?Sized> {
    service: &'s S,
}

impl<'s, S: RemoteService + ?Sized> Trainer<'s, S> {
    /// Control training on `service`.
    pub fn new(service: &'s S) -> Self {
        Self { service }
    }

    /// Start or restart training.
    pub fn start(&self) -> Result<(), CloudError> {
        info!(target: UPLOADER, dataset = self.service.dataset_id(), "start training");
        self.service.start_training()
    }

    /// Stop the current training session.
    pub fn stop(&self) -> Result<(), CloudError> {
        info!(target: UPLOADER, dataset = self.service.dataset_id(), "stop training");
        self.service.stop_training()
    }

    /// Current training session.
    pub fn status(&self) -> Result<TrainingSession, CloudError> {
        self.service.training_status()
    }
}

/// Result of [`run_upload`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UploadSummary {
    /// Handles of records the service accepted.
    pub uploaded: Vec<RecordHandle>,
    /// Configuration values generated upstream.
    pub generated: usize,
    /// Whether training was started afterwards.
    pub training_started: bool,
}

/// Upload every record, then start training when the generator produced
/// nothing and `no_train` is unset.
pub fn run_upload<S>(
    records: impl IntoIterator<Item = Record>,
    service: &S,
    counter: &CountHandle,
    no_train: bool,
) -> Result<UploadSummary, CloudError>
where
    S: RemoteService + ?Sized,
{
    let uploaded: Vec<RecordHandle> = Uploader::new(service, records).collect();
    let generated = counter.get();
    info!(target: UPLOADER, uploaded = uploaded.len(), generated, "upload finished");
    let training_started = generated == 0 && !no_train;
    if training_started {
        Trainer::new(service).start()?;
    }
    Ok(UploadSummary {
        uploaded,
        generated,
        training_started,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud::{InMemoryService, TrainingStatus};
    use crate::pipeline::Counter;
    use crate::record::{FileType, UnstructuredData};

    fn record(name: &str) -> Record {
        Record::assemble(
            name,
            Vec::new(),
            vec![UnstructuredData::new("mem://doc", FileType::Document)],
        )
        .unwrap()
    }

    #[test]
    fn uploader_skips_rejected_records() {
        let service = InMemoryService::new("d");
        service.reject_record("b", 500);
        let handles: Vec<String> = Uploader::new(&service, vec![record("a"), record("b"), record("c")])
            .map(|handle| handle.record_id)
            .collect();
        assert_eq!(handles, vec!["a", "c"]);
        assert_eq!(service.dataset_record_names(), vec!["a", "c"]);
    }

    #[test]
    fn training_starts_only_for_empty_generators() {
        let service = InMemoryService::new("d");
        let counter = Counter::new(["a", "b"]);
        let handle = counter.handle();
        let records = counter.map(record);
        let summary = run_upload(records, &service, &handle, false).unwrap();
        assert_eq!(summary.generated, 2);
        assert!(!summary.training_started);
        assert_eq!(service.training_status().unwrap().status, TrainingStatus::Unknown);

        let empty = Counter::new(Vec::<&str>::new());
        let handle = empty.handle();
        let summary = run_upload(empty.map(record), &service, &handle, true).unwrap();
        assert!(!summary.training_started);

        let empty = Counter::new(Vec::<&str>::new());
        let handle = empty.handle();
        let summary = run_upload(empty.map(record), &service, &handle, false).unwrap();
        assert!(summary.training_started);
        assert_eq!(Trainer::new(&service).status().unwrap().status, TrainingStatus::Queued);
    }

    #[test]
    fn trainer_stops_training() {
        let service = InMemoryService::new("d");
        let trainer = Trainer::new(&service);
        trainer.start().unwrap();
        trainer.stop().unwrap();
        assert_eq!(trainer.status().unwrap().status, TrainingStatus::Unknown);
    }
}
