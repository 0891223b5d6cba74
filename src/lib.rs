#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Stock record builders.
pub mod builders;
/// Remote model service interface, wire encoding, and in-memory service.
pub mod cloud;
/// Pipeline, dataset, and polling configuration types.
pub mod config;
/// Centralized constants: log targets, diagnostics, and defaults.
pub mod constants;
/// Configuration generators (filesystem today).
pub mod generate;
/// Lazy generate/build/validate stages and pipeline assembly.
pub mod pipeline;
/// Model submission and backoff result polling.
pub mod predictor;
/// Record data model and ownership wiring.
pub mod record;
/// Generic exclusive container/member relation.
pub mod relation;
/// Shared type aliases.
pub mod types;
/// Dataset upload and training control.
pub mod uploader;
/// URI helpers.
pub mod utils;
/// Record validators.
pub mod validator;

mod errors;

pub use builders::{EchoRecordBuilder, NameRecordBuilder};
pub use cloud::{
    InMemoryService, ModelInfo, RecordHandle, RemoteService, TrainingSession, TrainingStatus,
    encode_record,
};
pub use config::{BackoffPolicy, DatasetType, DryRunPhase, PipelineConfig};
pub use errors::{CloudError, PipelineError, RelationError, ValidationError};
pub use pipeline::{
    CountHandle, Counter, Pipeline, PipelineTail, RecordBuilder, build_pipeline,
    record_builder_generator, unconditional, validation_generator,
};
pub use predictor::{
    PollReport, Predictor, Sleeper, ThreadSleeper, poll_predictions, run_prediction,
};
pub use record::{
    DataType, FileContext, FileType, Record, RecordAssembly, StructuredData, Target,
    TemporalSpan, UnstructuredData, Value, format_record,
};
pub use relation::Relation;
pub use types::{
    ConfigValue, DataUri, DatasetId, Diagnostic, FieldName, ModelVersion, RecordName,
};
pub use uploader::{Trainer, UploadSummary, Uploader, run_upload};
pub use validator::{
    GenericValidator, GeospatialValidator, RecordValidator, TemporalValidator, probe_uri,
};
