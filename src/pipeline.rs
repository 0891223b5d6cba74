use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{debug, info, warn};

use crate::config::{DryRunPhase, PipelineConfig};
use crate::constants::targets::{BUILDER, GENERATOR, VALIDATOR};
use crate::errors::{PipelineError, ValidationError};
use crate::record::{Record, format_record};
use crate::types::ConfigValue;
use crate::validator::RecordValidator;

/// Pass-through stage that counts the items pulled from upstream.
pub struct Counter<I> {
    upstream: I,
    count: Arc<AtomicUsize>,
}

/// Read side of a [`Counter`]; stays valid after the counter moves into a chain.
#[derive(Clone, Debug, Default)]
pub struct CountHandle(Arc<AtomicUsize>);

impl CountHandle {
    /// Items pulled so far.
    pub fn get(&self) -> usize {
        self.0.load(Ordering::Relaxed)
    }
}

impl<I: Iterator> Counter<I> {
    /// Wrap `upstream`.
    pub fn new(upstream: impl IntoIterator<IntoIter = I>) -> Self {
        Self {
            upstream: upstream.into_iter(),
            count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Handle for reading the count once the counter is consumed.
    pub fn handle(&self) -> CountHandle {
        CountHandle(Arc::clone(&self.count))
    }
}

impl<I: Iterator> Iterator for Counter<I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.upstream.next()?;
        let seen = self.count.fetch_add(1, Ordering::Relaxed) + 1;
        debug!(target: GENERATOR, count = seen, "configuration generated");
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.upstream.size_hint()
    }
}

/// Turns one configuration value into a record.
///
/// Returning `None` skips the configuration; dataset-mode builders use it to
/// leave out sources that are not eligible for training.
pub trait RecordBuilder {
    /// Build the record described by `config`.
    fn build(&mut self, model: bool, config: &str) -> Option<Record>;
}

impl<F> RecordBuilder for F
where
    F: FnMut(bool, &str) -> Option<Record>,
{
    fn build(&mut self, model: bool, config: &str) -> Option<Record> {
        self(model, config)
    }
}

/// Builder adapter for `config -> Record` callables that never skip.
#[derive(Clone, Debug)]
pub struct Unconditional<F>(F);

/// Adapt a `config -> Record` callable into a [`RecordBuilder`].
pub fn unconditional<F>(build: F) -> Unconditional<F>
where
    F: FnMut(&str) -> Record,
{
    Unconditional(build)
}

impl<F> RecordBuilder for Unconditional<F>
where
    F: FnMut(&str) -> Record,
{
    fn build(&mut self, _model: bool, config: &str) -> Option<Record> {
        Some((self.0)(config))
    }
}

/// Lazy build stage; see [`record_builder_generator`].
pub struct BuildStage<I, B> {
    upstream: I,
    builder: B,
    model: bool,
}

/// Build a record for every upstream configuration, skipping configurations
/// the builder declines.
pub fn record_builder_generator<I, B>(upstream: I, builder: B, model: bool) -> BuildStage<I::IntoIter, B>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
    B: RecordBuilder,
{
    BuildStage {
        upstream: upstream.into_iter(),
        builder,
        model,
    }
}

impl<I, B> Iterator for BuildStage<I, B>
where
    I: Iterator,
    I::Item: AsRef<str>,
    B: RecordBuilder,
{
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        loop {
            let config = self.upstream.next()?;
            let config = config.as_ref();
            match self.builder.build(self.model, config) {
                Some(record) => {
                    debug!(target: BUILDER, config, record = record.name(), "built record");
                    return Some(record);
                }
                None => debug!(target: BUILDER, config, "builder skipped configuration"),
            }
        }
    }
}

/// Lazy validation stage; see [`validation_generator`].
pub struct ValidateStage<I, F> {
    upstream: I,
    validate: F,
}

/// Yield upstream records that pass `validate`; failing records are logged
/// and dropped.
pub fn validation_generator<I, F>(upstream: I, validate: F) -> ValidateStage<I::IntoIter, F>
where
    I: IntoIterator<Item = Record>,
    F: FnMut(&mut Record) -> Result<(), ValidationError>,
{
    ValidateStage {
        upstream: upstream.into_iter(),
        validate,
    }
}

impl<I, F> Iterator for ValidateStage<I, F>
where
    I: Iterator<Item = Record>,
    F: FnMut(&mut Record) -> Result<(), ValidationError>,
{
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        loop {
            let mut record = self.upstream.next()?;
            match (self.validate)(&mut record) {
                Ok(()) => return Some(record),
                Err(err) => warn!(
                    target: VALIDATOR,
                    record = record.name(),
                    schema = err.is_type_error(),
                    "dropping record: {err}"
                ),
            }
        }
    }
}

/// Last stage assembled by [`build_pipeline`].
pub enum PipelineTail<'a> {
    /// Configuration values straight from the counted generator.
    Configuration(Box<dyn Iterator<Item = ConfigValue> + 'a>),
    /// Built, unvalidated records.
    Built(Box<dyn Iterator<Item = Record> + 'a>),
    /// Records that passed validation.
    Validated(Box<dyn Iterator<Item = Record> + 'a>),
}

/// Counted generate/build/validate chain, possibly cut short by a dry run.
pub struct Pipeline<'a> {
    counter: CountHandle,
    dry_run: Option<DryRunPhase>,
    tail: PipelineTail<'a>,
}

/// Assemble generator, builder and validator into a lazy chain.
///
/// Assembly stops after the stage named by `config.dry_run`.
pub fn build_pipeline<'a, G, B, V>(
    generator: G,
    builder: B,
    mut validator: V,
    config: &PipelineConfig,
) -> Pipeline<'a>
where
    G: IntoIterator,
    G::IntoIter: 'a,
    G::Item: Into<ConfigValue> + 'a,
    B: RecordBuilder + 'a,
    V: RecordValidator + 'a,
{
    let counter = Counter::new(generator.into_iter().map(Into::<ConfigValue>::into));
    let handle = counter.handle();
    let dry_run = config.dry_run;
    info!(
        target: GENERATOR,
        model = config.model,
        dataset_type = %config.dataset_type,
        dry_run = ?dry_run,
        "assembling record pipeline"
    );

    let tail = if dry_run == Some(DryRunPhase::Configuration) {
        PipelineTail::Configuration(Box::new(counter))
    } else {
        let built = record_builder_generator(counter, builder, config.model);
        if dry_run == Some(DryRunPhase::Build) {
            PipelineTail::Built(Box::new(built))
        } else {
            let validated =
                validation_generator(built, move |record: &mut Record| validator.validate(record));
            PipelineTail::Validated(Box::new(validated))
        }
    };

    Pipeline {
        counter: handle,
        dry_run,
        tail,
    }
}

impl<'a> Pipeline<'a> {
    /// Count of configuration values generated so far.
    pub fn counter(&self) -> CountHandle {
        self.counter.clone()
    }

    /// Phase the pipeline was cut at, if this is a dry run.
    pub fn dry_run(&self) -> Option<DryRunPhase> {
        self.dry_run
    }

    /// Current chain tail.
    pub fn into_tail(self) -> PipelineTail<'a> {
        self.tail
    }

    /// Validated records ready for the remote service.
    ///
    /// Fails for dry runs, which never reach the remote service.
    pub fn into_submission(self) -> Result<Box<dyn Iterator<Item = Record> + 'a>, PipelineError> {
        match (self.dry_run, self.tail) {
            (None, PipelineTail::Validated(records)) => Ok(records),
            (Some(phase), _) => Err(PipelineError::Configuration(format!(
                "dry run stopped at the {phase} phase; nothing is submitted"
            ))),
            (None, _) => Err(PipelineError::Configuration(
                "pipeline does not end in validation".into(),
            )),
        }
    }

    /// Printable output of the tail: configuration values as-is, records as reports.
    pub fn preview(self) -> Box<dyn Iterator<Item = String> + 'a> {
        match self.tail {
            PipelineTail::Configuration(configs) => configs,
            PipelineTail::Built(records) | PipelineTail::Validated(records) => {
                Box::new(records.map(|record| format_record(&record)))
            }
        }
    }
}
