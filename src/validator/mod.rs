//! Record validators.
//!
//! A validator walks one record through a fixed sequence of checks:
//!
//! 1. [`RecordValidator::reset`] clears per-record state.
//! 2. [`RecordValidator::validate_properties`] checks record-level metadata.
//! 3. [`RecordValidator::validate_structured_data_aggregation`] sees every
//!    structured item name before any item is inspected, so missing required
//!    fields are rejected early.
//! 4. [`RecordValidator::validate_structured_data`] runs per structured item.
//! 5. At least one unstructured item must exist;
//!    [`RecordValidator::validate_unstructured_data`] runs per item.
//! 6. [`RecordValidator::validate_record`] applies whole-record policy using
//!    state gathered in the earlier steps.
//!
//! Dataset-specific rule sets override individual steps and keep the
//! sequence from [`RecordValidator::validate`].
//!
//! A validator that keeps per-record state must only validate one record at
//! a time; use one instance per processing context.

/// Generic dataset rules.
pub mod generic;
/// Geospatial dataset rules.
pub mod geospatial;
/// URI accessibility probing.
pub mod probe;
/// Temporal dataset rules.
pub mod temporal;

pub use generic::GenericValidator;
pub use geospatial::GeospatialValidator;
pub use probe::probe_uri;
pub use temporal::TemporalValidator;

use tracing::info;

use crate::constants::targets::VALIDATOR;
use crate::errors::ValidationError;
use crate::record::{DataType, Record, StructuredData, UnstructuredData};

/// Step-wise record validation.
///
/// Implementations override the `validate_*` hooks; [`RecordValidator::validate`]
/// drives them and should not be overridden.
pub trait RecordValidator {
    /// `true` when records are destined for inference against a trained
    /// model, `false` when they are destined for a training dataset.
    fn model(&self) -> bool;

    /// Clear per-record state before a record is validated.
    fn reset(&mut self) {}

    /// Record-level metadata checks.
    fn validate_properties(&mut self, _record: &Record) -> Result<(), ValidationError> {
        Ok(())
    }

    /// Checks on the set of structured item names.
    fn validate_structured_data_aggregation(
        &mut self,
        _names: &[&str],
    ) -> Result<(), ValidationError> {
        Ok(())
    }

    /// Checks on one structured item.
    fn validate_structured_data(&mut self, data: &StructuredData) -> Result<(), ValidationError> {
        check_structured_data(data)
    }

    /// Checks on one unstructured item; records its accessibility diagnostic.
    fn validate_unstructured_data(
        &mut self,
        data: &mut UnstructuredData,
    ) -> Result<(), ValidationError> {
        check_unstructured_data(data)
    }

    /// Whole-record checks, run after every item has been seen.
    fn validate_record(&mut self, _record: &Record) -> Result<(), ValidationError> {
        Ok(())
    }

    /// Validate `record`, prefixing any failure with `Record <name>: `.
    fn validate(&mut self, record: &mut Record) -> Result<(), ValidationError> {
        info!(target: VALIDATOR, record = record.name(), "begin validating record");
        self.reset();
        run_steps(self, record).map_err(|err| err.for_record(record.name()))?;
        info!(target: VALIDATOR, record = record.name(), "end validating record");
        Ok(())
    }
}

fn run_steps<V>(validator: &mut V, record: &mut Record) -> Result<(), ValidationError>
where
    V: RecordValidator + ?Sized,
{
    validator.validate_properties(record)?;
    let names: Vec<&str> = record.structured_names().collect();
    validator.validate_structured_data_aggregation(&names)?;
    for data in record.structured_data() {
        validator.validate_structured_data(data)?;
    }
    if record.unstructured_data().is_empty() {
        return Err(ValidationError::Value(
            "Record must have at least one UnstructuredData object.".into(),
        ));
    }
    for data in record.unstructured_data_mut() {
        validator.validate_unstructured_data(data)?;
    }
    validator.validate_record(record)
}

/// Base structured item rules shared by every validator.
pub fn check_structured_data(data: &StructuredData) -> Result<(), ValidationError> {
    if !data.target.is_member() {
        return Err(ValidationError::Type(format!(
            "StructuredData.target `{}` is not a Target",
            data.target
        )));
    }
    match &data.data_type {
        DataType::Continuous if !data.value.is_continuous() => Err(ValidationError::Value(
            format!("StructuredData.value `{}` is not continuous", data.value),
        )),
        DataType::Continuous | DataType::Category => Ok(()),
        DataType::Unrecognized(raw) => Err(ValidationError::Type(format!(
            "data_type `{raw}` is not DataType"
        ))),
    }
}

/// Base unstructured item rules shared by every validator.
///
/// The accessibility diagnostic is recorded on the item and never fails validation.
pub fn check_unstructured_data(data: &mut UnstructuredData) -> Result<(), ValidationError> {
    if !data.file_type.is_member() {
        return Err(ValidationError::Type(format!(
            "file_type `{}` is not FileType",
            data.file_type
        )));
    }
    let diagnostic = probe_uri(&data.data_uri);
    data.set_accessible(diagnostic);
    Ok(())
}

impl<V: RecordValidator + ?Sized> RecordValidator for Box<V> {
    fn model(&self) -> bool {
        (**self).model()
    }

    fn reset(&mut self) {
        (**self).reset()
    }

    fn validate_properties(&mut self, record: &Record) -> Result<(), ValidationError> {
        (**self).validate_properties(record)
    }

    fn validate_structured_data_aggregation(
        &mut self,
        names: &[&str],
    ) -> Result<(), ValidationError> {
        (**self).validate_structured_data_aggregation(names)
    }

    fn validate_structured_data(&mut self, data: &StructuredData) -> Result<(), ValidationError> {
        (**self).validate_structured_data(data)
    }

    fn validate_unstructured_data(
        &mut self,
        data: &mut UnstructuredData,
    ) -> Result<(), ValidationError> {
        (**self).validate_unstructured_data(data)
    }

    fn validate_record(&mut self, record: &Record) -> Result<(), ValidationError> {
        (**self).validate_record(record)
    }

    fn validate(&mut self, record: &mut Record) -> Result<(), ValidationError> {
        (**self).validate(record)
    }
}
