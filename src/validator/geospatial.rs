use crate::constants::geospatial::{LATITUDE, LONGITUDE};
use crate::errors::ValidationError;
use crate::record::{Record, StructuredData, UnstructuredData};
use crate::validator::{GenericValidator, RecordValidator};

/// Generic rules plus required `latitude` and `longitude` fields.
#[derive(Clone, Debug)]
pub struct GeospatialValidator {
    generic: GenericValidator,
}

impl GeospatialValidator {
    /// Create a validator for model (`true`) or dataset (`false`) records.
    pub fn new(model: bool) -> Self {
        Self {
            generic: GenericValidator::new(model),
        }
    }
}

impl RecordValidator for GeospatialValidator {
    fn model(&self) -> bool {
        self.generic.model()
    }

    fn reset(&mut self) {
        self.generic.reset();
    }

    fn validate_structured_data_aggregation(
        &mut self,
        names: &[&str],
    ) -> Result<(), ValidationError> {
        if !names.contains(&LATITUDE) {
            return Err(ValidationError::Value("Missing latitude data item.".into()));
        }
        if !names.contains(&LONGITUDE) {
            return Err(ValidationError::Value("Missing longitude data item.".into()));
        }
        Ok(())
    }

    fn validate_structured_data(&mut self, data: &StructuredData) -> Result<(), ValidationError> {
        self.generic.validate_structured_data(data)
    }

    fn validate_unstructured_data(
        &mut self,
        data: &mut UnstructuredData,
    ) -> Result<(), ValidationError> {
        self.generic.validate_unstructured_data(data)
    }

    fn validate_record(&mut self, record: &Record) -> Result<(), ValidationError> {
        self.generic.validate_record(record)
    }
}
