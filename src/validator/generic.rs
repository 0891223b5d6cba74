use crate::errors::ValidationError;
use crate::record::{Record, StructuredData, Target, UnstructuredData};
use crate::validator::{RecordValidator, check_structured_data, check_unstructured_data};

/// Rules for generic datasets.
///
/// In dataset mode a record needs at least one structured item and at least
/// one item targeted with `Target::Yes`. Temporal metadata on unstructured
/// items is rejected.
#[derive(Clone, Debug)]
pub struct GenericValidator {
    model: bool,
    has_target: bool,
}

impl GenericValidator {
    /// Create a validator for model (`true`) or dataset (`false`) records.
    pub fn new(model: bool) -> Self {
        Self {
            model,
            has_target: false,
        }
    }
}

impl RecordValidator for GenericValidator {
    fn model(&self) -> bool {
        self.model
    }

    fn reset(&mut self) {
        self.has_target = false;
    }

    fn validate_structured_data(&mut self, data: &StructuredData) -> Result<(), ValidationError> {
        check_structured_data(data)?;
        if data.target == Target::Yes {
            self.has_target = true;
        }
        Ok(())
    }

    fn validate_unstructured_data(
        &mut self,
        data: &mut UnstructuredData,
    ) -> Result<(), ValidationError> {
        check_unstructured_data(data)?;
        if data.temporal.is_some() {
            return Err(ValidationError::Value(
                "Subclass of UnstructuredData not allowed.".into(),
            ));
        }
        Ok(())
    }

    fn validate_record(&mut self, record: &Record) -> Result<(), ValidationError> {
        if self.model {
            return Ok(());
        }
        if record.structured_data().is_empty() {
            return Err(ValidationError::Value(
                "Dataset record must have at least one StructuredData item.".into(),
            ));
        }
        if !self.has_target {
            return Err(ValidationError::Value(
                "Record for dataset must have a target StructuredData item.".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{FileType, TemporalSpan};
    use crate::utils::file_url;
    use std::fs;
    use tempfile::tempdir;

    fn text_item(dir: &std::path::Path) -> UnstructuredData {
        let path = dir.join("listing.txt");
        fs::write(&path, "three bedrooms").unwrap();
        UnstructuredData::new(file_url(&path), FileType::Text)
    }

    #[test]
    fn dataset_record_with_target_passes() {
        let temp = tempdir().unwrap();
        let mut record = Record::assemble(
            "r1",
            vec![StructuredData::continuous("price", 100000).with_target(Target::Yes)],
            vec![text_item(temp.path())],
        )
        .unwrap();
        GenericValidator::new(false).validate(&mut record).unwrap();
        assert_eq!(record.unstructured_data()[0].accessible(), "OK");
    }

    #[test]
    fn dataset_record_needs_a_target() {
        let temp = tempdir().unwrap();
        let mut record = Record::assemble(
            "r2",
            vec![StructuredData::continuous("price", 100000).with_target(Target::No)],
            vec![text_item(temp.path())],
        )
        .unwrap();
        let err = GenericValidator::new(false).validate(&mut record).unwrap_err();
        assert_eq!(
            err.message(),
            "Record r2: Record for dataset must have a target StructuredData item."
        );

        // Model records carry no target requirement.
        GenericValidator::new(true).validate(&mut record).unwrap();
    }

    #[test]
    fn dataset_record_needs_structured_data() {
        let temp = tempdir().unwrap();
        let mut record = Record::assemble("r3", Vec::new(), vec![text_item(temp.path())]).unwrap();
        let err = GenericValidator::new(false).validate(&mut record).unwrap_err();
        assert_eq!(
            err.message(),
            "Record r3: Dataset record must have at least one StructuredData item."
        );
    }

    #[test]
    fn target_state_does_not_leak_between_records() {
        let temp = tempdir().unwrap();
        let mut validator = GenericValidator::new(false);
        let mut first = Record::assemble(
            "with_target",
            vec![StructuredData::continuous("price", 1).with_target(Target::Yes)],
            vec![text_item(temp.path())],
        )
        .unwrap();
        let mut second = Record::assemble(
            "without_target",
            vec![StructuredData::continuous("price", 1)],
            vec![text_item(temp.path())],
        )
        .unwrap();
        validator.validate(&mut first).unwrap();
        assert!(validator.validate(&mut second).is_err());
    }

    #[test]
    fn temporal_items_are_rejected() {
        let mut record = Record::assemble(
            "clip",
            vec![StructuredData::continuous("price", 1).with_target(Target::Yes)],
            vec![
                UnstructuredData::new("mem://clip", FileType::Video)
                    .with_temporal(TemporalSpan::default()),
            ],
        )
        .unwrap();
        let err = GenericValidator::new(false).validate(&mut record).unwrap_err();
        assert_eq!(err.message(), "Record clip: Subclass of UnstructuredData not allowed.");
    }
}
