use crate::constants::MAX_FILE_CONTEXT_DEPTH;
use crate::errors::ValidationError;
use crate::record::{FileContext, UnstructuredData};
use crate::validator::{RecordValidator, check_unstructured_data};

/// Rules for temporal datasets.
///
/// Every unstructured item needs a temporal window, crop points in order,
/// and well-formed file contexts.
#[derive(Clone, Debug)]
pub struct TemporalValidator {
    model: bool,
}

impl TemporalValidator {
    /// Create a validator for model (`true`) or dataset (`false`) records.
    pub fn new(model: bool) -> Self {
        Self { model }
    }
}

impl RecordValidator for TemporalValidator {
    fn model(&self) -> bool {
        self.model
    }

    fn validate_unstructured_data(
        &mut self,
        data: &mut UnstructuredData,
    ) -> Result<(), ValidationError> {
        check_unstructured_data(data)?;
        let Some(span) = data.temporal.as_ref().filter(|span| span.window.is_some()) else {
            return Err(ValidationError::Value(
                "temporal_window must have a valid time value.".into(),
            ));
        };
        if let (Some(start), Some(end)) = (span.start_crop, span.end_crop) {
            if start >= end {
                return Err(ValidationError::Value(
                    "start_crop_time must be before end_crop_time.".into(),
                ));
            }
        }
        for context in &span.contexts {
            validate_file_context(context, MAX_FILE_CONTEXT_DEPTH)?;
        }
        Ok(())
    }
}

/// `depth` is how many further levels of subcontexts may follow.
fn validate_file_context(context: &FileContext, depth: usize) -> Result<(), ValidationError> {
    if context.start >= context.end {
        return Err(ValidationError::Value(format!(
            "FileContext {} start_time must be before end_time.",
            context.name
        )));
    }
    if !context.subcontexts.is_empty() && depth == 0 {
        return Err(ValidationError::Value(format!(
            "Depth of file context {} exceeds allowed amount.",
            context.name
        )));
    }
    for sub in &context.subcontexts {
        validate_file_context(sub, depth - 1)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{DataType, FileType, Record, TemporalSpan, Value};
    use chrono::NaiveTime;

    fn at(secs: u32) -> NaiveTime {
        NaiveTime::from_num_seconds_from_midnight_opt(secs, 0).unwrap()
    }

    fn context(name: &str, start: u32, end: u32, subcontexts: Vec<FileContext>) -> FileContext {
        FileContext {
            name: name.into(),
            value: Value::from("speech"),
            data_type: DataType::Category,
            start: at(start),
            end: at(end),
            subcontexts,
        }
    }

    fn clip(span: Option<TemporalSpan>) -> Record {
        let mut item = UnstructuredData::new("mem://clip.mp4", FileType::Video);
        item.temporal = span;
        Record::assemble("clip", Vec::new(), vec![item]).unwrap()
    }

    fn span() -> TemporalSpan {
        TemporalSpan {
            window: Some(at(5)),
            start_crop: Some(at(0)),
            end_crop: Some(at(60)),
            contexts: Vec::new(),
        }
    }

    #[test]
    fn well_formed_span_passes() {
        let mut span = span();
        span.contexts = vec![context("intro", 0, 10, vec![context("greeting", 0, 2, Vec::new())])];
        let mut record = clip(Some(span));
        TemporalValidator::new(false).validate(&mut record).unwrap();
        assert!(record.unstructured_data()[0].accessible().starts_with("Unknown URL scheme"));
    }

    #[test]
    fn window_is_required() {
        let err = TemporalValidator::new(false).validate(&mut clip(None)).unwrap_err();
        assert_eq!(err.message(), "Record clip: temporal_window must have a valid time value.");

        let mut no_window = span();
        no_window.window = None;
        assert!(TemporalValidator::new(false).validate(&mut clip(Some(no_window))).is_err());
    }

    #[test]
    fn crop_points_must_be_ordered() {
        let mut span = span();
        span.start_crop = Some(at(30));
        span.end_crop = Some(at(30));
        let err = TemporalValidator::new(true).validate(&mut clip(Some(span))).unwrap_err();
        assert_eq!(err.message(), "Record clip: start_crop_time must be before end_crop_time.");
    }

    #[test]
    fn contexts_are_bounded_and_ordered() {
        let mut reversed = span();
        reversed.contexts = vec![context("outro", 50, 40, Vec::new())];
        assert!(TemporalValidator::new(false).validate(&mut clip(Some(reversed))).is_err());

        let mut too_deep = span();
        too_deep.contexts = vec![context(
            "a",
            0,
            10,
            vec![context("b", 0, 5, vec![context("c", 0, 1, Vec::new())])],
        )];
        let err = TemporalValidator::new(false)
            .validate(&mut clip(Some(too_deep)))
            .unwrap_err();
        assert_eq!(err.message(), "Record clip: Depth of file context b exceeds allowed amount.");
    }
}
