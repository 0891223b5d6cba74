use std::io;

use thiserror::Error;

use crate::types::{DatasetId, ModelVersion, RecordName};

/// Violations of the exclusive container/member ownership relation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelationError {
    /// The owner was explicitly set to nothing; release with `detach` instead.
    #[error("reference to {container} cannot be unset; detach the item instead")]
    Unset { container: &'static str },
    /// The member already belongs to a different container.
    #[error("{member} is already associated with {container} '{owner}'")]
    Conflict {
        container: &'static str,
        member: String,
        owner: String,
    },
    /// The named container is not registered with the assembly.
    #[error("unknown {container} '{name}'")]
    UnknownContainer {
        container: &'static str,
        name: String,
    },
    /// The member id is not registered with the assembly.
    #[error("unknown data item {0}")]
    UnknownMember(String),
    /// A structured item with the same name is already attached to the record.
    #[error("record '{record}' already has a structured data item named '{name}'")]
    DuplicateName { record: RecordName, name: String },
}

/// Record validation failure.
///
/// `Type` marks schema violations (a value outside its enumeration); `Value`
/// marks range and policy violations. Both are terminal for the record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0}")]
    Type(String),
    #[error("{0}")]
    Value(String),
}

impl ValidationError {
    /// Prefix the message with `Record <name>: `, keeping the error kind.
    pub fn for_record(self, record: &str) -> Self {
        match self {
            Self::Type(message) => Self::Type(format!("Record {record}: {message}")),
            Self::Value(message) => Self::Value(format!("Record {record}: {message}")),
        }
    }

    /// Message text without the kind.
    pub fn message(&self) -> &str {
        match self {
            Self::Type(message) | Self::Value(message) => message,
        }
    }

    /// Returns `true` for schema (type) violations.
    pub fn is_type_error(&self) -> bool {
        matches!(self, Self::Type(_))
    }
}

/// Failure reported by the remote model service.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CloudError {
    /// A resource request failed at the transport or HTTP level.
    #[error(
        "{resource} {resource_name} {action} failed with HTTP status {status} - {reason}: {body}"
    )]
    Resource {
        status: u16,
        reason: String,
        body: String,
        resource: &'static str,
        resource_name: String,
        action: String,
    },
    /// The model cannot be used; fatal for the submitting pipeline.
    #[error("{message}{}", model_suffix(.model))]
    Model {
        message: String,
        model: Option<(DatasetId, ModelVersion)>,
    },
}

fn model_suffix(model: &Option<(DatasetId, ModelVersion)>) -> String {
    match model {
        Some((dataset, version)) => format!(": model version {version} dataset {dataset}"),
        None => String::new(),
    }
}

impl CloudError {
    /// Build a model error that is not tied to a specific model.
    pub fn model(message: impl Into<String>) -> Self {
        Self::Model {
            message: message.into(),
            model: None,
        }
    }

    /// Returns `true` when the error means no further submissions can succeed.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Model { .. })
    }
}

/// Umbrella error for pipeline runs.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Relation(#[from] RelationError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Cloud(#[from] CloudError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("configuration error: {0}")]
    Configuration(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_prefix_keeps_error_kind() {
        let err = ValidationError::Type("data_type `x` is not DataType".into()).for_record("r1");
        assert!(err.is_type_error());
        assert_eq!(err.message(), "Record r1: data_type `x` is not DataType");

        let err = ValidationError::Value("Missing latitude data item.".into()).for_record("geo");
        assert!(!err.is_type_error());
        assert_eq!(err.to_string(), "Record geo: Missing latitude data item.");
    }

    #[test]
    fn model_error_mentions_model_when_known() {
        let err = CloudError::Model {
            message: "Model training incomplete".into(),
            model: Some(("houses".into(), 3)),
        };
        assert_eq!(
            err.to_string(),
            "Model training incomplete: model version 3 dataset houses"
        );
        assert_eq!(
            CloudError::model("No completed models available").to_string(),
            "No completed models available"
        );
        assert!(err.is_fatal());
    }
}
