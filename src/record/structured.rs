use serde::{Deserialize, Serialize};

use crate::record::symbolic::{DataType, Target, Value};
use crate::types::FieldName;

/// Named scalar field of a record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StructuredData {
    /// Key identifying the item; unique within its record.
    pub name: FieldName,
    /// Stored value. Continuous items must hold a number.
    pub value: Value,
    /// Continuous or categorical.
    pub data_type: DataType,
    /// Role of the item in training and inference.
    #[serde(default)]
    pub target: Target,
}

impl StructuredData {
    /// Create an item with `Target::Ignore`.
    pub fn new(name: impl Into<FieldName>, value: impl Into<Value>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            data_type,
            target: Target::default(),
        }
    }

    /// Set the target role.
    pub fn with_target(mut self, target: Target) -> Self {
        self.target = target;
        self
    }

    /// Continuous item shortcut.
    pub fn continuous(name: impl Into<FieldName>, value: impl Into<Value>) -> Self {
        Self::new(name, value, DataType::Continuous)
    }

    /// Categorical item shortcut.
    pub fn category(name: impl Into<FieldName>, value: impl Into<Value>) -> Self {
        Self::new(name, value, DataType::Category)
    }
}
