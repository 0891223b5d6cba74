use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::record::symbolic::{DataType, FileType, Value};
use crate::types::{DataUri, Diagnostic, FieldName};

/// URI-referenced blob attached to a record.
///
/// Equality ignores the accessibility diagnostic.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UnstructuredData {
    /// Location of the raw data.
    pub data_uri: DataUri,
    /// Kind of data behind the URI.
    pub file_type: FileType,
    /// Optional tag grouping this item with similar items.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_by: Option<String>,
    /// Time-window metadata for temporal datasets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temporal: Option<TemporalSpan>,
    #[serde(skip)]
    accessible: Diagnostic,
}

impl UnstructuredData {
    /// Create an item without group or temporal metadata.
    pub fn new(data_uri: impl Into<DataUri>, file_type: FileType) -> Self {
        Self {
            data_uri: data_uri.into(),
            file_type,
            group_by: None,
            temporal: None,
            accessible: Diagnostic::new(),
        }
    }

    /// Set the group tag.
    pub fn with_group(mut self, group_by: impl Into<String>) -> Self {
        self.group_by = Some(group_by.into());
        self
    }

    /// Attach temporal metadata.
    pub fn with_temporal(mut self, temporal: TemporalSpan) -> Self {
        self.temporal = Some(temporal);
        self
    }

    /// Accessibility diagnostic from the last validation; empty until validated.
    pub fn accessible(&self) -> &str {
        &self.accessible
    }

    pub(crate) fn set_accessible(&mut self, diagnostic: Diagnostic) {
        self.accessible = diagnostic;
    }
}

impl PartialEq for UnstructuredData {
    fn eq(&self, other: &Self) -> bool {
        self.data_uri == other.data_uri
            && self.file_type == other.file_type
            && self.group_by == other.group_by
            && self.temporal == other.temporal
    }
}

/// Analysis window and crop points of a temporal item.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TemporalSpan {
    /// Size of the window to analyze; required by temporal validation.
    pub window: Option<NaiveTime>,
    /// Offset from the start of the file where usable content begins.
    pub start_crop: Option<NaiveTime>,
    /// Offset from the start of the file where usable content ends.
    pub end_crop: Option<NaiveTime>,
    /// Structured annotations bound to time intervals.
    #[serde(default)]
    pub contexts: Vec<FileContext>,
}

/// Structured value bound to a time interval inside a temporal item.
///
/// Subcontexts may nest one level below a context attached directly to the span.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FileContext {
    pub name: FieldName,
    pub value: Value,
    pub data_type: DataType,
    pub start: NaiveTime,
    pub end: NaiveTime,
    #[serde(default)]
    pub subcontexts: Vec<FileContext>,
}
