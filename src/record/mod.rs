//! Record data model.
//!
//! A [`Record`] owns an ordered list of structured items and an ordered list
//! of unstructured items. Items only enter a record through the ownership
//! relation maintained by [`RecordAssembly`]; a finished record exposes its
//! items read-only.

/// Ownership wiring between records and their data items.
pub mod assembly;
/// Plain-text record reports.
pub mod format;
/// Structured (scalar) data items.
pub mod structured;
/// Enumerations and scalar values shared by data items.
pub mod symbolic;
/// Unstructured (URI-referenced) data items.
pub mod unstructured;

pub use assembly::{RecordAssembly, StructuredId, UnstructuredId};
pub use format::format_record;
pub use structured::StructuredData;
pub use symbolic::{DataType, FileType, Target, Value};
pub use unstructured::{FileContext, TemporalSpan, UnstructuredData};

use crate::errors::RelationError;
use crate::types::RecordName;

/// Unit of data submitted for training (dataset mode) or inference (model mode).
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    name: RecordName,
    structured: Vec<StructuredData>,
    unstructured: Vec<UnstructuredData>,
}

impl Record {
    /// Create a record with no data items.
    pub fn new(name: impl Into<RecordName>) -> Self {
        Self {
            name: name.into(),
            structured: Vec::new(),
            unstructured: Vec::new(),
        }
    }

    /// Build a record and attach every item through a fresh [`RecordAssembly`].
    ///
    /// Fails when two structured items share a name.
    pub fn assemble<S, U>(
        name: impl Into<RecordName>,
        structured: S,
        unstructured: U,
    ) -> Result<Self, RelationError>
    where
        S: IntoIterator<Item = StructuredData>,
        U: IntoIterator<Item = UnstructuredData>,
    {
        let name = name.into();
        let mut assembly = RecordAssembly::new();
        assembly.add_record(name.clone());
        for item in structured {
            let id = assembly.add_structured(item);
            assembly.attach_structured(id, &name)?;
        }
        for item in unstructured {
            let id = assembly.add_unstructured(item);
            assembly.attach_unstructured(id, &name)?;
        }
        assembly.finish(&name)
    }

    pub(crate) fn from_parts(
        name: RecordName,
        structured: Vec<StructuredData>,
        unstructured: Vec<UnstructuredData>,
    ) -> Self {
        Self {
            name,
            structured,
            unstructured,
        }
    }

    /// Unique record name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Structured items in attachment order.
    pub fn structured_data(&self) -> &[StructuredData] {
        &self.structured
    }

    /// Unstructured items in attachment order.
    pub fn unstructured_data(&self) -> &[UnstructuredData] {
        &self.unstructured
    }

    /// Names of every structured item.
    pub fn structured_names(&self) -> impl Iterator<Item = &str> {
        self.structured.iter().map(|item| item.name.as_str())
    }

    /// Structured item by name.
    pub fn field(&self, name: &str) -> Option<&StructuredData> {
        self.structured.iter().find(|item| item.name == name)
    }

    pub(crate) fn unstructured_data_mut(&mut self) -> &mut [UnstructuredData] {
        &mut self.unstructured
    }
}
