use std::fmt;

use indexmap::{IndexMap, IndexSet};

use crate::errors::RelationError;
use crate::record::{Record, StructuredData, UnstructuredData};
use crate::relation::Relation;
use crate::types::RecordName;

const RECORD_KIND: &str = "Record";

/// Handle for a structured item registered with a [`RecordAssembly`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StructuredId(u64);

/// Handle for an unstructured item registered with a [`RecordAssembly`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnstructuredId(u64);

impl fmt::Display for StructuredId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "structured#{}", self.0)
    }
}

impl fmt::Display for UnstructuredId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unstructured#{}", self.0)
    }
}

/// Workspace where records are wired to their data items.
///
/// Items are registered unowned, attached to a record through the
/// record/item relations, and moved into a [`Record`] by [`RecordAssembly::finish`].
/// An item attached to one record cannot be attached to another until it is
/// detached.
pub struct RecordAssembly {
    records: IndexSet<RecordName>,
    structured: IndexMap<StructuredId, StructuredData>,
    unstructured: IndexMap<UnstructuredId, UnstructuredData>,
    structured_links: Relation<RecordName, StructuredId>,
    unstructured_links: Relation<RecordName, UnstructuredId>,
    next_id: u64,
}

impl Default for RecordAssembly {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordAssembly {
    /// Create an empty assembly.
    pub fn new() -> Self {
        Self {
            records: IndexSet::new(),
            structured: IndexMap::new(),
            unstructured: IndexMap::new(),
            structured_links: Relation::new(RECORD_KIND),
            unstructured_links: Relation::new(RECORD_KIND),
            next_id: 0,
        }
    }

    /// Register a record name. Registering an existing name is a no-op.
    pub fn add_record(&mut self, name: impl Into<RecordName>) {
        self.records.insert(name.into());
    }

    /// Returns `true` when `name` is registered and not yet finished.
    pub fn contains_record(&self, name: &str) -> bool {
        self.records.contains(name)
    }

    /// Register an unowned structured item.
    pub fn add_structured(&mut self, item: StructuredData) -> StructuredId {
        let id = StructuredId(self.allocate_id());
        self.structured.insert(id, item);
        id
    }

    /// Register an unowned unstructured item.
    pub fn add_unstructured(&mut self, item: UnstructuredData) -> UnstructuredId {
        let id = UnstructuredId(self.allocate_id());
        self.unstructured.insert(id, item);
        id
    }

    /// Attach a structured item to `record`.
    ///
    /// Attaching to the current owner again is a no-op.
    pub fn attach_structured(&mut self, id: StructuredId, record: &str) -> Result<(), RelationError> {
        let owner = self.known_record(record)?;
        let name = self
            .structured
            .get(&id)
            .map(|item| item.name.clone())
            .ok_or_else(|| RelationError::UnknownMember(id.to_string()))?;
        if self.structured_links.owner_of(&id) != Some(&owner) {
            let clash = self
                .structured_links
                .members_of(&owner)
                .filter_map(|member| self.structured.get(member))
                .any(|item| item.name == name);
            if clash {
                return Err(RelationError::DuplicateName { record: owner, name });
            }
        }
        self.structured_links.attach(&id, &owner)
    }

    /// Attach an unstructured item to `record`.
    pub fn attach_unstructured(
        &mut self,
        id: UnstructuredId,
        record: &str,
    ) -> Result<(), RelationError> {
        let owner = self.known_record(record)?;
        if !self.unstructured.contains_key(&id) {
            return Err(RelationError::UnknownMember(id.to_string()));
        }
        self.unstructured_links.attach(&id, &owner)
    }

    /// Release a structured item from its record, returning the former owner.
    pub fn detach_structured(&mut self, id: StructuredId) -> Option<RecordName> {
        self.structured_links.detach(&id)
    }

    /// Release an unstructured item from its record, returning the former owner.
    pub fn detach_unstructured(&mut self, id: UnstructuredId) -> Option<RecordName> {
        self.unstructured_links.detach(&id)
    }

    /// Record currently owning a structured item.
    pub fn structured_owner(&self, id: StructuredId) -> Option<&str> {
        self.structured_links.owner_of(&id).map(String::as_str)
    }

    /// Record currently owning an unstructured item.
    pub fn unstructured_owner(&self, id: UnstructuredId) -> Option<&str> {
        self.unstructured_links.owner_of(&id).map(String::as_str)
    }

    /// Structured items attached to `record`, in attachment order.
    pub fn structured_of<'a>(&'a self, record: &str) -> impl Iterator<Item = &'a StructuredData> {
        let owner = record.to_string();
        self.structured_links
            .members_of(&owner)
            .filter_map(|id| self.structured.get(id))
    }

    /// Unstructured items attached to `record`, in attachment order.
    pub fn unstructured_of<'a>(
        &'a self,
        record: &str,
    ) -> impl Iterator<Item = &'a UnstructuredData> {
        let owner = record.to_string();
        self.unstructured_links
            .members_of(&owner)
            .filter_map(|id| self.unstructured.get(id))
    }

    /// Move `record` and its attached items out of the assembly.
    pub fn finish(&mut self, record: &str) -> Result<Record, RelationError> {
        let owner = self.known_record(record)?;
        let structured = self
            .structured_links
            .release_all(&owner)
            .into_iter()
            .filter_map(|id| self.structured.shift_remove(&id))
            .collect();
        let unstructured = self
            .unstructured_links
            .release_all(&owner)
            .into_iter()
            .filter_map(|id| self.unstructured.shift_remove(&id))
            .collect();
        self.records.shift_remove(&owner);
        Ok(Record::from_parts(owner, structured, unstructured))
    }

    fn known_record(&self, record: &str) -> Result<RecordName, RelationError> {
        self.records
            .get(record)
            .cloned()
            .ok_or_else(|| RelationError::UnknownContainer {
                container: RECORD_KIND,
                name: record.to_string(),
            })
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}
