//! Exclusive one-to-many ownership between containers and members.
//!
//! Ownership model:
//! - A member has at most one owner at a time.
//! - Assigning a member to the owner it already has is a no-op.
//! - Assigning it to a different owner fails; the member must be
//!   `detach`ed first.
//! - The owner-side member list is only reachable read-only; the single way
//!   to grow it is to assign the member's owner.
//!
//! Container and member types are distinguished by their key types, so an
//! assignment to the wrong kind of container does not compile.

use std::fmt::Debug;
use std::hash::Hash;

use indexmap::{IndexMap, IndexSet};

use crate::errors::RelationError;

/// Index of an exclusive container → members relation.
///
/// `C` is the container key and `M` the member key. Members of a container
/// iterate in attachment order.
#[derive(Clone, Debug)]
pub struct Relation<C, M> {
    container_kind: &'static str,
    owners: IndexMap<M, C>,
    members: IndexMap<C, IndexSet<M>>,
}

impl<C, M> Relation<C, M>
where
    C: Clone + Eq + Hash + Debug,
    M: Clone + Eq + Hash + Debug,
{
    /// Create an empty relation. `container_kind` names the container type in errors.
    pub fn new(container_kind: &'static str) -> Self {
        Self {
            container_kind,
            owners: IndexMap::new(),
            members: IndexMap::new(),
        }
    }

    /// Name of the container type used in error messages.
    pub fn container_kind(&self) -> &'static str {
        self.container_kind
    }

    /// Set (or try to clear) the owner of `member`.
    ///
    /// `None` is always rejected: clearing ownership goes through [`Relation::detach`].
    pub fn set_owner(&mut self, member: &M, owner: Option<&C>) -> Result<(), RelationError> {
        let Some(owner) = owner else {
            return Err(RelationError::Unset {
                container: self.container_kind,
            });
        };
        match self.owners.get(member) {
            Some(current) if current == owner => Ok(()),
            Some(current) => Err(RelationError::Conflict {
                container: self.container_kind,
                member: format!("{member:?}"),
                owner: format!("{current:?}"),
            }),
            None => {
                self.owners.insert(member.clone(), owner.clone());
                self.members
                    .entry(owner.clone())
                    .or_default()
                    .insert(member.clone());
                Ok(())
            }
        }
    }

    /// Attach `member` to `owner`.
    pub fn attach(&mut self, member: &M, owner: &C) -> Result<(), RelationError> {
        self.set_owner(member, Some(owner))
    }

    /// Release `member` from its owner, returning the previous owner.
    pub fn detach(&mut self, member: &M) -> Option<C> {
        let owner = self.owners.shift_remove(member)?;
        if let Some(set) = self.members.get_mut(&owner) {
            set.shift_remove(member);
            if set.is_empty() {
                self.members.shift_remove(&owner);
            }
        }
        Some(owner)
    }

    /// Release every member of `owner`, returning them in attachment order.
    pub fn release_all(&mut self, owner: &C) -> Vec<M> {
        let Some(set) = self.members.shift_remove(owner) else {
            return Vec::new();
        };
        for member in &set {
            self.owners.shift_remove(member);
        }
        set.into_iter().collect()
    }

    /// Current owner of `member`, if any.
    pub fn owner_of(&self, member: &M) -> Option<&C> {
        self.owners.get(member)
    }

    /// Read-only view over the members of `owner` in attachment order.
    pub fn members_of<'a>(&'a self, owner: &C) -> impl Iterator<Item = &'a M> + use<'a, C, M> {
        self.members.get(owner).into_iter().flatten()
    }

    /// Number of members attached to `owner`.
    pub fn member_count(&self, owner: &C) -> usize {
        self.members.get(owner).map_or(0, IndexSet::len)
    }

    /// Total number of attached members.
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    /// Returns `true` when nothing is attached.
    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}
