//! Entity - An ownable, diploid creature
//!
//! Entities reference each other only by identifier. Parents and children
//! are sets of souls (or placeholders for unclaimed offspring), never
//! object pointers, so the family graph lives in the store and not here.

use std::collections::BTreeSet;

use super::gene::{Gene, GeneError};

/// Identifier of the participant that owns an entity
///
/// `Soul::UNCLAIMED` (zero) marks an entity that nobody owns yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Soul(u64);

impl Soul {
    pub const UNCLAIMED: Soul = Soul(0);

    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(&self) -> u64 {
        self.0
    }

    pub fn is_unclaimed(&self) -> bool {
        self.0 == 0
    }
}

impl core::fmt::Display for Soul {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sequence number assigned to an offspring when it enters the pending queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueueId(u64);

impl QueueId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl core::fmt::Display for QueueId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A child reference: either a real soul or a placeholder for a queue entry.
///
/// Souls are 64-bit, so bit 64 is free to tag placeholders. Testing that
/// single bit tells the two kinds apart; masking it off recovers the
/// queue id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChildRef(u128);

impl ChildRef {
    pub const PLACEHOLDER_FLAG: u128 = 1 << 64;

    pub fn soul(soul: Soul) -> Self {
        Self(soul.get() as u128)
    }

    pub fn placeholder(queue_id: QueueId) -> Self {
        Self(queue_id.get() as u128 | Self::PLACEHOLDER_FLAG)
    }

    /// Rebuild from the raw integer encoding
    pub fn from_raw(raw: u128) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u128 {
        self.0
    }

    pub fn is_placeholder(&self) -> bool {
        self.0 & Self::PLACEHOLDER_FLAG != 0
    }

    /// The queue id, if this is a placeholder
    pub fn queue_id(&self) -> Option<QueueId> {
        if self.is_placeholder() {
            Some(QueueId((self.0 & !Self::PLACEHOLDER_FLAG) as u64))
        } else {
            None
        }
    }

    /// The soul, if this is a real reference
    pub fn as_soul(&self) -> Option<Soul> {
        if self.is_placeholder() {
            None
        } else {
            Some(Soul(self.0 as u64))
        }
    }
}

/// Entity - Two genes, an owner, and family links
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    /// Owner, or `Soul::UNCLAIMED`
    soul: Soul,
    /// Diploid genes; always exactly two
    genes: [Gene; 2],
    children: BTreeSet<ChildRef>,
    /// At most two progenitors; empty for roots
    parents: BTreeSet<Soul>,
}

impl Entity {
    pub const MAX_PARENTS: usize = 2;

    /// Create a claimed entity with no parents
    pub fn root(soul: Soul, genes: [Gene; 2]) -> Self {
        Self {
            soul,
            genes,
            children: BTreeSet::new(),
            parents: BTreeSet::new(),
        }
    }

    /// Create an unclaimed offspring of the given parents
    pub fn offspring(
        genes: [Gene; 2],
        parents: impl IntoIterator<Item = Soul>,
    ) -> Result<Self, EntityError> {
        Self::from_parts(Soul::UNCLAIMED, genes, BTreeSet::new(), parents)
    }

    /// Rebuild an entity from stored parts, checking invariants
    pub fn from_parts(
        soul: Soul,
        genes: [Gene; 2],
        children: impl IntoIterator<Item = ChildRef>,
        parents: impl IntoIterator<Item = Soul>,
    ) -> Result<Self, EntityError> {
        for gene in &genes {
            gene.validate().map_err(EntityError::InvalidGenes)?;
        }

        let parents: BTreeSet<Soul> = parents.into_iter().collect();
        if parents.len() > Self::MAX_PARENTS {
            return Err(EntityError::TooManyParents {
                count: parents.len(),
            });
        }

        Ok(Self {
            soul,
            genes,
            children: children.into_iter().collect(),
            parents,
        })
    }

    // ========== Getters ==========

    pub fn soul(&self) -> Soul {
        self.soul
    }

    pub fn genes(&self) -> &[Gene; 2] {
        &self.genes
    }

    pub fn children(&self) -> &BTreeSet<ChildRef> {
        &self.children
    }

    pub fn parents(&self) -> &BTreeSet<Soul> {
        &self.parents
    }

    pub fn is_claimed(&self) -> bool {
        !self.soul.is_unclaimed()
    }

    /// The trait this entity expresses: its two genes combined.
    ///
    /// Derived on demand, never stored.
    pub fn dominant(&self) -> Result<Gene, GeneError> {
        self.genes[0].combine(&self.genes[1])
    }

    // ========== Mutations ==========

    /// Bind this entity to its owner. Happens exactly once.
    pub fn claim(&mut self, soul: Soul) -> Result<(), EntityError> {
        if self.is_claimed() {
            return Err(EntityError::AlreadyClaimed { soul: self.soul });
        }
        if soul.is_unclaimed() {
            return Err(EntityError::UnclaimedOwner);
        }
        self.soul = soul;
        Ok(())
    }

    pub fn add_child(&mut self, child: ChildRef) {
        self.children.insert(child);
    }

    /// Swap the placeholder for `queue_id` with the soul that claimed it.
    ///
    /// Returns false if no such placeholder was present.
    pub fn replace_placeholder(&mut self, queue_id: QueueId, soul: Soul) -> bool {
        if self.children.remove(&ChildRef::placeholder(queue_id)) {
            self.children.insert(ChildRef::soul(soul));
            true
        } else {
            false
        }
    }
}

/// Errors raised by entity invariants
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityError {
    /// Entity already belongs to someone
    AlreadyClaimed { soul: Soul },
    /// Tried to claim on behalf of the unclaimed sentinel
    UnclaimedOwner,
    /// More than two parents
    TooManyParents { count: usize },
    /// A gene is malformed
    InvalidGenes(GeneError),
}

impl core::fmt::Display for EntityError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            EntityError::AlreadyClaimed { soul } => {
                write!(f, "Entity already claimed by soul {}", soul)
            }
            EntityError::UnclaimedOwner => {
                write!(f, "Cannot claim an entity for the unclaimed soul")
            }
            EntityError::TooManyParents { count } => {
                write!(f, "Entity has {} parents, at most 2 allowed", count)
            }
            EntityError::InvalidGenes(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for EntityError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::gene::Sex;

    fn genes() -> [Gene; 2] {
        [
            Gene::new([10.0, -2.0, 5.0, 8.0, 3.0, 12.0], Sex::X),
            Gene::new([8.0, 4.0, -3.0, 8.0, 15.0, 1.0], Sex::Y),
        ]
    }

    #[test]
    fn test_placeholder_never_collides_with_soul() {
        let soul = ChildRef::soul(Soul::new(u64::MAX));
        let placeholder = ChildRef::placeholder(QueueId::new(u64::MAX));

        assert_ne!(soul, placeholder);
        assert!(!soul.is_placeholder());
        assert!(placeholder.is_placeholder());
        assert_eq!(placeholder.queue_id(), Some(QueueId::new(u64::MAX)));
        assert_eq!(soul.as_soul(), Some(Soul::new(u64::MAX)));
        assert_eq!(soul.queue_id(), None);
    }

    #[test]
    fn test_claim_happens_once() {
        let mut entity = Entity::offspring(genes(), [Soul::new(7)]).unwrap();
        assert!(!entity.is_claimed());

        entity.claim(Soul::new(42)).unwrap();
        assert_eq!(entity.soul(), Soul::new(42));

        let err = entity.claim(Soul::new(43)).unwrap_err();
        assert_eq!(err, EntityError::AlreadyClaimed { soul: Soul::new(42) });
    }

    #[test]
    fn test_claim_rejects_sentinel() {
        let mut entity = Entity::offspring(genes(), std::iter::empty()).unwrap();
        assert_eq!(
            entity.claim(Soul::UNCLAIMED).unwrap_err(),
            EntityError::UnclaimedOwner
        );
    }

    #[test]
    fn test_replace_placeholder() {
        let mut parent = Entity::root(Soul::new(1), genes());
        parent.add_child(ChildRef::placeholder(QueueId::new(3)));
        parent.add_child(ChildRef::placeholder(QueueId::new(4)));

        assert!(parent.replace_placeholder(QueueId::new(3), Soul::new(99)));
        assert!(!parent.replace_placeholder(QueueId::new(3), Soul::new(99)));

        assert!(parent.children().contains(&ChildRef::soul(Soul::new(99))));
        assert!(parent
            .children()
            .contains(&ChildRef::placeholder(QueueId::new(4))));
        assert_eq!(parent.children().len(), 2);
    }

    #[test]
    fn test_from_parts_checks_parent_count() {
        let err = Entity::from_parts(
            Soul::new(1),
            genes(),
            std::iter::empty(),
            [Soul::new(2), Soul::new(3), Soul::new(4)],
        )
        .unwrap_err();

        assert_eq!(err, EntityError::TooManyParents { count: 3 });
    }

    #[test]
    fn test_dominant_is_stable() {
        let entity = Entity::root(Soul::new(1), genes());

        let first = entity.dominant().unwrap();
        let second = entity.dominant().unwrap();

        assert_eq!(first, second);
        assert_eq!(first.sex(), Sex::X);
    }
}
