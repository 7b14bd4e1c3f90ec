//! EntityStore - Creation, adoption and pairing of entities
//!
//! All writes happen inside the caller's transaction, so an offspring is
//! never enqueued without its parents' placeholders being written too.

use std::sync::Arc;

use lineage_domain::service::breeding;
use lineage_domain::{ChildRef, Dice, Entity, Gene, Soul};

use crate::error::Result;
use crate::port::StoreTransaction;

pub struct EntityStore {
    dice: Arc<dyn Dice + Send + Sync>,
}

impl EntityStore {
    pub fn new(dice: Arc<dyn Dice + Send + Sync>) -> Self {
        Self { dice }
    }

    /// Two freshly rolled genes
    pub fn random_genes(&self) -> [Gene; 2] {
        breeding::random_genes(self.dice.as_ref())
    }

    /// A claimed entity with no parents, persisted under `soul`
    pub async fn create_root(
        &self,
        tx: &mut dyn StoreTransaction,
        soul: Soul,
        genes: [Gene; 2],
    ) -> Result<Entity> {
        for gene in &genes {
            gene.validate()?;
        }
        let entity = Entity::root(soul, genes);
        tx.put_entity(&entity).await?;
        tracing::debug!(participant = %soul, "Created root entity");
        Ok(entity)
    }

    /// Put a randomly rolled child of `owner` up for claiming.
    ///
    /// `owner` is updated in place and persisted.
    pub async fn adopt(&self, tx: &mut dyn StoreTransaction, owner: &mut Entity) -> Result<Entity> {
        let child = breeding::adopt_offspring(owner, self.dice.as_ref())?;
        let queue_id = tx.enqueue_pending(&child).await?;

        owner.add_child(ChildRef::placeholder(queue_id));
        tx.put_entity(owner).await?;

        tracing::info!(owner = %owner.soul(), queue_id = %queue_id, "Offspring adopted");
        Ok(child)
    }

    /// Produce an unclaimed offspring of `a` and `b`.
    ///
    /// Both sides get a placeholder for it; sides that have an owner are
    /// persisted.
    pub async fn pair(
        &self,
        tx: &mut dyn StoreTransaction,
        a: &mut Entity,
        b: &mut Entity,
    ) -> Result<Entity> {
        let child = breeding::pair_offspring(a, b, self.dice.as_ref())?;
        let queue_id = tx.enqueue_pending(&child).await?;
        let placeholder = ChildRef::placeholder(queue_id);

        a.add_child(placeholder);
        b.add_child(placeholder);
        if a.soul() == b.soul() {
            // Same record on both sides; keep the in-memory copies in step
            *b = a.clone();
        }

        for side in [&*a, &*b] {
            if side.is_claimed() {
                tx.put_entity(side).await?;
            }
        }

        tracing::info!(
            a = %a.soul(),
            b = %b.soul(),
            queue_id = %queue_id,
            "Offspring conceived"
        );
        Ok(child)
    }

    /// The trait an entity expresses; pure
    pub fn dominant(&self, entity: &Entity) -> Result<Gene> {
        Ok(entity.dominant()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LineageError;
    use crate::port::PersistenceGateway;
    use crate::testing::{gene, root, MemoryGateway};
    use lineage_domain::{QueueId, ScriptedDice, Sex};

    fn store() -> EntityStore {
        EntityStore::new(Arc::new(ScriptedDice::default()))
    }

    #[tokio::test]
    async fn test_create_root_persists() {
        let gateway = MemoryGateway::new();
        let mut tx = gateway.begin().await.unwrap();

        let genes = [gene(3.0, Sex::X), gene(4.0, Sex::Y)];
        let entity = store()
            .create_root(tx.as_mut(), Soul::new(10), genes)
            .await
            .unwrap();
        tx.commit().await.unwrap();
        drop(tx);

        assert!(entity.parents().is_empty());
        assert_eq!(
            gateway.get_entity_by_soul(Soul::new(10)).await.unwrap(),
            Some(entity)
        );
    }

    #[tokio::test]
    async fn test_adopt_enqueues_and_links_placeholder() {
        let gateway = MemoryGateway::new();
        let mut owner = root(1);
        gateway.seed(owner.clone()).await;

        let mut tx = gateway.begin().await.unwrap();
        let child = store().adopt(tx.as_mut(), &mut owner).await.unwrap();
        tx.commit().await.unwrap();
        drop(tx);

        assert!(!child.is_claimed());
        assert_eq!(gateway.pending_ids().await, vec![QueueId::new(1)]);

        let stored = gateway.get_entity_by_soul(Soul::new(1)).await.unwrap().unwrap();
        assert!(stored
            .children()
            .contains(&ChildRef::placeholder(QueueId::new(1))));
    }

    #[tokio::test]
    async fn test_pair_links_both_parents() {
        let gateway = MemoryGateway::new();
        let mut a = root(1);
        let mut b = root(2);

        let mut tx = gateway.begin().await.unwrap();
        let child = store().pair(tx.as_mut(), &mut a, &mut b).await.unwrap();
        tx.commit().await.unwrap();
        drop(tx);

        let placeholder = ChildRef::placeholder(QueueId::new(1));
        assert!(a.children().contains(&placeholder));
        assert!(b.children().contains(&placeholder));
        assert_eq!(child.parents().len(), 2);

        for soul in [1, 2] {
            let stored = gateway.get_entity_by_soul(Soul::new(soul)).await.unwrap().unwrap();
            assert!(stored.children().contains(&placeholder));
        }
    }

    #[tokio::test]
    async fn test_pair_two_unclaimed_enqueues_nothing() {
        let gateway = MemoryGateway::new();
        let mut a = Entity::offspring([gene(3.0, Sex::X), gene(4.0, Sex::Y)], std::iter::empty()).unwrap();
        let mut b = a.clone();

        let mut tx = gateway.begin().await.unwrap();
        let err = store().pair(tx.as_mut(), &mut a, &mut b).await.unwrap_err();
        tx.commit().await.unwrap();
        drop(tx);

        assert_eq!(err, LineageError::NoSoulAvailable);
        assert!(gateway.pending_ids().await.is_empty());
        assert!(a.children().is_empty());
    }

    #[tokio::test]
    async fn test_failed_write_leaves_queue_untouched() {
        let gateway = MemoryGateway::new();
        gateway.fail_puts_for(Some(Soul::new(1)));
        let mut owner = root(1);

        let mut tx = gateway.begin().await.unwrap();
        let result = store().adopt(tx.as_mut(), &mut owner).await;
        drop(tx);

        assert!(matches!(result, Err(LineageError::Storage(_))));
        assert!(gateway.pending_ids().await.is_empty());
    }

    #[test]
    fn test_dominant_matches_domain() {
        let entity = root(1);
        assert_eq!(store().dominant(&entity).unwrap(), entity.dominant().unwrap());
    }
}
