//! ClaimResolver - Find (or give) a participant their entity
//!
//! ```text
//! resolve(p)
//!   ├─ p owns an entity ─────────────▶ return it
//!   └─ otherwise, in one transaction:
//!        ├─ pop oldest pending ──────▶ claim it for p
//!        │     └─ for each parent: resolve(parent), swap placeholder → p
//!        └─ queue empty ─────────────▶ fresh root entity for p
//! ```
//!
//! Parents are always older than their offspring, so the recursion over
//! parents terminates. A nested claim (a parent who never played) runs in
//! the same transaction as the claim that triggered it.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use lineage_domain::{Entity, Soul};

use crate::delivery::Outbox;
use crate::entity_store::EntityStore;
use crate::error::{LineageError, Result};
use crate::port::{Notification, NotificationGateway, PersistenceGateway, StoreTransaction};

/// Boxed future for the recursive resolution step
pub type ResolveFuture<'a> = Pin<Box<dyn Future<Output = Result<Entity>> + Send + 'a>>;

pub struct ClaimResolver {
    gateway: Arc<dyn PersistenceGateway>,
    notifier: Arc<dyn NotificationGateway>,
    store: Arc<EntityStore>,
}

impl ClaimResolver {
    pub fn new(
        gateway: Arc<dyn PersistenceGateway>,
        notifier: Arc<dyn NotificationGateway>,
        store: Arc<EntityStore>,
    ) -> Self {
        Self {
            gateway,
            notifier,
            store,
        }
    }

    /// Return the participant's entity, claiming or creating one first if
    /// they have none.
    pub async fn resolve(&self, participant: Soul) -> Result<Entity> {
        if participant.is_unclaimed() {
            return Err(LineageError::InvalidOperands {
                reason: "the unclaimed soul cannot own an entity".to_string(),
            });
        }

        if let Some(entity) = self.gateway.get_entity_by_soul(participant).await? {
            return Ok(entity);
        }

        let mut outbox = Outbox::new();
        let mut tx = self.gateway.begin().await?;
        let entity = self
            .resolve_in(tx.as_mut(), participant, &mut outbox)
            .await?;
        tx.commit().await?;
        drop(tx);

        outbox.deliver(self.notifier.as_ref()).await;
        Ok(entity)
    }

    /// Resolve inside an open transaction.
    ///
    /// Notifications are queued on `outbox`; the caller delivers them once
    /// the transaction has committed.
    pub fn resolve_in<'a>(
        &'a self,
        tx: &'a mut dyn StoreTransaction,
        participant: Soul,
        outbox: &'a mut Outbox,
    ) -> ResolveFuture<'a> {
        Box::pin(self.resolve_step(tx, participant, outbox))
    }

    async fn resolve_step(
        &self,
        tx: &mut dyn StoreTransaction,
        participant: Soul,
        outbox: &mut Outbox,
    ) -> Result<Entity> {
        if let Some(existing) = tx.get_entity_by_soul(participant).await? {
            return Ok(existing);
        }

        outbox.push(participant, Notification::ClaimingSoul);

        let Some((queue_id, mut heir)) = tx.claim_oldest_pending().await? else {
            let genes = self.store.random_genes();
            let entity = self.store.create_root(&mut *tx, participant, genes).await?;
            let dominant = entity.dominant()?;

            tracing::info!(participant = %participant, "No pending offspring; created root entity");
            outbox.push(participant, Notification::NoHeirsAvailable { dominant });
            return Ok(entity);
        };

        heir.claim(participant)?;
        tx.put_entity(&heir).await?;
        let dominant = heir.dominant()?;

        tracing::info!(
            participant = %participant,
            queue_id = %queue_id,
            "Claimed pending offspring"
        );

        let parents: Vec<Soul> = heir.parents().iter().copied().collect();
        for parent_soul in parents {
            let mut parent = self
                .resolve_in(&mut *tx, parent_soul, &mut *outbox)
                .await?;

            if !parent.replace_placeholder(queue_id, participant) {
                tracing::warn!(
                    parent = %parent_soul,
                    queue_id = %queue_id,
                    "Parent holds no placeholder for claimed offspring"
                );
            }
            tx.put_entity(&parent).await?;

            outbox.push(
                parent_soul,
                Notification::Birth {
                    child: participant,
                    dominant,
                },
            );
        }

        outbox.push(participant, Notification::Claimed { dominant });

        // Re-read: a nested claim may have touched this record
        Ok(tx.get_entity_by_soul(participant).await?.unwrap_or(heir))
    }
}
