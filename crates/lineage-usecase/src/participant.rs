//! Participant actions - Adoption and the read-only views
//!
//! Every action starts by resolving the participant, so a first-time
//! player gets an entity before anything else happens.

use std::sync::Arc;

use lineage_domain::{Entity, Gene, QueueId, Soul};

use crate::claim_resolver::ClaimResolver;
use crate::delivery::Outbox;
use crate::entity_store::EntityStore;
use crate::error::Result;
use crate::port::{Notification, NotificationGateway, PersistenceGateway};

/// One entry in a profile's child list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildSummary {
    Claimed(Soul),
    /// Still waiting in the pending queue
    Husk(QueueId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub soul: Soul,
    pub dominant: Gene,
    pub parents: Vec<Soul>,
    pub children: Vec<ChildSummary>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PendingSummary {
    pub queue_id: QueueId,
    pub dominant: Gene,
    pub parents: Vec<Soul>,
}

pub struct ParticipantActions {
    gateway: Arc<dyn PersistenceGateway>,
    notifier: Arc<dyn NotificationGateway>,
    resolver: Arc<ClaimResolver>,
    store: Arc<EntityStore>,
}

impl ParticipantActions {
    pub fn new(
        gateway: Arc<dyn PersistenceGateway>,
        notifier: Arc<dyn NotificationGateway>,
        resolver: Arc<ClaimResolver>,
        store: Arc<EntityStore>,
    ) -> Self {
        Self {
            gateway,
            notifier,
            resolver,
            store,
        }
    }

    /// Roll a random child for `participant` and leave it for someone to claim
    pub async fn adopt(&self, participant: Soul) -> Result<Entity> {
        let mut outbox = Outbox::new();
        let mut tx = self.gateway.begin().await?;

        let mut owner = self
            .resolver
            .resolve_in(tx.as_mut(), participant, &mut outbox)
            .await?;
        let child = self.store.adopt(tx.as_mut(), &mut owner).await?;

        tx.commit().await?;
        drop(tx);

        outbox.push(participant, Notification::Adopted);
        outbox.deliver(self.notifier.as_ref()).await;
        Ok(child)
    }

    pub async fn profile(&self, participant: Soul) -> Result<Profile> {
        let entity = self.resolver.resolve(participant).await?;

        let children = entity
            .children()
            .iter()
            .filter_map(|child| match child.queue_id() {
                Some(queue_id) => Some(ChildSummary::Husk(queue_id)),
                None => child.as_soul().map(ChildSummary::Claimed),
            })
            .collect();

        Ok(Profile {
            soul: entity.soul(),
            dominant: self.store.dominant(&entity)?,
            parents: entity.parents().iter().copied().collect(),
            children,
        })
    }

    /// Everything waiting to be claimed, oldest first
    pub async fn pending_queue(&self) -> Result<Vec<PendingSummary>> {
        self.gateway
            .list_pending()
            .await?
            .into_iter()
            .map(|(queue_id, entity)| {
                Ok(PendingSummary {
                    queue_id,
                    dominant: self.store.dominant(&entity)?,
                    parents: entity.parents().iter().copied().collect(),
                })
            })
            .collect()
    }
}
