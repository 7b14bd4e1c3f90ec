//! PairingWorkflow - Propose, answer, pair
//!
//! Every proposal registers a one-shot `Subscription` keyed by
//! `(initiator, target)`. The first accept or reject from the target
//! removes the subscription before anything else happens, so a proposal
//! fires at most once and nothing outlives it. Proposals never time out.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use lineage_domain::{Entity, Proposal, ProposalKey, Response, Soul};
use tokio::sync::Mutex;

use crate::claim_resolver::ClaimResolver;
use crate::delivery::Outbox;
use crate::entity_store::EntityStore;
use crate::error::{LineageError, Result};
use crate::port::{Notification, NotificationGateway, PersistenceGateway};

/// Handler waiting for the answer to one proposal
#[derive(Debug, Clone)]
pub struct Subscription {
    pub proposal: Proposal,
    pub registered_at: DateTime<Utc>,
}

/// What a response led to
#[derive(Debug, Clone, PartialEq)]
pub enum PairingOutcome {
    Rejected { key: ProposalKey },
    Paired { key: ProposalKey, offspring: Entity },
}

pub struct PairingWorkflow {
    gateway: Arc<dyn PersistenceGateway>,
    notifier: Arc<dyn NotificationGateway>,
    resolver: Arc<ClaimResolver>,
    store: Arc<EntityStore>,
    subscriptions: Mutex<HashMap<ProposalKey, Subscription>>,
}

impl PairingWorkflow {
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
            subscriptions: Mutex::new(HashMap::new()),
        }
    }

    /// Ask `target` to pair with `initiator`
    pub async fn propose(
        &self,
        initiator: Soul,
        target: Soul,
        message: impl Into<String>,
    ) -> Result<ProposalKey> {
        let proposal = Proposal::new(initiator, target, message)?;

        // Both sides must exist before anyone can answer
        self.resolver.resolve(initiator).await?;
        self.resolver.resolve(target).await?;

        let key = proposal.key();
        let message = proposal.message().to_string();
        {
            let mut subscriptions = self.subscriptions.lock().await;
            if subscriptions.contains_key(&key) {
                return Err(LineageError::ProposalAlreadyPending { key });
            }
            subscriptions.insert(
                key,
                Subscription {
                    proposal,
                    registered_at: Utc::now(),
                },
            );
        }

        let mut outbox = Outbox::new();
        outbox.push(
            target,
            Notification::Proposal {
                proposal: key,
                message,
                responses: Response::ALL,
            },
        );
        outbox.push(initiator, Notification::ProposalSent { target });
        outbox.deliver(self.notifier.as_ref()).await;

        tracing::info!(proposal = %key, "Proposal sent");
        Ok(key)
    }

    /// Feed a response signal into the workflow.
    ///
    /// Returns `None` when the signal matches no pending proposal or did not
    /// come from its target; such signals leave every subscription in place.
    pub async fn respond(
        &self,
        key: ProposalKey,
        sender: Soul,
        response: Response,
    ) -> Result<Option<PairingOutcome>> {
        let subscription = {
            let mut subscriptions = self.subscriptions.lock().await;
            match subscriptions.get(&key) {
                Some(s) if s.proposal.accepts_response_from(sender) => subscriptions.remove(&key),
                _ => None,
            }
        };

        let Some(subscription) = subscription else {
            tracing::debug!(proposal = %key, sender = %sender, "Ignoring unmatched response");
            return Ok(None);
        };

        let mut proposal = subscription.proposal.clone();
        proposal.answer(response)?;

        match response {
            Response::Reject => {
                let mut outbox = Outbox::new();
                outbox.push(key.initiator, Notification::ProposalRejected { by: key.target });
                outbox.push(
                    key.target,
                    Notification::RejectedProposal {
                        initiator: key.initiator,
                    },
                );
                outbox.deliver(self.notifier.as_ref()).await;

                tracing::info!(proposal = %key, "Proposal rejected");
                Ok(Some(PairingOutcome::Rejected { key }))
            }
            Response::Accept => {
                let offspring = match self.pair(key).await {
                    Ok(offspring) => offspring,
                    Err(e) => {
                        // Nothing was committed, so the target may answer again
                        tracing::warn!(proposal = %key, error = %e, "Pairing failed, proposal reopened");
                        self.subscriptions
                            .lock()
                            .await
                            .entry(key)
                            .or_insert(subscription);
                        return Err(e);
                    }
                };
                proposal.mark_paired()?;

                tracing::info!(proposal = %key, "Proposal accepted");
                Ok(Some(PairingOutcome::Paired { key, offspring }))
            }
        }
    }

    async fn pair(&self, key: ProposalKey) -> Result<Entity> {
        let mut outbox = Outbox::new();
        let mut tx = self.gateway.begin().await?;

        self.resolver
            .resolve_in(tx.as_mut(), key.initiator, &mut outbox)
            .await?;
        let mut yours = self
            .resolver
            .resolve_in(tx.as_mut(), key.target, &mut outbox)
            .await?;
        // Resolving the target may have rewritten the initiator's children
        let mut mine = self
            .resolver
            .resolve_in(tx.as_mut(), key.initiator, &mut outbox)
            .await?;
        let offspring = self.store.pair(tx.as_mut(), &mut mine, &mut yours).await?;

        tx.commit().await?;
        drop(tx);

        outbox.push(key.initiator, Notification::ProposalAccepted { by: key.target });
        outbox.push(
            key.target,
            Notification::AcceptedProposal {
                initiator: key.initiator,
            },
        );
        outbox.deliver(self.notifier.as_ref()).await;

        Ok(offspring)
    }

    /// Tear down a pending proposal without answering it
    pub async fn cancel(&self, key: ProposalKey) -> bool {
        self.subscriptions.lock().await.remove(&key).is_some()
    }

    pub async fn pending(&self, key: ProposalKey) -> Option<Subscription> {
        self.subscriptions.lock().await.get(&key).cloned()
    }

    pub async fn pending_count(&self) -> usize {
        self.subscriptions.lock().await.len()
    }
}
