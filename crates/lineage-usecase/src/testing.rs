//! Test doubles for the persistence and notification ports.
//!
//! `MemoryGateway` keeps the real adapter's contract, plus a switch to make
//! writes for a given soul fail. `RecordingNotifier` keeps what it was sent.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use lineage_domain::{Entity, Gene, QueueId, Sex, Soul};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::port::{
    Notification, NotificationError, NotificationGateway, PersistenceGateway, StorageError,
    StoreTransaction,
};

#[derive(Debug, Clone, Default)]
struct State {
    entities: HashMap<Soul, Entity>,
    pending: BTreeMap<QueueId, Entity>,
    last_queue_id: u64,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryGateway {
    state: Arc<Mutex<State>>,
    fail_put_for: Arc<std::sync::Mutex<Option<Soul>>>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_puts_for(&self, soul: Option<Soul>) {
        if let Ok(mut slot) = self.fail_put_for.lock() {
            *slot = soul;
        }
    }

    pub async fn seed(&self, entity: Entity) {
        self.state.lock().await.entities.insert(entity.soul(), entity);
    }

    pub async fn seed_pending(&self, entity: Entity) -> QueueId {
        let mut state = self.state.lock().await;
        state.last_queue_id += 1;
        let id = QueueId::new(state.last_queue_id);
        state.pending.insert(id, entity);
        id
    }

    pub async fn pending_ids(&self) -> Vec<QueueId> {
        self.state.lock().await.pending.keys().copied().collect()
    }

    pub async fn entity_count(&self) -> usize {
        self.state.lock().await.entities.len()
    }
}

#[async_trait]
impl PersistenceGateway for MemoryGateway {
    async fn get_entity_by_soul(&self, soul: Soul) -> Result<Option<Entity>, StorageError> {
        Ok(self.state.lock().await.entities.get(&soul).cloned())
    }

    async fn get_pending_by_id(&self, id: QueueId) -> Result<Option<Entity>, StorageError> {
        Ok(self.state.lock().await.pending.get(&id).cloned())
    }

    async fn list_pending(&self) -> Result<Vec<(QueueId, Entity)>, StorageError> {
        Ok(self
            .state
            .lock()
            .await
            .pending
            .iter()
            .map(|(id, e)| (*id, e.clone()))
            .collect())
    }

    async fn begin(&self) -> Result<Box<dyn StoreTransaction>, StorageError> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        let fail_put_for = self.fail_put_for.lock().ok().and_then(|s| *s);
        Ok(Box::new(MemoryTransaction {
            guard,
            working,
            fail_put_for,
        }))
    }
}

struct MemoryTransaction {
    guard: OwnedMutexGuard<State>,
    working: State,
    fail_put_for: Option<Soul>,
}

#[async_trait]
impl StoreTransaction for MemoryTransaction {
    async fn get_entity_by_soul(&mut self, soul: Soul) -> Result<Option<Entity>, StorageError> {
        Ok(self.working.entities.get(&soul).cloned())
    }

    async fn put_entity(&mut self, entity: &Entity) -> Result<(), StorageError> {
        if self.fail_put_for == Some(entity.soul()) {
            return Err(StorageError::Unavailable {
                message: format!("write for {} refused", entity.soul()),
            });
        }
        self.working.entities.insert(entity.soul(), entity.clone());
        Ok(())
    }

    async fn enqueue_pending(&mut self, entity: &Entity) -> Result<QueueId, StorageError> {
        self.working.last_queue_id += 1;
        let id = QueueId::new(self.working.last_queue_id);
        self.working.pending.insert(id, entity.clone());
        Ok(id)
    }

    async fn claim_oldest_pending(&mut self) -> Result<Option<(QueueId, Entity)>, StorageError> {
        Ok(self.working.pending.pop_first())
    }

    async fn get_pending_by_id(&mut self, id: QueueId) -> Result<Option<Entity>, StorageError> {
        Ok(self.working.pending.get(&id).cloned())
    }

    async fn commit(&mut self) -> Result<(), StorageError> {
        *self.guard = self.working.clone();
        Ok(())
    }
}

pub fn gene(value: f64, sex: Sex) -> Gene {
    Gene::new([value; 6], sex)
}

pub fn root(soul: u64) -> Entity {
    Entity::root(Soul::new(soul), [gene(5.0, Sex::X), gene(7.0, Sex::Y)])
}

/// Notifier that records every delivery and refuses some recipients
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: std::sync::Mutex<Vec<(Soul, Notification)>>,
    unreachable: std::sync::Mutex<Vec<Soul>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn refuse(&self, soul: Soul) {
        if let Ok(mut unreachable) = self.unreachable.lock() {
            unreachable.push(soul);
        }
    }

    pub fn sent(&self) -> Vec<(Soul, Notification)> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn kinds_for(&self, soul: Soul) -> Vec<&'static str> {
        self.sent()
            .into_iter()
            .filter(|(to, _)| *to == soul)
            .map(|(_, n)| n.kind())
            .collect()
    }
}

#[async_trait]
impl NotificationGateway for RecordingNotifier {
    async fn notify(
        &self,
        participant: Soul,
        notification: &Notification,
    ) -> Result<(), NotificationError> {
        let refused = self
            .unreachable
            .lock()
            .map(|u| u.contains(&participant))
            .unwrap_or(false);
        if refused {
            return Err(NotificationError::Unreachable { participant });
        }
        if let Ok(mut sent) = self.sent.lock() {
            sent.push((participant, notification.clone()));
        }
        Ok(())
    }
}
