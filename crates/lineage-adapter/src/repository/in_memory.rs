//! In-Memory Gateway
//!
//! Transactional in-memory implementation of the persistence ports.
//! One transaction at a time holds the store; it works on a copy and
//! publishes the copy on commit. The whole store can be written to and
//! read back from a JSON snapshot file.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use lineage_domain::{Entity, QueueId, Soul};
use lineage_usecase::{PersistenceGateway, StorageError, StoreTransaction};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info};

use super::codec::{self, Snapshot};

#[derive(Debug, Clone, Default)]
struct StoreState {
    entities: HashMap<Soul, Entity>,
    pending: BTreeMap<QueueId, Entity>,
    last_queue_id: u64,
}

impl StoreState {
    fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            entities: snapshot
                .entities
                .into_iter()
                .map(|e| (e.soul(), e))
                .collect(),
            pending: snapshot.pending.into_iter().collect(),
            last_queue_id: snapshot.last_queue_id,
        }
    }

    fn to_snapshot(&self) -> Snapshot {
        let mut entities: Vec<Entity> = self.entities.values().cloned().collect();
        entities.sort_by_key(|e| e.soul());
        Snapshot {
            entities,
            pending: self
                .pending
                .iter()
                .map(|(id, e)| (*id, e.clone()))
                .collect(),
            last_queue_id: self.last_queue_id,
        }
    }
}

/// In-memory store of entities and the pending queue
///
/// Cloning shares the underlying store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGateway {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            state: Arc::new(Mutex::new(StoreState::from_snapshot(snapshot))),
        }
    }

    /// Committed contents, entities in soul order
    pub async fn snapshot(&self) -> Snapshot {
        self.state.lock().await.to_snapshot()
    }

    /// Write the committed contents to `path` as JSON
    pub async fn save_snapshot(&self, path: &Path) -> Result<(), StorageError> {
        let json = codec::to_json(&self.snapshot().await)?;
        tokio::fs::write(path, json)
            .await
            .map_err(|e| StorageError::Io {
                message: format!("{}: {}", path.display(), e),
            })?;
        info!(path = %path.display(), "Snapshot saved");
        Ok(())
    }

    /// Load a store from `path`; a missing file yields an empty store
    pub async fn load_snapshot(path: &Path) -> Result<Self, StorageError> {
        let exists = tokio::fs::try_exists(path)
            .await
            .map_err(|e| StorageError::Io {
                message: format!("{}: {}", path.display(), e),
            })?;
        if !exists {
            debug!(path = %path.display(), "No snapshot found, starting empty");
            return Ok(Self::new());
        }

        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| StorageError::Io {
                message: format!("{}: {}", path.display(), e),
            })?;
        let snapshot = codec::from_json(&json)?;
        info!(
            path = %path.display(),
            entities = snapshot.entities.len(),
            pending = snapshot.pending.len(),
            "Snapshot loaded"
        );
        Ok(Self::from_snapshot(snapshot))
    }
}

#[async_trait]
impl PersistenceGateway for InMemoryGateway {
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
        Ok(Box::new(InMemoryTransaction {
            guard,
            working: Some(working),
        }))
    }
}

/// Holds the store lock until dropped. `working` is `None` once committed.
struct InMemoryTransaction {
    guard: OwnedMutexGuard<StoreState>,
    working: Option<StoreState>,
}

impl InMemoryTransaction {
    fn working(&mut self) -> Result<&mut StoreState, StorageError> {
        self.working.as_mut().ok_or(StorageError::TransactionClosed)
    }
}

#[async_trait]
impl StoreTransaction for InMemoryTransaction {
    async fn get_entity_by_soul(&mut self, soul: Soul) -> Result<Option<Entity>, StorageError> {
        Ok(self.working()?.entities.get(&soul).cloned())
    }

    async fn put_entity(&mut self, entity: &Entity) -> Result<(), StorageError> {
        if !entity.is_claimed() {
            return Err(StorageError::Conflict {
                soul: entity.soul(),
            });
        }
        self.working()?
            .entities
            .insert(entity.soul(), entity.clone());
        Ok(())
    }

    async fn enqueue_pending(&mut self, entity: &Entity) -> Result<QueueId, StorageError> {
        let state = self.working()?;
        state.last_queue_id += 1;
        let id = QueueId::new(state.last_queue_id);
        state.pending.insert(id, entity.clone());
        debug!(queue_id = %id, "Offspring queued");
        Ok(id)
    }

    async fn claim_oldest_pending(&mut self) -> Result<Option<(QueueId, Entity)>, StorageError> {
        Ok(self.working()?.pending.pop_first())
    }

    async fn get_pending_by_id(&mut self, id: QueueId) -> Result<Option<Entity>, StorageError> {
        Ok(self.working()?.pending.get(&id).cloned())
    }

    async fn commit(&mut self) -> Result<(), StorageError> {
        let working = self.working.take().ok_or(StorageError::TransactionClosed)?;
        *self.guard = working;
        Ok(())
    }
}
