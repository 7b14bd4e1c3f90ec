//! Persistence Port - How the use cases reach stored entities
//!
//! ```text
//! Use Case Layer          │  Adapter Layer
//! ────────────────────────┼────────────────────────
//! trait PersistenceGateway│  InMemoryGateway
//!   fn begin()            │  (snapshot to JSON)
//! trait StoreTransaction  │
//!   fn commit()           │
//! ```
//!
//! Every write goes through a `StoreTransaction`. A transaction that is
//! dropped without `commit` leaves the store untouched, including any
//! pending entry it popped.

use async_trait::async_trait;
use lineage_domain::{Entity, QueueId, Soul};
use thiserror::Error;

/// Failures at the persistence boundary
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("Storage unavailable: {message}")]
    Unavailable { message: String },

    #[error("Conflicting write for soul {soul}")]
    Conflict { soul: Soul },

    #[error("Stored record is malformed: {message}")]
    Codec { message: String },

    #[error("Transaction already finished")]
    TransactionClosed,

    #[error("IO error: {message}")]
    Io { message: String },
}

/// Entry point to the store. Reads outside a transaction see committed
/// state only.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    async fn get_entity_by_soul(&self, soul: Soul) -> Result<Option<Entity>, StorageError>;

    async fn get_pending_by_id(&self, id: QueueId) -> Result<Option<Entity>, StorageError>;

    /// Pending offspring in queue order
    async fn list_pending(&self) -> Result<Vec<(QueueId, Entity)>, StorageError>;

    /// Open a transaction. Transactions never interleave.
    async fn begin(&self) -> Result<Box<dyn StoreTransaction>, StorageError>;
}

/// A unit of work over entities and the pending queue
#[async_trait]
pub trait StoreTransaction: Send {
    async fn get_entity_by_soul(&mut self, soul: Soul) -> Result<Option<Entity>, StorageError>;

    /// Insert or replace the record owned by `entity.soul()`
    async fn put_entity(&mut self, entity: &Entity) -> Result<(), StorageError>;

    /// Append to the pending queue, returning the next queue id
    async fn enqueue_pending(&mut self, entity: &Entity) -> Result<QueueId, StorageError>;

    /// Pop the oldest pending entry
    async fn claim_oldest_pending(&mut self) -> Result<Option<(QueueId, Entity)>, StorageError>;

    async fn get_pending_by_id(&mut self, id: QueueId) -> Result<Option<Entity>, StorageError>;

    /// Make every write in this transaction visible at once
    async fn commit(&mut self) -> Result<(), StorageError>;
}
