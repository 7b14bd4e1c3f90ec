//! # Lineage Use Case Layer
//!
//! Application-specific business rules.
//! This layer orchestrates the flow of data between the domain and adapters.
//!
//! - `ClaimResolver` - bind a participant to an entity, recursively
//!   claiming ancestors' placeholders
//! - `PairingWorkflow` - proposal, response and breeding between two souls
//! - `ParticipantActions` - adoption, profiles and the pending queue
//!
//! Every mutating operation runs inside one `StoreTransaction`.
//! Notifications are queued in an `Outbox` and only delivered after commit.

pub use lineage_domain;

pub mod claim_resolver;
pub mod delivery;
pub mod entity_store;
pub mod error;
pub mod pairing_workflow;
pub mod participant;
pub mod port;

#[cfg(test)]
mod testing;

pub use claim_resolver::{ClaimResolver, ResolveFuture};
pub use delivery::{DeliveryReport, NotificationDeliveryFailure, Outbox};
pub use entity_store::EntityStore;
pub use error::{LineageError, Result};
pub use pairing_workflow::{PairingOutcome, PairingWorkflow, Subscription};
pub use participant::{ChildSummary, ParticipantActions, PendingSummary, Profile};
pub use port::{
    Notification, NotificationError, NotificationGateway, PersistenceGateway, StorageError,
    StoreTransaction,
};
