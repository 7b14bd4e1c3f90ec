//! Ports - The outbound seams of the use-case layer
//!
//! Adapters implement these; use cases only ever see the traits.

pub mod notification;
pub mod persistence;

pub use notification::{Notification, NotificationError, NotificationGateway};
pub use persistence::{PersistenceGateway, StorageError, StoreTransaction};
