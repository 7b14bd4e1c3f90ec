//! # Lineage Adapter Layer
//!
//! External system integrations (Hexagonal Architecture adapters).
//!
//! ## Structure
//!
//! - `gateway/` - Outbound adapters (notification sinks, real dice)
//! - `repository/` - Persistence implementations and the snapshot codec

pub mod gateway;
pub mod repository;

pub use gateway::{dice::ThreadRngDice, notifier::InboxNotifier, notifier::LogNotifier};
pub use repository::in_memory::InMemoryGateway;
