//! # Lineage Domain Layer
//!
//! The heart of Lineage - pure genetics and ownership rules with zero
//! external dependencies.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Domain Layer (This Crate)                     │
//! │  ┌─────────────────────────────────────────────────────────────┐│
//! │  │  model/     - Gene, Entity, Proposal                        ││
//! │  │  service/   - Breeding rules and the Dice port              ││
//! │  └─────────────────────────────────────────────────────────────┘│
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## The Golden Rule
//!
//! **This crate has ZERO external dependencies.**
//!
//! No runtime, no RNG, no storage. Randomness comes in through `Dice`,
//! persistence lives behind the use-case layer's ports.

pub mod model;
pub mod service;

// Re-export commonly used types
pub use model::{
    entity::{ChildRef, Entity, EntityError, QueueId, Soul},
    gene::{Gene, GeneError, Sex, Stat},
    proposal::{Proposal, ProposalError, ProposalKey, ProposalState, Response},
};

pub use service::{
    breeding::BreedError,
    dice::{Dice, ScriptedDice},
};
