//! Domain Models - The vocabulary of Lineage
//!
//! These types represent the "Ubiquitous Language" of Lineage.
//! Every name here should match how we talk about the system.

pub mod entity;
pub mod gene;
pub mod proposal;
