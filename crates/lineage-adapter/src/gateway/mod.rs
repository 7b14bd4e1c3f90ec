//! Outbound Gateways - Where notifications and randomness come from

pub mod dice;
pub mod notifier;
