//! Persistence Adapters - Gateway implementations
//!
//! These implement the persistence ports from lineage-usecase.

pub mod codec;
pub mod in_memory;
