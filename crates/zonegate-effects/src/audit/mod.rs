//! Audit store handlers

mod jsonl;
mod memory;

pub use jsonl::JsonlAuditStore;
pub use memory::MemoryAuditStore;
