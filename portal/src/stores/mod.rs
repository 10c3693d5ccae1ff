//! Shipped [`crate::providers::RequestStore`] implementations.

mod memory;

pub use memory::MemoryRequestStore;
