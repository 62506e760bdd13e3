//! # Adapters Layer (Hexagonal Architecture)
//!
//! Implements outbound port traits. The RocksDB adapter lives in
//! relay-runtime so this crate stays free of native dependencies.

mod memory;

pub use memory::InMemoryKVStore;
