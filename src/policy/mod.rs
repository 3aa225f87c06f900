//! Eviction policies.

pub mod purge_lru;
