//! HazardNexus Store
//!
//! Durable storage for the aggregation snapshot.
//!
//! Provides:
//! - Safe load of the last snapshot (empty snapshot when none exists)
//! - Atomic replace on save so readers never observe a partial document

pub mod snapshot_store;

pub use snapshot_store::{SnapshotStore, StoreConfig};
