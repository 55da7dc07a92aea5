//! Shared, swappable standards table.
//!
//! Readers take an `Arc` snapshot and grade against it without holding the
//! lock; a reload compiles a new table and swaps the pointer. Each request
//! therefore sees exactly one table version from start to finish.

use std::sync::{Arc, PoisonError, RwLock};

use nf_algo::StandardsTable;
use tracing::info;

/// A compiled table together with its content id.
#[derive(Debug)]
pub struct TableVersion {
    /// `STD:<hex>` over the accepted, typed rows.
    pub table_id: String,
    /// SHA-256 of the source file bytes, when loaded from disk.
    pub source_sha256: Option<String>,
    pub table: StandardsTable,
}

#[derive(Debug)]
pub struct TableHandle {
    current: RwLock<Arc<TableVersion>>,
}

impl TableHandle {
    pub fn new(version: TableVersion) -> Self {
        Self { current: RwLock::new(Arc::new(version)) }
    }

    /// The table in effect right now. Cheap; clone of an `Arc`.
    pub fn snapshot(&self) -> Arc<TableVersion> {
        // A poisoned lock still holds a fully built Arc; the swap is a single store.
        self.current.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Publish a new table and return the one it displaced.
    /// Snapshots already taken keep the old one.
    pub fn replace(&self, version: TableVersion) -> Arc<TableVersion> {
        let next = Arc::new(version);
        let mut slot = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let prev = std::mem::replace(&mut *slot, next);
        info!(from = %prev.table_id, to = %slot.table_id, "standards table replaced");
        prev
    }
}
