//! In-memory transactional store.
//!
//! The repository seam is the trait set in `caos_core::repositories`; this
//! backend keeps every table as a plain vector behind a single lock, with
//! snapshot-rollback transactions. The original deployment swaps it for a
//! relational engine with JSON columns; the semantics here are the
//! reference ones the usecases are tested against.

use std::sync::Arc;

use anyhow::Result as Fallible;
use caos_core::usecases as uc;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

mod repo_impl;

pub use repo_impl::MemDb;

type SharedStore = Arc<RwLock<MemDb>>;

pub struct DbReadOnly<'a> {
    locked: RwLockReadGuard<'a, MemDb>,
}

impl std::ops::Deref for DbReadOnly<'_> {
    type Target = MemDb;
    fn deref(&self) -> &MemDb {
        &self.locked
    }
}

pub struct DbReadWrite<'a> {
    locked: RwLockWriteGuard<'a, MemDb>,
}

impl std::ops::Deref for DbReadWrite<'_> {
    type Target = MemDb;
    fn deref(&self) -> &MemDb {
        &self.locked
    }
}

impl DbReadWrite<'_> {
    /// Runs `f` as one atomic unit: on error every mutation performed by
    /// the closure is rolled back and the prior state stays in place.
    pub fn transaction<T, F, E>(&mut self, f: F) -> Result<T, uc::Error>
    where
        F: FnOnce(&MemDb) -> Result<T, E>,
        E: Into<uc::Error>,
    {
        let snapshot = self.locked.snapshot();
        match f(&self.locked) {
            Ok(value) => Ok(value),
            Err(err) => {
                self.locked.restore(snapshot);
                Err(err.into())
            }
        }
    }
}

/// Handle to the shared store. Only a single write access is handed out at
/// a time; reads can run concurrently.
#[derive(Clone)]
pub struct Connections {
    store: SharedStore,
}

impl Connections {
    pub fn init() -> Fallible<Self> {
        Ok(Self {
            store: Arc::new(RwLock::new(MemDb::default())),
        })
    }

    pub fn shared(&self) -> Fallible<DbReadOnly> {
        Ok(DbReadOnly {
            locked: self.store.read(),
        })
    }

    pub fn exclusive(&self) -> Fallible<DbReadWrite> {
        Ok(DbReadWrite {
            locked: self.store.write(),
        })
    }
}
